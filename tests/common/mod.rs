#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use gridtrader::domain::error::BacktestError;
pub use gridtrader::domain::ohlcv::OhlcvBar;
use gridtrader::ports::data_port::DataPort;
use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<OhlcvBar>, BacktestError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BacktestError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| start_date.is_none_or(|s| b.date >= s))
                    .filter(|b| end_date.is_none_or(|e| b.date <= e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, BacktestError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Bar with open = close and a symmetric high/low band.
pub fn make_bar(day: NaiveDate, close: f64, range: f64) -> OhlcvBar {
    OhlcvBar {
        date: day,
        open: close,
        high: close + range,
        low: close - range,
        close,
        volume: 1_000.0,
    }
}

/// Daily bars from a list of closes, starting 2023-01-02.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2023, 1, 2);
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| make_bar(start + Duration::days(i as i64), c, 1.0))
        .collect()
}

/// Oscillating price path that produces regular RSI and Bollinger extremes.
pub fn oscillating_bars(n: usize) -> Vec<OhlcvBar> {
    let start = date(2022, 1, 3);
    (0..n)
        .map(|i| {
            let t = i as f64;
            let close = 100.0 + (t * 0.3).sin() * 10.0 + (t * 0.07).sin() * 4.0 + t * 0.01;
            OhlcvBar {
                date: start + Duration::days(i as i64),
                open: close - (t * 0.5).cos() * 0.6,
                high: close + 1.5,
                low: close - 1.5,
                close,
                volume: 10_000.0 + (i % 7) as f64 * 100.0,
            }
        })
        .collect()
}

pub fn write_csv(dir: &Path, symbol: &str, bars: &[OhlcvBar]) {
    let mut content = String::from("date,open,high,low,close,volume\n");
    for b in bars {
        writeln!(
            content,
            "{},{},{},{},{},{}",
            b.date.format("%Y-%m-%d"),
            b.open,
            b.high,
            b.low,
            b.close,
            b.volume
        )
        .unwrap();
    }
    fs::write(dir.join(format!("{}.csv", symbol)), content).unwrap();
}
