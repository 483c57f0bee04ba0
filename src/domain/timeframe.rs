//! Bar resolution and daily-bar aggregation.

use chrono::{Datelike, Duration, NaiveDate};
use std::fmt;
use std::str::FromStr;

use super::error::BacktestError;
use super::ohlcv::OhlcvBar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Timeframe {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Timeframe {
    /// Periods per year used to annualize per-bar returns.
    pub fn annualization_factor(&self) -> f64 {
        match self {
            Timeframe::Daily => 252.0,
            Timeframe::Weekly => 52.0,
            Timeframe::Monthly => 12.0,
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Timeframe::Daily => "daily",
            Timeframe::Weekly => "weekly",
            Timeframe::Monthly => "monthly",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Timeframe {
    type Err = BacktestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "1d" | "d" => Ok(Timeframe::Daily),
            "weekly" | "1wk" | "w" => Ok(Timeframe::Weekly),
            "monthly" | "1mo" | "m" => Ok(Timeframe::Monthly),
            _ => Err(BacktestError::UnknownTimeframe {
                name: s.to_string(),
            }),
        }
    }
}

/// Aggregate daily bars into the given timeframe.
///
/// Weekly groups start on Sunday; monthly groups are calendar months. Each
/// group takes the first open, last close, highest high, lowest low, summed
/// volume and the date of its last bar.
pub fn resample(bars: &[OhlcvBar], timeframe: Timeframe) -> Vec<OhlcvBar> {
    if timeframe == Timeframe::Daily {
        return bars.to_vec();
    }

    let mut out: Vec<OhlcvBar> = Vec::new();
    let mut current_key: Option<NaiveDate> = None;

    for bar in bars {
        let key = group_key(bar.date, timeframe);
        match out.last_mut() {
            Some(agg) if current_key == Some(key) => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
                agg.date = bar.date;
            }
            _ => {
                out.push(bar.clone());
                current_key = Some(key);
            }
        }
    }

    out
}

fn group_key(date: NaiveDate, timeframe: Timeframe) -> NaiveDate {
    match timeframe {
        Timeframe::Daily => date,
        Timeframe::Weekly => date - Duration::days(date.weekday().num_days_from_sunday() as i64),
        Timeframe::Monthly => date.with_day(1).unwrap_or(date),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(y: i32, m: u32, d: u32, open: f64, high: f64, low: f64, close: f64) -> OhlcvBar {
        OhlcvBar {
            date: NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            open,
            high,
            low,
            close,
            volume: 100.0,
        }
    }

    #[test]
    fn parse_timeframe_names() {
        assert_eq!("daily".parse::<Timeframe>().unwrap(), Timeframe::Daily);
        assert_eq!("1wk".parse::<Timeframe>().unwrap(), Timeframe::Weekly);
        assert_eq!("Monthly".parse::<Timeframe>().unwrap(), Timeframe::Monthly);
        assert!("hourly".parse::<Timeframe>().is_err());
    }

    #[test]
    fn annualization_factors() {
        assert_eq!(Timeframe::Daily.annualization_factor(), 252.0);
        assert_eq!(Timeframe::Weekly.annualization_factor(), 52.0);
        assert_eq!(Timeframe::Monthly.annualization_factor(), 12.0);
    }

    #[test]
    fn daily_resample_is_identity() {
        let bars = vec![bar(2024, 1, 2, 1.0, 2.0, 0.5, 1.5)];
        assert_eq!(resample(&bars, Timeframe::Daily), bars);
    }

    #[test]
    fn weekly_groups_are_sunday_anchored() {
        // 2024-01-06 is a Saturday, 2024-01-07 a Sunday.
        let bars = vec![
            bar(2024, 1, 4, 10.0, 12.0, 9.0, 11.0),
            bar(2024, 1, 5, 11.0, 15.0, 10.0, 14.0),
            bar(2024, 1, 6, 14.0, 14.5, 8.0, 13.0),
            bar(2024, 1, 7, 13.0, 13.5, 12.0, 12.5),
            bar(2024, 1, 8, 12.5, 16.0, 12.0, 15.0),
        ];

        let weekly = resample(&bars, Timeframe::Weekly);
        assert_eq!(weekly.len(), 2);

        let first = &weekly[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 6).unwrap());
        assert_eq!(first.open, 10.0);
        assert_eq!(first.high, 15.0);
        assert_eq!(first.low, 8.0);
        assert_eq!(first.close, 13.0);
        assert_eq!(first.volume, 300.0);

        let second = &weekly[1];
        assert_eq!(second.date, NaiveDate::from_ymd_opt(2024, 1, 8).unwrap());
        assert_eq!(second.open, 13.0);
        assert_eq!(second.close, 15.0);
    }

    #[test]
    fn monthly_groups_by_calendar_month() {
        let bars = vec![
            bar(2024, 1, 30, 10.0, 11.0, 9.0, 10.5),
            bar(2024, 1, 31, 10.5, 12.0, 10.0, 11.5),
            bar(2024, 2, 1, 11.5, 13.0, 11.0, 12.5),
        ];

        let monthly = resample(&bars, Timeframe::Monthly);
        assert_eq!(monthly.len(), 2);
        assert_eq!(monthly[0].date, NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
        assert_eq!(monthly[0].high, 12.0);
        assert_eq!(monthly[0].close, 11.5);
        assert_eq!(monthly[1].open, 11.5);
    }

    #[test]
    fn resample_empty() {
        assert!(resample(&[], Timeframe::Weekly).is_empty());
    }
}
