//! MACD (Moving Average Convergence Divergence) indicator.
//!
//! MACD Line = EMA(fast) - EMA(slow), where both are defined
//! Signal Line = EMA(signal) of MACD Line
//! Histogram = MACD Line - Signal Line
//!
//! The signal EMA runs over the whole MACD line with undefined entries read
//! as 0.0, but a signal value is only emitted where the MACD line itself is
//! defined.
//!
//! Default parameters: fast=12, slow=26, signal=9

use super::{calculate_ema, Series};

pub const DEFAULT_FAST: usize = 12;
pub const DEFAULT_SLOW: usize = 26;
pub const DEFAULT_SIGNAL: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub line: Series,
    pub signal: Series,
    pub histogram: Series,
}

pub fn calculate_macd(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdSeries {
    let ema_fast = calculate_ema(closes, fast);
    let ema_slow = calculate_ema(closes, slow);

    let line: Series = ema_fast
        .iter()
        .zip(ema_slow.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    let line_filled: Vec<f64> = line.iter().map(|v| v.unwrap_or(0.0)).collect();
    let signal: Series = calculate_ema(&line_filled, signal_period)
        .into_iter()
        .zip(line.iter())
        .map(|(sig, macd)| if macd.is_some() { sig } else { None })
        .collect();

    let histogram: Series = line
        .iter()
        .zip(signal.iter())
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        })
        .collect();

    MacdSeries {
        line,
        signal,
        histogram,
    }
}
