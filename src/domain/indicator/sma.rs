//! Simple Moving Average.
//!
//! Trailing mean over n values. Warmup: first (n-1) values are undefined.

use super::{undefined, Series};

pub fn calculate_sma(values: &[f64], period: usize) -> Series {
    let mut out = undefined(values.len());
    if period == 0 || values.len() < period {
        return out;
    }

    for i in (period - 1)..values.len() {
        let window = &values[i + 1 - period..=i];
        out[i] = Some(window.iter().sum::<f64>() / period as f64);
    }

    out
}
