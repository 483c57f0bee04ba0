//! Wilder's running moving average (RMA).
//!
//! Seeded with the simple mean of the first n values, then
//! avg = (prev_avg * (n-1) + v) / n.
//! Warmup: first (n-1) values are undefined.

use super::{undefined, Series};

pub fn calculate_rma(values: &[f64], period: usize) -> Series {
    let mut out = undefined(values.len());
    if period == 0 || values.len() < period {
        return out;
    }

    let n = period as f64;
    let mut avg = values[..period].iter().sum::<f64>() / n;
    out[period - 1] = Some(avg);

    for (i, &v) in values.iter().enumerate().skip(period) {
        avg = (avg * (n - 1.0) + v) / n;
        out[i] = Some(avg);
    }

    out
}
