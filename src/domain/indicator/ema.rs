//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) values are undefined.

use super::{undefined, Series};

pub fn calculate_ema(values: &[f64], period: usize) -> Series {
    let mut out = undefined(values.len());
    if period == 0 {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &v) in values.iter().enumerate() {
        if i < period - 1 {
            sum += v;
        } else if i == period - 1 {
            sum += v;
            ema = sum / period as f64;
            out[i] = Some(ema);
        } else {
            ema = v * k + ema * (1.0 - k);
            out[i] = Some(ema);
        }
    }

    out
}
