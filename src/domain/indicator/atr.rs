//! Average True Range.
//!
//! TR[0] = high - low (no previous close), TR[i] = true range against the
//! previous close, smoothed with Wilder's RMA.

use super::{calculate_rma, Series};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_atr(bars: &[OhlcvBar], period: usize) -> Series {
    let tr_values: Vec<f64> = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect();

    calculate_rma(&tr_values, period)
}
