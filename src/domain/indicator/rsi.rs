//! RSI (Relative Strength Index) indicator.
//!
//! Uses Wilder's smoothing (RMA) for average gain/loss:
//! - First average: simple mean of gains/losses over first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 the ratio is pinned to [`MAX_RELATIVE_STRENGTH`];
//! if both averages are 0 (flat prices) RSI is 50.
//!
//! Warmup: first n bars are undefined (bar 0 has no prior close).

use super::{calculate_rma, undefined, Series};

pub const MAX_RELATIVE_STRENGTH: f64 = 1000.0;

pub fn calculate_rsi(closes: &[f64], period: usize) -> Series {
    if period == 0 || closes.len() < 2 {
        return undefined(closes.len());
    }

    let mut gains: Vec<f64> = Vec::with_capacity(closes.len() - 1);
    let mut losses: Vec<f64> = Vec::with_capacity(closes.len() - 1);
    for w in closes.windows(2) {
        let change = w[1] - w[0];
        gains.push(if change > 0.0 { change } else { 0.0 });
        losses.push(if change < 0.0 { -change } else { 0.0 });
    }

    let avg_gains = calculate_rma(&gains, period);
    let avg_losses = calculate_rma(&losses, period);

    let mut values = Vec::with_capacity(closes.len());
    values.push(None);
    values.extend(
        avg_gains
            .iter()
            .zip(avg_losses.iter())
            .map(|(gain, loss)| match (gain, loss) {
                (Some(g), Some(l)) => Some(rsi_from_averages(*g, *l)),
                _ => None,
            }),
    );

    values
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain == 0.0 && avg_loss == 0.0 {
        return 50.0;
    }
    let rs = if avg_loss == 0.0 {
        MAX_RELATIVE_STRENGTH
    } else {
        avg_gain / avg_loss
    };
    100.0 - 100.0 / (1.0 + rs)
}
