//! Technical indicator implementations.
//!
//! Every indicator returns a [`Series`]: one `Option<f64>` per input bar,
//! `None` while the indicator is still warming up. A warm-up slot is never
//! filled with `0.0` or `NaN`, so "no value" stays distinguishable from a
//! real value of zero in every downstream comparison.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rma;
pub mod rsi;
pub mod sma;

pub use atr::calculate_atr;
pub use bollinger::{calculate_bollinger, BollingerSeries};
pub use ema::calculate_ema;
pub use macd::{calculate_macd, MacdSeries};
pub use rma::calculate_rma;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;

use std::fmt;

/// An indicator output aligned with the bar series it was computed from.
pub type Series = Vec<Option<f64>>;

/// A series of `len` undefined values.
pub fn undefined(len: usize) -> Series {
    vec![None; len]
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Atr(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl IndicatorType {
    pub fn bollinger(period: usize, stddev_mult: f64) -> Self {
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100: (stddev_mult * 100.0).round().max(0.0) as u32,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}
