//! Computes the full indicator set a strategy reads.

use log::debug;

use crate::domain::indicator::{
    calculate_atr, calculate_bollinger, calculate_macd, calculate_rsi, calculate_sma, Series,
};
use crate::domain::ohlcv::{closes, OhlcvBar};
use crate::domain::strategy::StrategyConfig;

/// Indicator outputs, each aligned with the bar series.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    pub rsi: Series,
    pub macd_line: Series,
    pub macd_signal: Series,
    pub macd_histogram: Series,
    pub bb_upper: Series,
    pub bb_middle: Series,
    pub bb_lower: Series,
    pub atr: Series,
    pub sma_fast: Series,
    pub sma_slow: Series,
}

impl IndicatorSet {
    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }
}

pub fn compute_indicators(bars: &[OhlcvBar], config: &StrategyConfig) -> IndicatorSet {
    let closes = closes(bars);

    let macd = calculate_macd(&closes, config.macd_fast, config.macd_slow, config.macd_signal);
    let bollinger = calculate_bollinger(&closes, config.bb_period, config.bb_std_dev);

    debug!(
        "computing {} over {} bars",
        config
            .indicators()
            .iter()
            .map(|i| i.to_string())
            .collect::<Vec<_>>()
            .join(", "),
        bars.len()
    );

    IndicatorSet {
        rsi: calculate_rsi(&closes, config.rsi_period),
        macd_line: macd.line,
        macd_signal: macd.signal,
        macd_histogram: macd.histogram,
        bb_upper: bollinger.upper,
        bb_middle: bollinger.middle,
        bb_lower: bollinger.lower,
        atr: calculate_atr(bars, config.atr_period),
        sma_fast: calculate_sma(&closes, config.sma_fast),
        sma_slow: calculate_sma(&closes, config.sma_slow),
    }
}
