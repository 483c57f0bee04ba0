//! Strategy configuration.
//!
//! A flat value object of feature toggles and numeric parameters. It is
//! copied, never shared, when the optimizer sweeps a parameter.

use super::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use super::indicator::IndicatorType;

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    pub use_bollinger: bool,
    pub use_rsi: bool,
    pub use_macd: bool,
    pub use_trend_filter: bool,
    pub use_take_profit: bool,
    pub use_momentum: bool,

    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub atr_period: usize,
    pub sma_fast: usize,
    pub sma_slow: usize,

    /// Percentage of cash put at risk per entry.
    pub risk_pct: f64,
    /// Stop distance in ATR multiples.
    pub stop_atr: f64,
    /// Profit target distance in ATR multiples.
    pub take_profit_atr: f64,
    /// Flat fee per executed trade.
    pub commission: f64,
    pub slippage_bps: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        StrategyConfig {
            use_bollinger: true,
            use_rsi: true,
            use_macd: false,
            use_trend_filter: false,
            use_take_profit: true,
            use_momentum: false,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            macd_fast: DEFAULT_FAST,
            macd_slow: DEFAULT_SLOW,
            macd_signal: DEFAULT_SIGNAL,
            bb_period: 20,
            bb_std_dev: 2.0,
            atr_period: 14,
            sma_fast: 50,
            sma_slow: 200,
            risk_pct: 1.0,
            stop_atr: 2.0,
            take_profit_atr: 3.0,
            commission: 0.0,
            slippage_bps: 5.0,
        }
    }
}

impl StrategyConfig {
    /// Slippage as a price fraction.
    pub fn slippage(&self) -> f64 {
        self.slippage_bps / 10_000.0
    }

    /// Every indicator the signal generator and simulator read.
    pub fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Rsi(self.rsi_period),
            IndicatorType::Macd {
                fast: self.macd_fast,
                slow: self.macd_slow,
                signal: self.macd_signal,
            },
            IndicatorType::bollinger(self.bb_period, self.bb_std_dev),
            IndicatorType::Atr(self.atr_period),
            IndicatorType::Sma(self.sma_fast),
            IndicatorType::Sma(self.sma_slow),
        ]
    }
}
