//! Per-bar buy/sell signal generation.
//!
//! Bollinger, RSI and MACD each cast an independent reversal vote; a reversal
//! fires only when the votes agree. Momentum entries fire on their own, and
//! the trend filter vetoes every buy below the slow SMA. A bar emits at most
//! one signal, and a signal at bar i is executed at bar i+1's open.

use chrono::NaiveDate;
use std::fmt;

use crate::domain::indicator::Series;
use crate::domain::indicator_helpers::IndicatorSet;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::strategy::StrategyConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalReason {
    ReversalEntry,
    MomentumEntry,
    ReversalSell,
}

impl fmt::Display for SignalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalReason::ReversalEntry => "Reversal Entry",
            SignalReason::MomentumEntry => "Momentum Entry",
            SignalReason::ReversalSell => "Reversal Sell",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub kind: SignalKind,
    pub index: usize,
    pub date: NaiveDate,
    pub price: f64,
    pub reason: SignalReason,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Votes {
    buy: u32,
    sell: u32,
}

impl Votes {
    fn cast(&mut self, buy: bool, sell: bool) {
        if buy {
            self.buy += 1;
        }
        if sell {
            self.sell += 1;
        }
    }
}

pub fn generate_signals(
    bars: &[OhlcvBar],
    indicators: &IndicatorSet,
    config: &StrategyConfig,
) -> Vec<Signal> {
    let mut signals = Vec::new();

    for (i, bar) in bars.iter().enumerate().skip(1) {
        let price = bar.close;
        let mut votes = Votes::default();

        if config.use_bollinger {
            let bands = (at(&indicators.bb_lower, i), at(&indicators.bb_upper, i));
            if let (Some(lower), Some(upper)) = bands {
                votes.cast(price <= lower, price >= upper);
            }
        }

        if config.use_rsi {
            if let Some(rsi) = at(&indicators.rsi, i) {
                votes.cast(rsi <= config.rsi_oversold, rsi >= config.rsi_overbought);
            }
        }

        if config.use_macd {
            if let Some((bullish, bearish)) = macd_cross(indicators, i) {
                votes.cast(bullish, bearish);
            }
        }

        let reversal_buy = votes.buy > 0 && votes.sell == 0;
        let reversal_sell = votes.sell > 0 && votes.buy == 0;

        let momentum_buy = config.use_momentum
            && match (at(&indicators.sma_fast, i), at(&indicators.rsi, i)) {
                (Some(sma), Some(rsi)) => price > sma && rsi > 50.0,
                _ => false,
            };

        let mut buy = reversal_buy || momentum_buy;

        if buy && config.use_trend_filter {
            if let Some(sma_slow) = at(&indicators.sma_slow, i) {
                if price < sma_slow {
                    buy = false;
                }
            }
        }

        let emitted = if buy {
            let reason = if momentum_buy && !reversal_buy {
                SignalReason::MomentumEntry
            } else {
                SignalReason::ReversalEntry
            };
            Some((SignalKind::Buy, reason))
        } else if reversal_sell {
            Some((SignalKind::Sell, SignalReason::ReversalSell))
        } else {
            None
        };

        if let Some((kind, reason)) = emitted {
            signals.push(Signal {
                kind,
                index: i,
                date: bar.date,
                price,
                reason,
            });
        }
    }

    signals
}

/// Index signals by the bar that produced them.
pub fn signals_by_bar(signals: &[Signal], len: usize) -> Vec<Option<&Signal>> {
    let mut by_bar = vec![None; len];
    for signal in signals {
        if let Some(slot) = by_bar.get_mut(signal.index) {
            *slot = Some(signal);
        }
    }
    by_bar
}

fn at(series: &Series, i: usize) -> Option<f64> {
    series.get(i).copied().flatten()
}

/// (bullish, bearish) crossover between bars i-1 and i.
fn macd_cross(indicators: &IndicatorSet, i: usize) -> Option<(bool, bool)> {
    let prev_line = at(&indicators.macd_line, i - 1)?;
    let prev_signal = at(&indicators.macd_signal, i - 1)?;
    let line = at(&indicators.macd_line, i)?;
    let signal = at(&indicators.macd_signal, i)?;

    let bullish = prev_line <= prev_signal && line > signal;
    let bearish = prev_line >= prev_signal && line < signal;
    Some((bullish, bearish))
}
