//! Fill prices, exit levels and risk-based position sizing.
//!
//! Long-only. Slippage always works against the trader: entries fill above
//! the quoted price, exits below it.

use crate::domain::strategy::StrategyConfig;

/// Fraction of the close used as ATR while ATR is still warming up.
pub const ATR_FALLBACK_PCT: f64 = 0.02;

/// Smallest stop distance used for sizing, guarding a zero-width stop.
pub const MIN_STOP_DISTANCE: f64 = 0.01;

/// Long entry (buy): execution_price = market_price * (1 + slip)
pub fn apply_slippage_entry(market_price: f64, slip: f64) -> f64 {
    market_price * (1.0 + slip)
}

/// Long exit (sell): execution_price = market_price * (1 - slip)
pub fn apply_slippage_exit(market_price: f64, slip: f64) -> f64 {
    market_price * (1.0 - slip)
}

/// ATR at the bar, or 2% of the close when ATR is undefined.
pub fn atr_or_fallback(atr: Option<f64>, close: f64) -> f64 {
    atr.unwrap_or(close * ATR_FALLBACK_PCT)
}

pub fn take_profit_level(entry_price: f64, atr: f64, config: &StrategyConfig) -> f64 {
    entry_price + config.take_profit_atr * atr
}

pub fn stop_loss_level(entry_price: f64, atr: f64, config: &StrategyConfig) -> f64 {
    entry_price - config.stop_atr * atr
}

/// Raw exit price when the bar's high reaches the target: a gap above the
/// target fills at the open.
pub fn take_profit_trigger(open: f64, high: f64, target: f64) -> Option<f64> {
    (high >= target).then(|| open.max(target))
}

/// Raw exit price when the bar's low breaches the stop: a gap below the stop
/// fills at the open.
pub fn stop_loss_trigger(open: f64, low: f64, stop: f64) -> Option<f64> {
    (low <= stop).then(|| open.min(stop))
}

/// Whole shares such that a stop-out loses at most `risk_pct` of cash.
pub fn position_size(cash: f64, atr: f64, config: &StrategyConfig) -> u64 {
    let risk_budget = cash * config.risk_pct / 100.0;
    let stop_distance = (config.stop_atr * atr).max(MIN_STOP_DISTANCE);
    let shares = (risk_budget / stop_distance).floor();
    if shares.is_finite() && shares > 0.0 {
        shares as u64
    } else {
        0
    }
}

/// Result of an entry attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered {
        shares: u64,
        execution_price: f64,
        cost: f64,
        commission: f64,
    },
    ZeroShares,
    InsufficientCapital,
}

/// Price a long entry at `open` without touching any state.
///
/// Steps:
/// 1. Apply slippage to the open
/// 2. Size by risk budget / stop distance (whole shares only)
/// 3. Reject if zero shares or cash cannot cover cost + commission
pub fn plan_entry(cash: f64, open: f64, atr: f64, config: &StrategyConfig) -> EntryResult {
    let execution_price = apply_slippage_entry(open, config.slippage());
    let shares = position_size(cash, atr, config);

    if shares == 0 {
        return EntryResult::ZeroShares;
    }

    let cost = shares as f64 * execution_price;
    if cost + config.commission > cash {
        return EntryResult::InsufficientCapital;
    }

    EntryResult::Entered {
        shares,
        execution_price,
        cost,
        commission: config.commission,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> StrategyConfig {
        StrategyConfig {
            risk_pct: 2.0,
            stop_atr: 2.0,
            take_profit_atr: 3.0,
            commission: 5.0,
            slippage_bps: 10.0,
            ..Default::default()
        }
    }

    #[test]
    fn slippage_entry_and_exit() {
        assert!((apply_slippage_entry(100.0, 0.001) - 100.1).abs() < 1e-9);
        assert!((apply_slippage_exit(100.0, 0.001) - 99.9).abs() < 1e-9);
    }

    #[test]
    fn atr_fallback_when_undefined() {
        assert_eq!(atr_or_fallback(Some(3.0), 100.0), 3.0);
        assert!((atr_or_fallback(None, 100.0) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn exit_levels() {
        let config = make_config();
        assert_eq!(take_profit_level(100.0, 2.0, &config), 106.0);
        assert_eq!(stop_loss_level(100.0, 2.0, &config), 96.0);
    }

    #[test]
    fn take_profit_fills_at_target_or_gap_open() {
        assert_eq!(take_profit_trigger(100.0, 107.0, 106.0), Some(106.0));
        assert_eq!(take_profit_trigger(108.0, 109.0, 106.0), Some(108.0));
        assert_eq!(take_profit_trigger(100.0, 105.0, 106.0), None);
    }

    #[test]
    fn stop_loss_fills_at_stop_or_gap_open() {
        assert_eq!(stop_loss_trigger(100.0, 95.0, 96.0), Some(96.0));
        assert_eq!(stop_loss_trigger(94.0, 93.0, 96.0), Some(94.0));
        assert_eq!(stop_loss_trigger(100.0, 97.0, 96.0), None);
    }

    #[test]
    fn sizing_by_risk() {
        let config = make_config();
        // budget 200, stop distance 4 → 50 shares
        assert_eq!(position_size(10_000.0, 2.0, &config), 50);
    }

    #[test]
    fn sizing_floors_stop_distance() {
        let config = make_config();
        // stop distance 0 → 0.01, budget 200 → 20000 shares
        assert_eq!(position_size(10_000.0, 0.0, &config), 20_000);
    }

    #[test]
    fn plan_entry_basic() {
        let config = make_config();
        match plan_entry(10_000.0, 100.0, 2.0, &config) {
            EntryResult::Entered {
                shares,
                execution_price,
                cost,
                commission,
            } => {
                assert_eq!(shares, 50);
                assert!((execution_price - 100.1).abs() < 1e-9);
                assert!((cost - 50.0 * 100.1).abs() < 1e-9);
                assert_eq!(commission, 5.0);
            }
            other => panic!("expected entry, got {:?}", other),
        }
    }

    #[test]
    fn plan_entry_insufficient_capital() {
        let config = make_config();
        // stop distance floors at 0.01 → 20000 shares, far more than cash covers
        assert_eq!(
            plan_entry(10_000.0, 100.0, 0.0, &config),
            EntryResult::InsufficientCapital
        );
    }

    #[test]
    fn plan_entry_zero_shares() {
        let config = make_config();
        assert_eq!(plan_entry(1.0, 100.0, 50.0, &config), EntryResult::ZeroShares);
    }
}
