//! Bar-by-bar backtest simulation.
//!
//! Signals produced at bar i execute at bar i+1. Within a bar the rules run in
//! a fixed order: signal exit, take profit, stop loss, then entry. Exits are
//! therefore always evaluated before an entry on the same bar, and a held
//! position is never reversed.

use log::debug;

use crate::domain::execution::{
    apply_slippage_exit, atr_or_fallback, plan_entry, stop_loss_level, stop_loss_trigger,
    take_profit_level, take_profit_trigger, EntryResult,
};
use crate::domain::indicator_helpers::IndicatorSet;
use crate::domain::metrics::{Metrics, MetricsInput};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::portfolio::{EquityPoint, Portfolio};
use crate::domain::position::{Trade, TradeReason};
use crate::domain::signal::{generate_signals, signals_by_bar, Signal, SignalKind};
use crate::domain::strategy::StrategyConfig;
use crate::domain::timeframe::Timeframe;

pub const INITIAL_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub trades: Vec<Trade>,
    pub signals: Vec<Signal>,
    pub equity_curve: Vec<EquityPoint>,
    pub metrics: Metrics,
}

impl BacktestResult {
    pub fn final_equity(&self) -> f64 {
        self.metrics.final_equity
    }
}

pub fn run_backtest(
    bars: &[OhlcvBar],
    indicators: &IndicatorSet,
    config: &StrategyConfig,
    timeframe: Timeframe,
) -> BacktestResult {
    let mut portfolio = Portfolio::new(INITIAL_CAPITAL);

    if bars.len() < 2 {
        return finish(portfolio, Vec::new(), bars, timeframe);
    }

    let signals = generate_signals(bars, indicators, config);
    let by_bar = signals_by_bar(&signals, bars.len());
    let slip = config.slippage();
    let last = bars.len() - 1;

    for i in 1..bars.len() {
        let bar = &bars[i];
        let prev_signal = by_bar[i - 1].map(|s| s.kind);
        let atr = atr_or_fallback(indicators.atr.get(i).copied().flatten(), bar.close);

        // 1. signal exit
        if !portfolio.is_flat() && prev_signal == Some(SignalKind::Sell) {
            exit(
                &mut portfolio,
                i,
                bar,
                apply_slippage_exit(bar.open, slip),
                config.commission,
                TradeReason::SignalExit,
            );
        }

        // 2. take profit
        if config.use_take_profit {
            if let Some(entry_price) = portfolio.position.as_ref().map(|p| p.entry_price) {
                let target = take_profit_level(entry_price, atr, config);
                if let Some(raw) = take_profit_trigger(bar.open, bar.high, target) {
                    exit(
                        &mut portfolio,
                        i,
                        bar,
                        apply_slippage_exit(raw, slip),
                        config.commission,
                        TradeReason::TakeProfit,
                    );
                }
            }
        }

        // 3. stop loss
        if let Some(entry_price) = portfolio.position.as_ref().map(|p| p.entry_price) {
            let stop = stop_loss_level(entry_price, atr, config);
            if let Some(raw) = stop_loss_trigger(bar.open, bar.low, stop) {
                exit(
                    &mut portfolio,
                    i,
                    bar,
                    apply_slippage_exit(raw, slip),
                    config.commission,
                    TradeReason::StopLoss,
                );
            }
        }

        // 4. entry
        if portfolio.is_flat() {
            if let Some(signal) = by_bar[i - 1].filter(|s| s.kind == SignalKind::Buy) {
                match plan_entry(portfolio.cash, bar.open, atr, config) {
                    EntryResult::Entered {
                        shares,
                        execution_price,
                        commission,
                        ..
                    } => {
                        let trade = portfolio.open_position(
                            i,
                            bar.date,
                            execution_price,
                            shares,
                            commission,
                            signal.reason.into(),
                        );
                        debug!(
                            "{} BUY {} @ {:.4} ({})",
                            trade.date, trade.shares, trade.price, trade.reason
                        );
                    }
                    EntryResult::ZeroShares => {
                        debug!("{} entry skipped: zero shares", bar.date);
                    }
                    EntryResult::InsufficientCapital => {
                        debug!("{} entry skipped: insufficient capital", bar.date);
                    }
                }
            }
        }

        // 5. mark to market
        portfolio.record_equity(bar.date, bar.close);

        // 6. terminal unwind: no commission, not a trade
        if i == last {
            if let Some(proceeds) = portfolio.liquidate(apply_slippage_exit(bar.close, slip)) {
                debug!("{} liquidated open position for {:.2}", bar.date, proceeds);
            }
        }
    }

    finish(portfolio, signals, bars, timeframe)
}

fn exit(
    portfolio: &mut Portfolio,
    index: usize,
    bar: &OhlcvBar,
    execution_price: f64,
    commission: f64,
    reason: TradeReason,
) {
    if let Some(trade) =
        portfolio.close_position(index, bar.date, execution_price, commission, reason)
    {
        debug!(
            "{} SELL {} @ {:.4} ({})",
            trade.date, trade.shares, trade.price, trade.reason
        );
    }
}

fn finish(
    portfolio: Portfolio,
    signals: Vec<Signal>,
    bars: &[OhlcvBar],
    timeframe: Timeframe,
) -> BacktestResult {
    let metrics = Metrics::compute(&MetricsInput {
        trades: &portfolio.trades,
        equity_curve: &portfolio.equity_curve,
        initial_capital: portfolio.initial_capital,
        final_equity: portfolio.cash,
        max_drawdown_pct: portfolio.max_drawdown_pct,
        exposure_bars: portfolio.exposure_bars,
        start_date: bars.first().map(|b| b.date),
        end_date: bars.last().map(|b| b.date),
        timeframe,
    });

    BacktestResult {
        trades: portfolio.trades,
        signals,
        equity_curve: portfolio.equity_curve,
        metrics,
    }
}
