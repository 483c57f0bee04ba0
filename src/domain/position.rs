//! Open position, trade ledger entries and round trips.

use chrono::NaiveDate;
use std::fmt;

use super::signal::SignalReason;

/// The single open long position of a backtest run.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_price: f64,
    pub shares: u64,
    pub entry_date: NaiveDate,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.shares as f64 * price
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeKind {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeReason {
    ReversalEntry,
    MomentumEntry,
    SignalExit,
    TakeProfit,
    StopLoss,
}

impl From<SignalReason> for TradeReason {
    fn from(reason: SignalReason) -> Self {
        match reason {
            SignalReason::MomentumEntry => TradeReason::MomentumEntry,
            SignalReason::ReversalEntry => TradeReason::ReversalEntry,
            SignalReason::ReversalSell => TradeReason::SignalExit,
        }
    }
}

impl fmt::Display for TradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TradeReason::ReversalEntry => "Reversal Entry",
            TradeReason::MomentumEntry => "Momentum Entry",
            TradeReason::SignalExit => "Signal Exit",
            TradeReason::TakeProfit => "Take Profit",
            TradeReason::StopLoss => "Stop Loss",
        };
        write!(f, "{}", s)
    }
}

/// One executed fill in the append-only ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub kind: TradeKind,
    pub index: usize,
    pub date: NaiveDate,
    pub price: f64,
    pub shares: u64,
    pub reason: TradeReason,
}

/// A buy matched with the sell that closed it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTrip {
    pub entry_date: NaiveDate,
    pub exit_date: NaiveDate,
    pub entry_price: f64,
    pub exit_price: f64,
    pub shares: u64,
    pub exit_reason: TradeReason,
}

impl RoundTrip {
    /// (exit - entry) / entry, in percent.
    pub fn return_pct(&self) -> f64 {
        if self.entry_price > 0.0 {
            (self.exit_price - self.entry_price) / self.entry_price * 100.0
        } else {
            0.0
        }
    }

    pub fn pnl(&self) -> f64 {
        self.shares as f64 * (self.exit_price - self.entry_price)
    }
}

/// Pair each sell with the most recent unmatched buy.
pub fn pair_trades(trades: &[Trade]) -> Vec<RoundTrip> {
    let mut open: Option<&Trade> = None;
    let mut pairs = Vec::new();

    for trade in trades {
        match trade.kind {
            TradeKind::Buy => open = Some(trade),
            TradeKind::Sell => {
                if let Some(buy) = open.take() {
                    pairs.push(RoundTrip {
                        entry_date: buy.date,
                        exit_date: trade.date,
                        entry_price: buy.price,
                        exit_price: trade.price,
                        shares: trade.shares,
                        exit_reason: trade.reason,
                    });
                }
            }
        }
    }

    pairs
}
