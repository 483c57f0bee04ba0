//! Cash, the open position and equity tracking for one backtest run.

use chrono::NaiveDate;

use super::position::{Position, Trade, TradeKind, TradeReason};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub cash: f64,
    pub initial_capital: f64,
    pub position: Option<Position>,
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub peak_equity: f64,
    pub max_drawdown_pct: f64,
    pub exposure_bars: usize,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            cash: initial_capital,
            initial_capital,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            peak_equity: initial_capital,
            max_drawdown_pct: 0.0,
            exposure_bars: 0,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.position.is_none()
    }

    /// Debit cost plus commission and record the buy.
    pub fn open_position(
        &mut self,
        index: usize,
        date: NaiveDate,
        execution_price: f64,
        shares: u64,
        commission: f64,
        reason: TradeReason,
    ) -> &Trade {
        self.cash -= shares as f64 * execution_price + commission;
        self.position = Some(Position {
            entry_price: execution_price,
            shares,
            entry_date: date,
        });
        self.push_trade(Trade {
            kind: TradeKind::Buy,
            index,
            date,
            price: execution_price,
            shares,
            reason,
        })
    }

    /// Credit proceeds less commission and record the sell.
    /// Returns `None` when flat.
    pub fn close_position(
        &mut self,
        index: usize,
        date: NaiveDate,
        execution_price: f64,
        commission: f64,
        reason: TradeReason,
    ) -> Option<&Trade> {
        let position = self.position.take()?;
        self.cash += position.market_value(execution_price) - commission;
        Some(self.push_trade(Trade {
            kind: TradeKind::Sell,
            index,
            date,
            price: execution_price,
            shares: position.shares,
            reason,
        }))
    }

    /// Fold the open position into cash at `execution_price` without
    /// touching the ledger. Returns the proceeds, or `None` when flat.
    pub fn liquidate(&mut self, execution_price: f64) -> Option<f64> {
        let position = self.position.take()?;
        let proceeds = position.market_value(execution_price);
        self.cash += proceeds;
        Some(proceeds)
    }

    /// Mark to market at `close`, extend the curve and update the drawdown.
    pub fn record_equity(&mut self, date: NaiveDate, close: f64) -> f64 {
        let equity = self.cash
            + self
                .position
                .as_ref()
                .map_or(0.0, |p| p.market_value(close));
        if self.position.is_some() {
            self.exposure_bars += 1;
        }

        if equity > self.peak_equity {
            self.peak_equity = equity;
        }
        if self.peak_equity > 0.0 {
            let drawdown = (self.peak_equity - equity) / self.peak_equity * 100.0;
            if drawdown > self.max_drawdown_pct {
                self.max_drawdown_pct = drawdown;
            }
        }

        self.equity_curve.push(EquityPoint { date, equity });
        equity
    }

    fn push_trade(&mut self, trade: Trade) -> &Trade {
        self.trades.push(trade);
        &self.trades[self.trades.len() - 1]
    }
}
