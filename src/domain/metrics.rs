//! Performance metrics and statistics.
//!
//! Trade statistics come from round trips (see [`pair_trades`]); risk ratios
//! come from the per-bar equity curve. Degenerate denominators resolve to
//! fixed sentinels: 0 for Sharpe/Sortino, +∞ for profit factor and Calmar.

use chrono::NaiveDate;

pub use super::position::pair_trades;
use super::portfolio::EquityPoint;
use super::position::{RoundTrip, Trade};
use super::timeframe::Timeframe;

const DAYS_PER_YEAR: f64 = 365.25;

/// Everything a finished simulation hands to [`Metrics::compute`].
#[derive(Debug, Clone)]
pub struct MetricsInput<'a> {
    pub trades: &'a [Trade],
    pub equity_curve: &'a [EquityPoint],
    pub initial_capital: f64,
    pub final_equity: f64,
    pub max_drawdown_pct: f64,
    pub exposure_bars: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub timeframe: Timeframe,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metrics {
    pub final_equity: f64,
    pub total_return_pct: f64,
    pub cagr_pct: f64,
    pub sharpe_ratio: f64,
    pub sortino_ratio: f64,
    pub calmar_ratio: f64,
    pub max_drawdown_pct: f64,
    pub total_trades: usize,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub avg_win_pct: f64,
    pub avg_loss_pct: f64,
    pub profit_factor: f64,
    pub max_consec_wins: usize,
    pub max_consec_losses: usize,
    pub exposure_pct: f64,
}

impl Metrics {
    pub fn compute(input: &MetricsInput<'_>) -> Self {
        let round_trips = pair_trades(input.trades);

        let total_return_pct = if input.initial_capital > 0.0 {
            (input.final_equity - input.initial_capital) / input.initial_capital * 100.0
        } else {
            0.0
        };

        let years = match (input.start_date, input.end_date) {
            (Some(start), Some(end)) => (end - start).num_days() as f64 / DAYS_PER_YEAR,
            _ => 0.0,
        };
        let cagr_pct = cagr(input.initial_capital, input.final_equity, years) * 100.0;

        let factor = input.timeframe.annualization_factor();
        let (sharpe_ratio, sortino_ratio) = compute_risk_adjusted(input.equity_curve, factor);

        let calmar_ratio = if input.max_drawdown_pct > 0.0 {
            cagr_pct / input.max_drawdown_pct
        } else {
            f64::INFINITY
        };

        let stats = TradeStats::from_round_trips(&round_trips);

        let simulated_bars = input.equity_curve.len();
        let exposure_pct = if simulated_bars > 0 {
            input.exposure_bars as f64 / simulated_bars as f64 * 100.0
        } else {
            0.0
        };

        Metrics {
            final_equity: input.final_equity,
            total_return_pct,
            cagr_pct,
            sharpe_ratio,
            sortino_ratio,
            calmar_ratio,
            max_drawdown_pct: input.max_drawdown_pct,
            total_trades: round_trips.len(),
            wins: stats.wins,
            losses: stats.losses,
            win_rate: stats.win_rate,
            avg_win_pct: stats.avg_win_pct,
            avg_loss_pct: stats.avg_loss_pct,
            profit_factor: stats.profit_factor,
            max_consec_wins: stats.max_consec_wins,
            max_consec_losses: stats.max_consec_losses,
            exposure_pct,
        }
    }
}

/// Compound annual growth as a fraction; 0 when no time has elapsed.
pub fn cagr(initial: f64, final_value: f64, years: f64) -> f64 {
    if years <= 0.0 || initial <= 0.0 {
        return 0.0;
    }
    if final_value <= 0.0 {
        return -1.0;
    }
    (final_value / initial).powf(1.0 / years) - 1.0
}

#[derive(Debug, Default)]
struct TradeStats {
    wins: usize,
    losses: usize,
    win_rate: f64,
    avg_win_pct: f64,
    avg_loss_pct: f64,
    profit_factor: f64,
    max_consec_wins: usize,
    max_consec_losses: usize,
}

impl TradeStats {
    fn from_round_trips(round_trips: &[RoundTrip]) -> Self {
        if round_trips.is_empty() {
            return TradeStats::default();
        }

        let mut stats = TradeStats::default();
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;
        let mut win_streak = 0usize;
        let mut loss_streak = 0usize;

        for rt in round_trips {
            let ret = rt.return_pct();
            if ret > 0.0 {
                stats.wins += 1;
                gross_profit += ret;
                win_streak += 1;
                loss_streak = 0;
            } else {
                stats.losses += 1;
                gross_loss += -ret;
                loss_streak += 1;
                win_streak = 0;
            }
            stats.max_consec_wins = stats.max_consec_wins.max(win_streak);
            stats.max_consec_losses = stats.max_consec_losses.max(loss_streak);
        }

        stats.win_rate = stats.wins as f64 / round_trips.len() as f64 * 100.0;
        if stats.wins > 0 {
            stats.avg_win_pct = gross_profit / stats.wins as f64;
        }
        if stats.losses > 0 {
            stats.avg_loss_pct = -gross_loss / stats.losses as f64;
        }
        stats.profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        stats
    }
}

/// Per-bar percentage changes of consecutive equity values.
pub fn period_returns(equity_curve: &[EquityPoint]) -> Vec<f64> {
    equity_curve
        .windows(2)
        .map(|w| {
            let prev = w[0].equity;
            let curr = w[1].equity;
            if prev > 0.0 {
                (curr - prev) / prev
            } else {
                0.0
            }
        })
        .collect()
}

/// (Sharpe, Sortino), annualized by `factor`, risk-free rate 0.
fn compute_risk_adjusted(equity_curve: &[EquityPoint], factor: f64) -> (f64, f64) {
    let returns = period_returns(equity_curve);
    if returns.is_empty() {
        return (0.0, 0.0);
    }

    let n = returns.len() as f64;
    let mean: f64 = returns.iter().sum::<f64>() / n;
    let variance: f64 = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();

    let sharpe = if stddev > 0.0 {
        (mean * factor) / (stddev * factor.sqrt())
    } else {
        0.0
    };

    let downside: Vec<f64> = returns.iter().copied().filter(|&r| r < 0.0).collect();
    let downside_dev = if downside.is_empty() {
        0.0
    } else {
        (downside.iter().map(|r| r * r).sum::<f64>() / downside.len() as f64).sqrt()
    };

    let sortino = if downside_dev > 0.0 {
        (mean * factor) / (downside_dev * factor.sqrt())
    } else {
        0.0
    };

    (sharpe, sortino)
}
