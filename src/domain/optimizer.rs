//! Brute-force grid search over one or two strategy parameters.
//!
//! Every cell is an independent backtest over the same immutable bars, so
//! the grid is computed with rayon and collected by cell index: a parallel
//! sweep produces exactly the grid a sequential one would.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{info, warn};
use rayon::prelude::*;

use crate::domain::backtest::{run_backtest, BacktestResult};
use crate::domain::error::BacktestError;
use crate::domain::indicator_helpers::compute_indicators;
use crate::domain::metrics::{cagr, pair_trades};
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::strategy::StrategyConfig;
use crate::domain::timeframe::Timeframe;

/// Cells with fewer completed round trips than this are disqualified.
pub const MIN_ROUND_TRIPS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizableParam {
    None,
    RsiPeriod,
    RsiOversold,
    RsiOverbought,
    MacdFast,
    MacdSlow,
    MacdSignal,
    BbPeriod,
    BbStdDev,
    AtrPeriod,
    SmaFast,
    SmaSlow,
    RiskPct,
    StopAtr,
    TakeProfitAtr,
    SlippageBps,
    Commission,
}

impl OptimizableParam {
    pub const ALL: [OptimizableParam; 17] = [
        OptimizableParam::None,
        OptimizableParam::RsiPeriod,
        OptimizableParam::RsiOversold,
        OptimizableParam::RsiOverbought,
        OptimizableParam::MacdFast,
        OptimizableParam::MacdSlow,
        OptimizableParam::MacdSignal,
        OptimizableParam::BbPeriod,
        OptimizableParam::BbStdDev,
        OptimizableParam::AtrPeriod,
        OptimizableParam::SmaFast,
        OptimizableParam::SmaSlow,
        OptimizableParam::RiskPct,
        OptimizableParam::StopAtr,
        OptimizableParam::TakeProfitAtr,
        OptimizableParam::SlippageBps,
        OptimizableParam::Commission,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            OptimizableParam::None => "none",
            OptimizableParam::RsiPeriod => "rsi_period",
            OptimizableParam::RsiOversold => "rsi_oversold",
            OptimizableParam::RsiOverbought => "rsi_overbought",
            OptimizableParam::MacdFast => "macd_fast",
            OptimizableParam::MacdSlow => "macd_slow",
            OptimizableParam::MacdSignal => "macd_signal",
            OptimizableParam::BbPeriod => "bb_period",
            OptimizableParam::BbStdDev => "bb_std_dev",
            OptimizableParam::AtrPeriod => "atr_period",
            OptimizableParam::SmaFast => "sma_fast",
            OptimizableParam::SmaSlow => "sma_slow",
            OptimizableParam::RiskPct => "risk_pct",
            OptimizableParam::StopAtr => "stop_atr",
            OptimizableParam::TakeProfitAtr => "take_profit_atr",
            OptimizableParam::SlippageBps => "slippage_bps",
            OptimizableParam::Commission => "commission",
        }
    }

    /// Write `value` into the matching config field. Period fields round to
    /// the nearest whole bar.
    pub fn apply(&self, config: &mut StrategyConfig, value: f64) {
        let period = || value.round().max(0.0) as usize;
        match self {
            OptimizableParam::None => {}
            OptimizableParam::RsiPeriod => config.rsi_period = period(),
            OptimizableParam::RsiOversold => config.rsi_oversold = value,
            OptimizableParam::RsiOverbought => config.rsi_overbought = value,
            OptimizableParam::MacdFast => config.macd_fast = period(),
            OptimizableParam::MacdSlow => config.macd_slow = period(),
            OptimizableParam::MacdSignal => config.macd_signal = period(),
            OptimizableParam::BbPeriod => config.bb_period = period(),
            OptimizableParam::BbStdDev => config.bb_std_dev = value,
            OptimizableParam::AtrPeriod => config.atr_period = period(),
            OptimizableParam::SmaFast => config.sma_fast = period(),
            OptimizableParam::SmaSlow => config.sma_slow = period(),
            OptimizableParam::RiskPct => config.risk_pct = value,
            OptimizableParam::StopAtr => config.stop_atr = value,
            OptimizableParam::TakeProfitAtr => config.take_profit_atr = value,
            OptimizableParam::SlippageBps => config.slippage_bps = value,
            OptimizableParam::Commission => config.commission = value,
        }
    }
}

impl fmt::Display for OptimizableParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for OptimizableParam {
    type Err = BacktestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        OptimizableParam::ALL
            .iter()
            .copied()
            .find(|p| p.name() == name)
            .ok_or_else(|| BacktestError::UnknownParameter {
                name: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Objective {
    #[default]
    Sharpe,
    Cagr,
    /// Strategy CAGR minus buy-and-hold CAGR.
    Alpha,
    WinRate,
    /// Scored as the negated drawdown, so shallower is better.
    MaxDrawdown,
}

impl Objective {
    pub fn name(&self) -> &'static str {
        match self {
            Objective::Sharpe => "sharpe",
            Objective::Cagr => "cagr",
            Objective::Alpha => "alpha",
            Objective::WinRate => "win_rate",
            Objective::MaxDrawdown => "max_drawdown",
        }
    }

    /// Higher is better for every objective.
    pub fn score(&self, result: &BacktestResult, benchmark_cagr_pct: f64) -> f64 {
        if pair_trades(&result.trades).len() < MIN_ROUND_TRIPS {
            return f64::NEG_INFINITY;
        }
        let m = &result.metrics;
        match self {
            Objective::Sharpe => m.sharpe_ratio,
            Objective::Cagr => m.cagr_pct,
            Objective::Alpha => m.cagr_pct - benchmark_cagr_pct,
            Objective::WinRate => m.win_rate,
            Objective::MaxDrawdown => -m.max_drawdown_pct,
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Objective {
    type Err = BacktestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sharpe" => Ok(Objective::Sharpe),
            "cagr" => Ok(Objective::Cagr),
            "alpha" => Ok(Objective::Alpha),
            "win_rate" | "winrate" => Ok(Objective::WinRate),
            "max_drawdown" | "maxdd" => Ok(Objective::MaxDrawdown),
            _ => Err(BacktestError::UnknownObjective {
                name: s.to_string(),
            }),
        }
    }
}

/// Buy-and-hold CAGR in percent, first close to last close.
pub fn benchmark_cagr(bars: &[OhlcvBar]) -> f64 {
    match (bars.first(), bars.last()) {
        (Some(first), Some(last)) if bars.len() >= 2 => {
            let years = (last.date - first.date).num_days() as f64 / 365.25;
            cagr(first.close, last.close, years) * 100.0
        }
        _ => 0.0,
    }
}

/// Cooperative cancellation flag shared with the sweep's worker threads.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestCell {
    pub value1: f64,
    /// `None` for a one-dimensional sweep.
    pub value2: Option<f64>,
    pub score: f64,
    pub config: StrategyConfig,
    pub result: BacktestResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationResult {
    pub param1: OptimizableParam,
    pub param2: OptimizableParam,
    pub values1: Vec<f64>,
    pub values2: Vec<f64>,
    /// `grid[row][col]`, rows over `values1`. One column when `param2` is unused.
    /// Disqualified cells hold `None`.
    pub grid: Vec<Vec<Option<f64>>>,
    pub best: Option<BestCell>,
}

impl OptimizationResult {
    pub fn cell_count(&self) -> usize {
        self.grid.iter().map(Vec::len).sum()
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run_optimization(
    bars: &[OhlcvBar],
    base: &StrategyConfig,
    param1: OptimizableParam,
    range1: &[f64],
    param2: OptimizableParam,
    range2: &[f64],
    objective: Objective,
    cancel: &CancelToken,
) -> Result<OptimizationResult, BacktestError> {
    if param1 == OptimizableParam::None || range1.is_empty() {
        return Err(BacktestError::InvalidRange {
            spec: format!("{} over {} values", param1, range1.len()),
        });
    }

    let (param2, values2) = if param2 == OptimizableParam::None || range2.is_empty() {
        (OptimizableParam::None, Vec::new())
    } else {
        (param2, range2.to_vec())
    };

    let mut result = OptimizationResult {
        param1,
        param2,
        values1: range1.to_vec(),
        values2,
        grid: Vec::new(),
        best: None,
    };

    if bars.len() < 2 {
        warn!("optimization skipped: {} bars", bars.len());
        return Ok(result);
    }

    let cols = result.values2.len().max(1);
    let total = result.values1.len() * cols;
    let benchmark = benchmark_cagr(bars);

    info!(
        "optimizing {} x {} by {}: {} cells over {} bars",
        param1,
        param2,
        objective,
        total,
        bars.len()
    );

    let cell_config = |idx: usize| -> (f64, Option<f64>, StrategyConfig) {
        let v1 = result.values1[idx / cols];
        let v2 = result.values2.get(idx % cols).copied();
        let mut config = base.clone();
        param1.apply(&mut config, v1);
        if let Some(v2) = v2 {
            param2.apply(&mut config, v2);
        }
        (v1, v2, config)
    };

    let scores: Vec<f64> = (0..total)
        .into_par_iter()
        .map(|idx| {
            if cancel.is_cancelled() {
                return Err(BacktestError::Cancelled);
            }
            let (_, _, config) = cell_config(idx);
            let outcome = simulate(bars, &config);
            Ok(objective.score(&outcome, benchmark))
        })
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|_| warn!("optimization cancelled"))?;

    let mut best: Option<(usize, f64)> = None;
    for (idx, &score) in scores.iter().enumerate() {
        if score.is_finite() && best.is_none_or(|(_, s)| score > s) {
            best = Some((idx, score));
        }
    }

    let best_cell = best.map(|(idx, score)| {
        let (value1, value2, config) = cell_config(idx);
        let outcome = simulate(bars, &config);
        BestCell {
            value1,
            value2,
            score,
            config,
            result: outcome,
        }
    });

    result.grid = scores
        .chunks(cols)
        .map(|row| {
            row.iter()
                .map(|&s| if s.is_finite() { Some(s) } else { None })
                .collect()
        })
        .collect();
    result.best = best_cell;

    match &result.best {
        Some(b) => info!(
            "best {}={}{} score {:.4}",
            param1,
            b.value1,
            b.value2
                .map(|v| format!(", {}={}", param2, v))
                .unwrap_or_default(),
            b.score
        ),
        None => warn!("no cell reached {} round trips", MIN_ROUND_TRIPS),
    }

    Ok(result)
}

fn simulate(bars: &[OhlcvBar], config: &StrategyConfig) -> BacktestResult {
    let indicators = compute_indicators(bars, config);
    run_backtest(bars, &indicators, config, Timeframe::Daily)
}
