//! Configuration validation.
//!
//! Checks every `[data]`, `[strategy]` and `[optimize]` value before a run
//! starts. Missing numeric keys fall back to [`StrategyConfig`] defaults and
//! are validated as such.

use chrono::NaiveDate;

use crate::domain::error::BacktestError;
use crate::domain::optimizer::{Objective, OptimizableParam};
use crate::domain::range_spec::parse_range_spec;
use crate::domain::strategy::StrategyConfig;
use crate::domain::timeframe::Timeframe;
use crate::ports::config_port::ConfigPort;

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    validate_symbol(config)?;
    validate_dates(config)?;
    validate_timeframe(config)?;
    Ok(())
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let defaults = StrategyConfig::default();

    for (key, default) in [
        ("rsi_period", defaults.rsi_period),
        ("macd_fast", defaults.macd_fast),
        ("macd_slow", defaults.macd_slow),
        ("macd_signal", defaults.macd_signal),
        ("bb_period", defaults.bb_period),
        ("atr_period", defaults.atr_period),
        ("sma_fast", defaults.sma_fast),
        ("sma_slow", defaults.sma_slow),
    ] {
        validate_period(config, key, default)?;
    }

    validate_rsi_thresholds(config, &defaults)?;
    validate_macd_periods(config, &defaults)?;
    validate_risk_pct(config, &defaults)?;

    for (key, default) in [
        ("bb_std_dev", defaults.bb_std_dev),
        ("stop_atr", defaults.stop_atr),
        ("take_profit_atr", defaults.take_profit_atr),
    ] {
        let value = config.get_double("strategy", key, default);
        if value <= 0.0 {
            return Err(invalid("strategy", key, format!("{key} must be positive")));
        }
    }

    for (key, default) in [
        ("commission", defaults.commission),
        ("slippage_bps", defaults.slippage_bps),
    ] {
        let value = config.get_double("strategy", key, default);
        if value < 0.0 {
            return Err(invalid(
                "strategy",
                key,
                format!("{key} must be non-negative"),
            ));
        }
    }

    Ok(())
}

pub fn validate_optimize_config(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let param1 = match config.get_string("optimize", "param1") {
        Some(s) if !s.trim().is_empty() => s.parse::<OptimizableParam>()?,
        _ => {
            return Err(BacktestError::ConfigMissing {
                section: "optimize".to_string(),
                key: "param1".to_string(),
            })
        }
    };
    if param1 == OptimizableParam::None {
        return Err(invalid(
            "optimize",
            "param1",
            "param1 must name a strategy parameter".to_string(),
        ));
    }
    validate_range(config, "range1")?;

    let param2 = match config.get_string("optimize", "param2") {
        Some(s) if !s.trim().is_empty() => s.parse::<OptimizableParam>()?,
        _ => OptimizableParam::None,
    };
    if param2 != OptimizableParam::None {
        if param2 == param1 {
            return Err(invalid(
                "optimize",
                "param2",
                "param2 must differ from param1".to_string(),
            ));
        }
        validate_range(config, "range2")?;
    }

    if let Some(s) = config.get_string("optimize", "objective") {
        s.parse::<Objective>()?;
    }

    Ok(())
}

/// Parse an optional `YYYY-MM-DD` date from `[data]`.
pub fn parse_config_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, BacktestError> {
    match config.get_string("data", key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                invalid(
                    "data",
                    key,
                    format!("invalid {key} format, expected YYYY-MM-DD"),
                )
            }),
    }
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    match config.get_string("data", "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(BacktestError::ConfigMissing {
            section: "data".to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    let start = parse_config_date(config, "start_date")?;
    let end = parse_config_date(config, "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(invalid(
                "data",
                "start_date",
                "start_date must be before end_date".to_string(),
            ));
        }
    }
    Ok(())
}

fn validate_timeframe(config: &dyn ConfigPort) -> Result<(), BacktestError> {
    if let Some(s) = config.get_string("data", "timeframe") {
        s.parse::<Timeframe>()?;
    }
    Ok(())
}

fn validate_period(config: &dyn ConfigPort, key: &str, default: usize) -> Result<(), BacktestError> {
    let value = config.get_int("strategy", key, default as i64);
    if value < 1 {
        return Err(invalid("strategy", key, format!("{key} must be at least 1")));
    }
    Ok(())
}

fn validate_rsi_thresholds(
    config: &dyn ConfigPort,
    defaults: &StrategyConfig,
) -> Result<(), BacktestError> {
    let oversold = config.get_double("strategy", "rsi_oversold", defaults.rsi_oversold);
    let overbought = config.get_double("strategy", "rsi_overbought", defaults.rsi_overbought);
    if !(0.0..=100.0).contains(&oversold) || !(0.0..=100.0).contains(&overbought) {
        return Err(invalid(
            "strategy",
            "rsi_oversold",
            "RSI thresholds must be between 0 and 100".to_string(),
        ));
    }
    if oversold >= overbought {
        return Err(invalid(
            "strategy",
            "rsi_oversold",
            "rsi_oversold must be below rsi_overbought".to_string(),
        ));
    }
    Ok(())
}

fn validate_macd_periods(
    config: &dyn ConfigPort,
    defaults: &StrategyConfig,
) -> Result<(), BacktestError> {
    let fast = config.get_int("strategy", "macd_fast", defaults.macd_fast as i64);
    let slow = config.get_int("strategy", "macd_slow", defaults.macd_slow as i64);
    if fast >= slow {
        return Err(invalid(
            "strategy",
            "macd_fast",
            "macd_fast must be below macd_slow".to_string(),
        ));
    }
    Ok(())
}

fn validate_risk_pct(
    config: &dyn ConfigPort,
    defaults: &StrategyConfig,
) -> Result<(), BacktestError> {
    let value = config.get_double("strategy", "risk_pct", defaults.risk_pct);
    if value <= 0.0 || value > 100.0 {
        return Err(invalid(
            "strategy",
            "risk_pct",
            "risk_pct must be in (0, 100]".to_string(),
        ));
    }
    Ok(())
}

fn validate_range(config: &dyn ConfigPort, key: &str) -> Result<(), BacktestError> {
    match config.get_string("optimize", key) {
        Some(spec) => {
            if parse_range_spec(&spec).is_empty() {
                Err(BacktestError::InvalidRange { spec })
            } else {
                Ok(())
            }
        }
        None => Err(BacktestError::ConfigMissing {
            section: "optimize".to_string(),
            key: key.to_string(),
        }),
    }
}

fn invalid(section: &str, key: &str, reason: String) -> BacktestError {
    BacktestError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}
