//! Core domain types and logic.

pub mod ohlcv;
pub mod timeframe;
pub mod position;
pub mod portfolio;
pub mod execution;
pub mod indicator;
pub mod indicator_helpers;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod strategy;
pub mod range_spec;
pub mod optimizer;
pub mod config_validation;
pub mod error;
