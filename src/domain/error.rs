//! Domain error types.
//!
//! Numeric edge cases (warm-up gaps, zero volatility, zero losses) are never
//! errors; they resolve to `None` or sentinel values where they arise.

#[derive(Debug, thiserror::Error)]
pub enum BacktestError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid range specification {spec:?}")]
    InvalidRange { spec: String },

    #[error("unknown optimization parameter {name:?}")]
    UnknownParameter { name: String },

    #[error("unknown optimization objective {name:?}")]
    UnknownObjective { name: String },

    #[error("unknown timeframe {name:?}")]
    UnknownTimeframe { name: String },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("insufficient data for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientData {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("optimization cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&BacktestError> for std::process::ExitCode {
    fn from(err: &BacktestError) -> Self {
        let code: u8 = match err {
            BacktestError::Io(_) => 1,
            BacktestError::ConfigParse { .. }
            | BacktestError::ConfigMissing { .. }
            | BacktestError::ConfigInvalid { .. }
            | BacktestError::UnknownTimeframe { .. } => 2,
            BacktestError::Data { .. } | BacktestError::InsufficientData { .. } => 3,
            BacktestError::InvalidRange { .. }
            | BacktestError::UnknownParameter { .. }
            | BacktestError::UnknownObjective { .. } => 4,
            BacktestError::Cancelled => 5,
        };
        std::process::ExitCode::from(code)
    }
}
