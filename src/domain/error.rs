//! Domain error types.

/// Top-level error type for algotrader.
#[derive(Debug, thiserror::Error)]
pub enum AlgoTraderError {
    #[error("price series is empty")]
    EmptySeries,

    #[error("insufficient data: have {bars} bars, need {minimum}")]
    InsufficientData { bars: usize, minimum: usize },

    #[error("{series} series has {actual} values, expected {expected}")]
    LengthMismatch {
        series: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid close price {value} at bar {index}")]
    InvalidPrice { index: usize, value: f64 },

    #[error("missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("data error: {reason}")]
    Data { reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&AlgoTraderError> for std::process::ExitCode {
    fn from(err: &AlgoTraderError) -> Self {
        let code: u8 = match err {
            AlgoTraderError::Io(_) => 1,
            AlgoTraderError::ConfigParse { .. }
            | AlgoTraderError::ConfigMissing { .. }
            | AlgoTraderError::ConfigInvalid { .. } => 2,
            AlgoTraderError::EmptySeries
            | AlgoTraderError::InsufficientData { .. }
            | AlgoTraderError::LengthMismatch { .. }
            | AlgoTraderError::InvalidPrice { .. }
            | AlgoTraderError::MissingColumn { .. }
            | AlgoTraderError::Data { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
