use thiserror::Error;

/// Errors raised while loading telemetry or validating a replay config.
///
/// Everything here surfaces before the first frame; rendering itself does
/// not fail.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read telemetry: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed telemetry: {0}")]
    Csv(#[from] csv::Error),

    #[error("telemetry contains no samples")]
    Empty,

    #[error("degenerate {field} domain: maximum is {max}, plot needs a non-zero finite maximum")]
    DegenerateDomain { field: &'static str, max: f64 },

    #[error("non-finite value in '{field}' at row {row}")]
    NonFinite { row: usize, field: &'static str },

    #[error("time goes backwards at row {row} ({previous} s -> {current} s)")]
    TimeNotMonotonic { row: usize, previous: f64, current: f64 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

impl ReplayError {
    pub(crate) fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ReplayError>;
