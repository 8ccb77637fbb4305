use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ForecastError {
    /// The series is too short for the requested algorithm.
    #[error("{operation} needs at least {required} data points, got {actual}")]
    InsufficientData {
        operation: &'static str,
        required: usize,
        actual: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Forecast {0} not found")]
    NotFound(Uuid),
}

pub type Result<T> = std::result::Result<T, ForecastError>;

pub(crate) fn require_len(operation: &'static str, actual: usize, required: usize) -> Result<()> {
    if actual < required {
        tracing::warn!(operation, actual, required, "rejecting short series");
        return Err(ForecastError::InsufficientData {
            operation,
            required,
            actual,
        });
    }
    Ok(())
}

pub(crate) fn invalid(msg: impl Into<String>) -> ForecastError {
    let msg = msg.into();
    tracing::warn!(reason = %msg, "rejecting invalid parameter");
    ForecastError::InvalidParameter(msg)
}

pub(crate) fn require_finite(label: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(invalid(format!("{label} must be finite, got {value}")));
    }
    Ok(())
}
