//! Error types for the closecast crate

use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error types for the closecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// An input file does not exist
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Malformed date, price or ledger row
    #[error("Parse error: {0}")]
    Parse(String),

    /// Series too short to split, difference or fit
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// No candidate ARIMA order could be fitted
    #[error("Model selection failed: {0}")]
    ModelSelection(String),

    /// Persisting the ledger or a chart failed
    #[error("Failed to write {}: {source}", path.display())]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from parameter validation
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),

    /// Error from the ledger CSV codec
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error serialising chart specs
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the numerical kernels
    #[error("Math error: {0}")]
    Math(#[from] ts_math::MathError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}

impl ForecastError {
    /// Wrap an IO error raised while persisting `path`
    pub fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ForecastError::IoWrite {
            path: path.into(),
            source,
        }
    }
}
