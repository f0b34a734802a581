//! Error types for the ev_forecast crate

use ev_math::MathError;
use thiserror::Error;

/// Custom error types for the ev_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Error related to input data (missing county, bad rows, empty series)
    #[error("Data error: {0}")]
    DataError(String),

    /// The predictor failed to produce a usable value
    #[error("Predictor error: {0}")]
    PredictorError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from mathematical operations
    #[error("Math error: {0}")]
    MathError(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV parsing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from JSON (de)serialization
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<polars::prelude::PolarsError> for ForecastError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
