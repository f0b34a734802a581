//! # EV Math
//!
//! Numeric building blocks for the EV adoption forecast.
//! This crate provides the bounded sliding window used by the forecast
//! recurrence, the feature arithmetic (means, guarded percentage changes,
//! least-squares trend slopes) and forecast accuracy metrics.

use thiserror::Error;

pub mod accuracy;
pub mod regression;
pub mod stats;
pub mod window;

pub use accuracy::{forecast_accuracy, ForecastAccuracy};
pub use regression::{least_squares_slope, LinearFit};
pub use stats::{cumulative_sum, mean, pct_change};
pub use window::SlidingWindow;

/// Errors that can occur in forecast-related calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for forecast math operations
pub type Result<T> = std::result::Result<T, MathError>;
