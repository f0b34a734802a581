//! # EV Forecast
//!
//! Forecasting of cumulative electric-vehicle adoption per county.
//!
//! ## Features
//!
//! - Loading of the preprocessed monthly EV table, grouped per county
//! - A fixed feature schema shared with externally trained regression models
//! - An iterative multi-step forecast that feeds each prediction back into
//!   its lag and trend features
//! - County outlooks with growth percentages and multi-county comparisons
//! - Hold-out backtesting of a model on a county's history
//!
//! ## Quick Start
//!
//! ```no_run
//! use ev_forecast::data::EvDataset;
//! use ev_forecast::engine::ForecastEngine;
//! use ev_forecast::models::LinearPredictor;
//! use ev_forecast::report::CountyOutlook;
//!
//! // Load data once and pass it around explicitly
//! let dataset = EvDataset::from_csv("preprocessed_ev_data.csv")?;
//!
//! // Any `Predictor` works; here, coefficients exported from a fitted model
//! let model = LinearPredictor::from_file("model.json")?;
//!
//! // 36 months ahead with a 6 month window
//! let engine = ForecastEngine::default();
//!
//! let outlook = CountyOutlook::forecast_county(dataset.county("King")?, &model, &engine)?;
//! println!("{}", outlook);
//! # Ok::<(), ev_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod report;
pub mod utils;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::{CountySeries, EvDataset, TimeSeriesPoint};
pub use crate::engine::{forecast, ForecastEngine, ForecastPoint, ForecastResult, Recurrence};
pub use crate::error::ForecastError;
pub use crate::features::{FeatureVector, FEATURE_NAMES};
pub use crate::models::{FnPredictor, LinearPredictor, Predictor};
pub use crate::report::{ComparisonReport, CountyOutlook};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
