//! Hold-out evaluation of a predictor on a county's history

use crate::data::CountySeries;
use crate::engine::ForecastEngine;
use crate::error::{ForecastError, Result};
use crate::models::Predictor;
use ev_math::{forecast_accuracy, ForecastAccuracy};
use serde::Serialize;
use tracing::info;

/// Outcome of forecasting the last months of a history from the months before
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestReport {
    /// County evaluated
    pub county: String,
    /// Number of months held out
    pub holdout: usize,
    /// Unrounded predictions for the held-out months
    pub forecast: Vec<f64>,
    /// Observed values for the held-out months
    pub actual: Vec<f64>,
    /// Accuracy of `forecast` against `actual`
    pub accuracy: ForecastAccuracy,
}

/// Hold out the last `holdout` months of `series`, forecast them from the
/// remaining history and compare with what was observed.
pub fn backtest<P>(
    series: &CountySeries,
    predictor: &P,
    holdout: usize,
    window: usize,
) -> Result<BacktestReport>
where
    P: Predictor + ?Sized,
{
    if holdout == 0 || holdout >= series.len() {
        return Err(ForecastError::InvalidParameter(format!(
            "Holdout must be between 1 and {} for county '{}', got {}",
            series.len().saturating_sub(1),
            series.county(),
            holdout
        )));
    }

    let training = series.truncate(series.len() - holdout)?;
    let engine = ForecastEngine::with_window(holdout, window)?;
    let forecast = engine.forecast(&training, predictor)?.raw_predictions();
    let actual = series.values()[series.len() - holdout..].to_vec();
    let accuracy = forecast_accuracy(&forecast, &actual)?;

    info!(
        county = series.county(),
        holdout,
        mae = accuracy.mae,
        rmse = accuracy.rmse,
        "Backtest complete"
    );

    Ok(BacktestReport {
        county: series.county().to_string(),
        holdout,
        forecast,
        actual,
        accuracy,
    })
}

impl std::fmt::Display for BacktestReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Backtest for {} ({} held-out months):",
            self.county, self.holdout
        )?;
        write!(f, "{}", self.accuracy)
    }
}
