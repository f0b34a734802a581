//! Iterative multi-step forecast of monthly EV counts
//!
//! Each forecast month is predicted from features built out of the months
//! before it, and the prediction is fed back into the lag and cumulative
//! windows before the next month is built. Steps therefore run strictly in
//! order.
//!
//! ```no_run
//! use ev_forecast::data::EvDataset;
//! use ev_forecast::engine::ForecastEngine;
//! use ev_forecast::models::LinearPredictor;
//!
//! let dataset = EvDataset::from_csv("preprocessed_ev_data.csv")?;
//! let model = LinearPredictor::from_file("model.json")?;
//! let engine = ForecastEngine::default();
//!
//! let result = engine.forecast(dataset.county("King")?, &model)?;
//! println!("Total after {} months: {}", result.horizon(), result.final_total());
//! # Ok::<(), ev_forecast::ForecastError>(())
//! ```

use crate::config::{ForecastConfig, DEFAULT_HORIZON, DEFAULT_WINDOW};
use crate::data::CountySeries;
use crate::error::{ForecastError, Result};
use crate::features::FeatureVector;
use crate::models::Predictor;
use chrono::{Months, NaiveDate};
use ev_math::{cumulative_sum, least_squares_slope, mean, pct_change, SlidingWindow};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Number of lag features in the schema
const LAG_COUNT: usize = 3;

/// Window state carried from one forecast step to the next
#[derive(Debug, Clone)]
pub struct Recurrence {
    county_code: i64,
    anchor: NaiveDate,
    months_since_start: i64,
    step: u32,
    recent_values: SlidingWindow,
    recent_cumulative: SlidingWindow,
}

impl Recurrence {
    /// Seed the windows from the tail of a county's history
    pub fn seed(series: &CountySeries, window: usize) -> Result<Self> {
        let anchor = series.last_date().ok_or_else(|| {
            ForecastError::DataError(format!(
                "County '{}' has no history to forecast from",
                series.county()
            ))
        })?;

        let values = series.values();
        let cumulative = cumulative_sum(&values);

        Ok(Self {
            county_code: series.county_code(),
            anchor,
            months_since_start: series.months_since_start(),
            step: 0,
            recent_values: SlidingWindow::from_tail(window, &values)?,
            recent_cumulative: SlidingWindow::from_tail(window, &cumulative)?,
        })
    }

    /// Number of predictions absorbed so far
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Date of the month the next prediction is for
    pub fn next_date(&self) -> Result<NaiveDate> {
        self.anchor
            .checked_add_months(Months::new(self.step + 1))
            .ok_or_else(|| {
                ForecastError::DataError(format!(
                    "Forecast date overflow {} months after {}",
                    self.step + 1,
                    self.anchor
                ))
            })
    }

    /// Build the features for the next month from the current windows.
    ///
    /// Lags missing from a short history are zero, and the growth slope is
    /// zero until the cumulative window is full.
    pub fn next_features(&self) -> Result<FeatureVector> {
        let lag1 = self.recent_values.lag(1).unwrap_or(0.0);
        let lag2 = self.recent_values.lag(2).unwrap_or(0.0);
        let lag3 = self.recent_values.lag(3).unwrap_or(0.0);

        let growth_slope = if self.recent_cumulative.is_full() {
            least_squares_slope(&self.recent_cumulative.to_vec())?
        } else {
            0.0
        };

        Ok(FeatureVector {
            months_since_start: self.months_since_start + 1,
            county_encoded: self.county_code,
            ev_total_lag1: lag1,
            ev_total_lag2: lag2,
            ev_total_lag3: lag3,
            ev_total_roll_mean_3: mean(&[lag1, lag2, lag3]).unwrap_or(0.0),
            ev_total_pct_change_1: pct_change(lag1, lag2),
            ev_total_pct_change_3: pct_change(lag1, lag3),
            ev_growth_slope: growth_slope,
        })
    }

    /// Feed a raw prediction back into both windows, returning the new running total
    pub fn advance(&mut self, prediction: f64) -> f64 {
        let total = self.recent_cumulative.last().unwrap_or(0.0) + prediction;
        self.recent_values.push(prediction);
        self.recent_cumulative.push(total);
        self.months_since_start += 1;
        self.step += 1;
        total
    }

    /// Recent monthly values, oldest first
    pub fn recent_values(&self) -> &SlidingWindow {
        &self.recent_values
    }

    /// Recent running totals, oldest first
    pub fn recent_cumulative(&self) -> &SlidingWindow {
        &self.recent_cumulative
    }
}

/// One forecast month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Month being predicted
    pub date: NaiveDate,
    /// Months-since-start counter of the month
    pub months_since_start: i64,
    /// Unrounded model output
    pub predicted: f64,
    /// Prediction rounded to a whole vehicle count
    pub rounded: f64,
    /// Historical total plus all rounded predictions up to this month
    pub cumulative: f64,
}

/// Forecast of a single county
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    county: String,
    historical_total: f64,
    points: Vec<ForecastPoint>,
}

impl ForecastResult {
    pub fn county(&self) -> &str {
        &self.county
    }

    /// Cumulative total the forecast is chained onto
    pub fn historical_total(&self) -> f64 {
        self.historical_total
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Number of months forecasted
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Rounded monthly predictions
    pub fn predictions(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.rounded).collect()
    }

    /// Unrounded monthly predictions
    pub fn raw_predictions(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted).collect()
    }

    /// Running cumulative totals per forecast month
    pub fn cumulative(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.cumulative).collect()
    }

    /// Cumulative total at the end of the horizon
    pub fn final_total(&self) -> f64 {
        self.points
            .last()
            .map(|p| p.cumulative)
            .unwrap_or(self.historical_total)
    }
}

/// Configured forecast runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastEngine {
    horizon: usize,
    window: usize,
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            window: DEFAULT_WINDOW,
        }
    }
}

impl ForecastEngine {
    /// Engine forecasting `horizon` months with the default window
    pub fn new(horizon: usize) -> Result<Self> {
        Self::with_window(horizon, DEFAULT_WINDOW)
    }

    /// Engine with an explicit window size for the lag and cumulative windows
    pub fn with_window(horizon: usize, window: usize) -> Result<Self> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be positive".to_string(),
            ));
        }
        if window < LAG_COUNT {
            return Err(ForecastError::InvalidParameter(format!(
                "Window must hold at least {} values, got {}",
                LAG_COUNT, window
            )));
        }

        Ok(Self { horizon, window })
    }

    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        Self::with_window(config.horizon, config.window)
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn window(&self) -> usize {
        self.window
    }

    /// Forecast `horizon` months past the end of `series`.
    ///
    /// Any predictor failure aborts the whole forecast.
    pub fn forecast<P>(&self, series: &CountySeries, predictor: &P) -> Result<ForecastResult>
    where
        P: Predictor + ?Sized,
    {
        info!(
            county = series.county(),
            history = series.len(),
            horizon = self.horizon,
            model = predictor.name(),
            "Forecasting county"
        );

        let mut state = Recurrence::seed(series, self.window)?;
        let historical_total = series.historical_total();
        let mut cumulative = historical_total;
        let mut points = Vec::with_capacity(self.horizon);

        for _ in 0..self.horizon {
            let date = state.next_date()?;
            let features = state.next_features()?;
            let predicted = predictor.predict(&features)?;
            if !predicted.is_finite() {
                return Err(ForecastError::PredictorError(format!(
                    "{} returned {} for {}",
                    predictor.name(),
                    predicted,
                    date
                )));
            }

            let rounded = predicted.round_ties_even();
            cumulative += rounded;
            state.advance(predicted);

            debug!(
                step = state.step(),
                %date,
                lag1 = features.ev_total_lag1,
                slope = features.ev_growth_slope,
                predicted,
                cumulative,
                "Forecast step"
            );

            points.push(ForecastPoint {
                date,
                months_since_start: features.months_since_start,
                predicted,
                rounded,
                cumulative,
            });
        }

        info!(
            county = series.county(),
            historical_total,
            forecast_total = cumulative,
            "Forecast complete"
        );

        Ok(ForecastResult {
            county: series.county().to_string(),
            historical_total,
            points,
        })
    }
}

/// Forecast `horizon` months past the end of `series` with the default window
pub fn forecast<P>(series: &CountySeries, predictor: &P, horizon: usize) -> Result<ForecastResult>
where
    P: Predictor + ?Sized,
{
    ForecastEngine::new(horizon)?.forecast(series, predictor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::TimeSeriesPoint;
    use crate::models::FnPredictor;
    use approx::assert_relative_eq;
    use std::cell::Cell;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series(values: &[f64]) -> CountySeries {
        CountySeries::from_values("King", 3, ymd(2024, 1, 1), values).unwrap()
    }

    #[test]
    fn test_first_step_slope_matches_history_fit() {
        let history = series(&[100.0, 110.0, 120.0, 130.0, 140.0, 150.0]);
        let state = Recurrence::seed(&history, 6).unwrap();
        let features = state.next_features().unwrap();

        let expected = least_squares_slope(&history.cumulative_totals()).unwrap();
        assert_relative_eq!(features.ev_growth_slope, expected, epsilon = 1e-9);
        assert_eq!(features.ev_total_lag1, 150.0);
        assert_eq!(features.ev_total_lag2, 140.0);
        assert_eq!(features.ev_total_lag3, 130.0);
        assert_eq!(features.ev_total_roll_mean_3, 140.0);
        assert_eq!(features.months_since_start, 6);
        assert_eq!(features.county_encoded, 3);
    }

    #[test]
    fn test_slope_zero_with_short_history() {
        let history = series(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let state = Recurrence::seed(&history, 6).unwrap();
        assert_eq!(state.next_features().unwrap().ev_growth_slope, 0.0);
    }

    #[test]
    fn test_slope_uses_only_recent_window() {
        let long = series(&[1.0, 1.0, 1.0, 5.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
        let state = Recurrence::seed(&long, 6).unwrap();
        let cumulative = long.cumulative_totals();
        let expected = least_squares_slope(&cumulative[cumulative.len() - 6..]).unwrap();
        assert_relative_eq!(
            state.next_features().unwrap().ev_growth_slope,
            expected,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_pct_change_zero_denominators() {
        let history = series(&[0.0, 0.0, 25.0]);
        let features = Recurrence::seed(&history, 6)
            .unwrap()
            .next_features()
            .unwrap();
        assert_eq!(features.ev_total_pct_change_1, 0.0);
        assert_eq!(features.ev_total_pct_change_3, 0.0);

        let history = series(&[50.0, 0.0, 25.0]);
        let features = Recurrence::seed(&history, 6)
            .unwrap()
            .next_features()
            .unwrap();
        assert_eq!(features.ev_total_pct_change_1, 0.0);
        assert_relative_eq!(features.ev_total_pct_change_3, -0.5);
    }

    #[test]
    fn test_windows_stay_bounded() {
        let history = series(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let mut state = Recurrence::seed(&history, 6).unwrap();
        assert_eq!(state.recent_values().len(), 6);
        for i in 0..50 {
            state.advance(i as f64);
            assert!(state.recent_values().len() <= 6);
            assert!(state.recent_cumulative().len() <= 6);
        }
        assert_eq!(state.step(), 50);
    }

    #[test]
    fn test_advance_chains_raw_cumulative() {
        let history = series(&[1.0, 2.0, 3.0]);
        let mut state = Recurrence::seed(&history, 6).unwrap();
        assert_relative_eq!(state.advance(2.4), 8.4);
        assert_eq!(state.recent_values().to_vec(), vec![1.0, 2.0, 3.0, 2.4]);
        assert_relative_eq!(state.recent_cumulative().last().unwrap(), 8.4);
    }

    #[test]
    fn test_end_to_end_lag_plus_ten() {
        let values = [100.0, 110.0, 120.0, 130.0, 140.0, 150.0];
        let history = series(&values);
        let predictor = FnPredictor::new("lag1 + 10", |f: &FeatureVector| Ok(f.ev_total_lag1 + 10.0));

        let result = forecast(&history, &predictor, 3).unwrap();
        let total: f64 = values.iter().sum();

        assert_eq!(result.predictions(), vec![160.0, 170.0, 180.0]);
        assert_eq!(
            result.cumulative(),
            vec![total + 160.0, total + 330.0, total + 510.0]
        );
        assert_eq!(
            result.dates(),
            vec![ymd(2024, 7, 1), ymd(2024, 8, 1), ymd(2024, 9, 1)]
        );
        assert_eq!(result.historical_total(), total);
        assert_eq!(result.final_total(), total + 510.0);
    }

    #[test]
    fn test_dates_offset_from_last_observation() {
        let points = vec![
            TimeSeriesPoint::new(ymd(2023, 11, 30), 1.0),
            TimeSeriesPoint::new(ymd(2023, 12, 31), 2.0),
            TimeSeriesPoint::new(ymd(2024, 1, 31), 3.0),
        ];
        let history = CountySeries::new("King", 1, points, 2).unwrap();
        let flat = FnPredictor::new("flat", |_: &FeatureVector| Ok(1.0));

        let result = forecast(&history, &flat, 3).unwrap();
        assert_eq!(
            result.dates(),
            vec![ymd(2024, 2, 29), ymd(2024, 3, 31), ymd(2024, 4, 30)]
        );
    }

    #[test]
    fn test_three_point_history_runs() {
        let history = series(&[5.0, 10.0, 20.0]);
        let slopes = std::cell::RefCell::new(Vec::new());
        let predictor = FnPredictor::new("record", |f: &FeatureVector| {
            slopes.borrow_mut().push(f.ev_growth_slope);
            Ok(f.ev_total_lag1)
        });

        let result = forecast(&history, &predictor, 4).unwrap();
        assert_eq!(result.horizon(), 4);

        let slopes = slopes.into_inner();
        assert_eq!(&slopes[..3], &[0.0, 0.0, 0.0]);
        assert!(slopes[3] > 0.0);
    }

    #[test]
    fn test_tiny_history_zero_fills_lags() {
        let history = series(&[7.0]);
        let features = Recurrence::seed(&history, 6)
            .unwrap()
            .next_features()
            .unwrap();
        assert_eq!(features.ev_total_lag1, 7.0);
        assert_eq!(features.ev_total_lag2, 0.0);
        assert_eq!(features.ev_total_lag3, 0.0);
        assert_eq!(features.ev_total_pct_change_1, 0.0);
    }

    #[test]
    fn test_predictor_called_once_per_step() {
        let calls = Cell::new(0);
        let predictor = FnPredictor::new("count", |_: &FeatureVector| {
            calls.set(calls.get() + 1);
            Ok(1.0)
        });
        forecast(&series(&[1.0; 6]), &predictor, DEFAULT_HORIZON).unwrap();
        assert_eq!(calls.get(), DEFAULT_HORIZON);
    }

    #[test]
    fn test_predictor_failure_is_fatal() {
        let calls = Cell::new(0);
        let predictor = FnPredictor::new("flaky", |_: &FeatureVector| {
            calls.set(calls.get() + 1);
            if calls.get() == 2 {
                Err(ForecastError::PredictorError("model unavailable".to_string()))
            } else {
                Ok(1.0)
            }
        });
        let result = forecast(&series(&[1.0; 6]), &predictor, 5);
        assert!(matches!(result, Err(ForecastError::PredictorError(_))));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_non_finite_prediction_is_rejected() {
        let predictor = FnPredictor::new("nan", |_: &FeatureVector| Ok(f64::NAN));
        assert!(matches!(
            forecast(&series(&[1.0; 6]), &predictor, 3),
            Err(ForecastError::PredictorError(_))
        ));
    }

    #[test]
    fn test_rounding_ties_to_even() {
        let predictor = FnPredictor::new("half", |_: &FeatureVector| Ok(2.5));
        let result = forecast(&series(&[1.0; 6]), &predictor, 2).unwrap();
        assert_eq!(result.predictions(), vec![2.0, 2.0]);
        assert_eq!(result.raw_predictions(), vec![2.5, 2.5]);
        assert_eq!(result.final_total(), 10.0);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(ForecastEngine::new(0).is_err());
        assert!(ForecastEngine::with_window(12, 2).is_err());
        let empty = CountySeries::new("Empty", 0, Vec::new(), 0).unwrap();
        let predictor = FnPredictor::new("flat", |_: &FeatureVector| Ok(1.0));
        assert!(matches!(
            forecast(&empty, &predictor, 3),
            Err(ForecastError::DataError(_))
        ));
    }
}
