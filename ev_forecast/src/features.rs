//! Feature schema shared between the forecast recurrence and predictors

use serde::{Deserialize, Serialize};

/// Number of features in the predictor schema
pub const FEATURE_COUNT: usize = 9;

/// Feature names in schema order
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "months_since_start",
    "county_encoded",
    "ev_total_lag1",
    "ev_total_lag2",
    "ev_total_lag3",
    "ev_total_roll_mean_3",
    "ev_total_pct_change_1",
    "ev_total_pct_change_3",
    "ev_growth_slope",
];

/// Inputs for one prediction step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Elapsed-months counter for the predicted month
    pub months_since_start: i64,
    /// Categorical county encoding
    pub county_encoded: i64,
    /// Value one period back (newest)
    pub ev_total_lag1: f64,
    /// Value two periods back
    pub ev_total_lag2: f64,
    /// Value three periods back
    pub ev_total_lag3: f64,
    /// Mean of the three lags
    pub ev_total_roll_mean_3: f64,
    /// Relative change of lag1 over lag2, 0 when lag2 is 0
    pub ev_total_pct_change_1: f64,
    /// Relative change of lag1 over lag3, 0 when lag3 is 0
    pub ev_total_pct_change_3: f64,
    /// Least-squares slope of the recent cumulative totals
    pub ev_growth_slope: f64,
}

impl FeatureVector {
    /// Values in [`FEATURE_NAMES`] order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.months_since_start as f64,
            self.county_encoded as f64,
            self.ev_total_lag1,
            self.ev_total_lag2,
            self.ev_total_lag3,
            self.ev_total_roll_mean_3,
            self.ev_total_pct_change_1,
            self.ev_total_pct_change_3,
            self.ev_growth_slope,
        ]
    }

    /// Look up a feature by schema name
    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .map(|i| self.to_array()[i])
    }
}
