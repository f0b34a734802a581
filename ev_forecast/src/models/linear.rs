//! Linear regression predictor loaded from exported coefficients

use crate::error::{ForecastError, Result};
use crate::features::{FeatureVector, FEATURE_COUNT, FEATURE_NAMES};
use crate::models::Predictor;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// On-disk layout of an exported linear model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModelFile {
    /// Optional display name
    #[serde(default)]
    pub name: Option<String>,
    /// Intercept term
    pub intercept: f64,
    /// One coefficient per feature, keyed by schema name
    pub coefficients: BTreeMap<String, f64>,
}

/// `intercept + sum(coefficient * feature)` over the feature schema
#[derive(Debug, Clone, PartialEq)]
pub struct LinearPredictor {
    name: String,
    intercept: f64,
    weights: [f64; FEATURE_COUNT],
}

impl LinearPredictor {
    /// Create a predictor from weights given in schema order
    pub fn new(intercept: f64, weights: [f64; FEATURE_COUNT]) -> Self {
        Self {
            name: "Linear regression".to_string(),
            intercept,
            weights,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Build a predictor from a model file, requiring exactly the schema features
    pub fn from_model_file(model: LinearModelFile) -> Result<Self> {
        if let Some(unknown) = model
            .coefficients
            .keys()
            .find(|k| !FEATURE_NAMES.contains(&k.as_str()))
        {
            return Err(ForecastError::InvalidParameter(format!(
                "Model file has coefficient for unknown feature '{}'",
                unknown
            )));
        }

        let mut weights = [0.0; FEATURE_COUNT];
        for (i, name) in FEATURE_NAMES.iter().enumerate() {
            weights[i] = *model.coefficients.get(*name).ok_or_else(|| {
                ForecastError::InvalidParameter(format!(
                    "Model file is missing coefficient for '{}'",
                    name
                ))
            })?;
        }

        let predictor = Self::new(model.intercept, weights);
        Ok(match model.name {
            Some(name) => predictor.with_name(name),
            None => predictor,
        })
    }

    /// Parse a model from its JSON representation
    pub fn from_json_str(json: &str) -> Result<Self> {
        let model: LinearModelFile = serde_json::from_str(json)?;
        Self::from_model_file(model)
    }

    /// Load a model from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Export the model in its file layout
    pub fn to_model_file(&self) -> LinearModelFile {
        LinearModelFile {
            name: Some(self.name.clone()),
            intercept: self.intercept,
            coefficients: FEATURE_NAMES
                .iter()
                .zip(self.weights.iter())
                .map(|(name, weight)| (name.to_string(), *weight))
                .collect(),
        }
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Coefficients in schema order
    pub fn weights(&self) -> &[f64; FEATURE_COUNT] {
        &self.weights
    }
}

impl Predictor for LinearPredictor {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let prediction = features
            .to_array()
            .iter()
            .zip(self.weights.iter())
            .fold(self.intercept, |acc, (x, w)| acc + x * w);
        Ok(prediction)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn features() -> FeatureVector {
        FeatureVector {
            months_since_start: 10,
            county_encoded: 2,
            ev_total_lag1: 30.0,
            ev_total_lag2: 20.0,
            ev_total_lag3: 10.0,
            ev_total_roll_mean_3: 20.0,
            ev_total_pct_change_1: 0.5,
            ev_total_pct_change_3: 2.0,
            ev_growth_slope: 4.0,
        }
    }

    #[test]
    fn test_predict_is_dot_product() {
        let mut weights = [0.0; FEATURE_COUNT];
        weights[2] = 1.0; // lag1
        weights[8] = 0.5; // slope
        let model = LinearPredictor::new(5.0, weights);
        assert_eq!(model.predict(&features()).unwrap(), 5.0 + 30.0 + 2.0);
    }

    #[test]
    fn test_json_round_trip_preserves_weights() {
        let json = r#"{
            "name": "ridge-v1",
            "intercept": 1.5,
            "coefficients": {
                "months_since_start": 0.1,
                "county_encoded": 0.0,
                "ev_total_lag1": 0.9,
                "ev_total_lag2": 0.05,
                "ev_total_lag3": 0.02,
                "ev_total_roll_mean_3": 0.01,
                "ev_total_pct_change_1": 3.0,
                "ev_total_pct_change_3": 1.0,
                "ev_growth_slope": 0.2
            }
        }"#;
        let model = LinearPredictor::from_json_str(json).unwrap();
        assert_eq!(model.name(), "ridge-v1");
        assert_eq!(model.intercept(), 1.5);
        assert_eq!(model.weights()[2], 0.9);

        let exported = model.to_model_file();
        let reloaded = LinearPredictor::from_model_file(exported).unwrap();
        assert_eq!(reloaded, model);
    }

    #[test]
    fn test_rejects_incomplete_or_unknown_features() {
        let missing = r#"{"intercept": 0.0, "coefficients": {"ev_total_lag1": 1.0}}"#;
        assert!(matches!(
            LinearPredictor::from_json_str(missing),
            Err(ForecastError::InvalidParameter(_))
        ));

        let mut coefficients: BTreeMap<String, f64> =
            FEATURE_NAMES.iter().map(|n| (n.to_string(), 0.0)).collect();
        coefficients.insert("population".to_string(), 1.0);
        let unknown = LinearModelFile {
            name: None,
            intercept: 0.0,
            coefficients,
        };
        assert!(LinearPredictor::from_model_file(unknown).is_err());
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            LinearPredictor::from_json_str("not json"),
            Err(ForecastError::JsonError(_))
        ));
    }
}
