//! Closure-backed predictor

use crate::error::Result;
use crate::features::FeatureVector;
use crate::models::Predictor;
use std::fmt;

/// Predictor that delegates to a function or closure
#[derive(Clone)]
pub struct FnPredictor<F> {
    name: String,
    func: F,
}

impl<F> FnPredictor<F>
where
    F: Fn(&FeatureVector) -> Result<f64>,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Predictor for FnPredictor<F>
where
    F: Fn(&FeatureVector) -> Result<f64>,
{
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        (self.func)(features)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl<F> fmt::Debug for FnPredictor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnPredictor")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
