//! Predictors consumed by the forecast engine
//!
//! The engine only needs one capability from a model: turn a
//! [`FeatureVector`] into a single prediction. Anything implementing
//! [`Predictor`] can be plugged in without touching the recurrence.

use crate::error::Result;
use crate::features::FeatureVector;

/// A fitted regression model evaluated one feature vector at a time
pub trait Predictor {
    /// Predict the EV count for the month described by `features`
    fn predict(&self, features: &FeatureVector) -> Result<f64>;

    /// Name of the model
    fn name(&self) -> &str {
        "predictor"
    }
}

impl<P: Predictor + ?Sized> Predictor for &P {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        (**self).predict(features)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<P: Predictor + ?Sized> Predictor for Box<P> {
    fn predict(&self, features: &FeatureVector) -> Result<f64> {
        (**self).predict(features)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

pub mod closure;
pub mod linear;

pub use closure::FnPredictor;
pub use linear::LinearPredictor;
