//! Ordinary least-squares trend fitting
//!
//! Fits `y = slope * x + intercept` where `x` is the position index
//! `0..n` of each value, which is how the growth slope feature is defined.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Slope and intercept of a least-squares line over index positions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    /// Fit a line through `values` against the indices `0..values.len()`
    pub fn fit(values: &[f64]) -> Result<Self> {
        if values.len() < 2 {
            return Err(MathError::InsufficientData(
                "Need at least 2 points for a linear fit".to_string(),
            ));
        }

        let n = values.len() as f64;
        let x_mean = (values.len() - 1) as f64 / 2.0;
        let y_mean = values.iter().sum::<f64>() / n;

        let mut numerator = 0.0;
        let mut denominator = 0.0;

        for (i, &y) in values.iter().enumerate() {
            let dx = i as f64 - x_mean;
            numerator += dx * (y - y_mean);
            denominator += dx * dx;
        }

        if denominator.abs() < 1e-10 {
            return Err(MathError::CalculationError(
                "Cannot calculate slope: x values are too similar".to_string(),
            ));
        }

        let slope = numerator / denominator;
        Ok(Self {
            slope,
            intercept: y_mean - slope * x_mean,
        })
    }
}

/// Least-squares slope of `values` against their index positions
pub fn least_squares_slope(values: &[f64]) -> Result<f64> {
    LinearFit::fit(values).map(|fit| fit.slope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_line() {
        let fit = LinearFit::fit(&[10.0, 20.0, 30.0]).unwrap();
        assert_relative_eq!(fit.slope, 10.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_six_point_slope() {
        // cumulative totals of [100, 110, 120, 130, 140, 150]
        let cumulative = [100.0, 210.0, 330.0, 460.0, 600.0, 750.0];
        let slope = least_squares_slope(&cumulative).unwrap();
        // sum((x - 2.5) * (y - mean)) / 17.5
        assert_relative_eq!(slope, 2275.0 / 17.5, epsilon = 1e-9);
    }

    #[test]
    fn test_slope_ignores_constant_offset() {
        let base = [5.0, 9.0, 4.0, 12.0, 15.0, 11.0];
        let shifted: Vec<f64> = base.iter().map(|v| v + 1_000.0).collect();
        assert_relative_eq!(
            least_squares_slope(&base).unwrap(),
            least_squares_slope(&shifted).unwrap(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_insufficient_points() {
        assert!(matches!(
            least_squares_slope(&[1.0]),
            Err(MathError::InsufficientData(_))
        ));
        assert!(least_squares_slope(&[]).is_err());
    }
}
