//! Forecast configuration

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Months forecast by default (a 3-year outlook)
pub const DEFAULT_HORIZON: usize = 36;
/// Size of the lag and cumulative windows
pub const DEFAULT_WINDOW: usize = 6;
/// Counties allowed in one comparison
pub const DEFAULT_MAX_COMPARISON: usize = 3;

/// Settings for forecasting and comparison runs.
///
/// Every field has a default, so a config file only needs the keys it
/// wants to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Months to forecast
    pub horizon: usize,
    /// Size of the lag and cumulative windows
    pub window: usize,
    /// Maximum number of counties in a comparison
    pub max_comparison_counties: usize,
    /// Preprocessed EV table
    pub data_path: Option<PathBuf>,
    /// Exported model file
    pub model_path: Option<PathBuf>,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: DEFAULT_HORIZON,
            window: DEFAULT_WINDOW,
            max_comparison_counties: DEFAULT_MAX_COMPARISON,
            data_path: None,
            model_path: None,
        }
    }
}

impl ForecastConfig {
    /// Load a config from a JSON file and validate it
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Reading config from {}", path.display());
        let json = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the numeric settings are usable
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon must be positive".to_string(),
            ));
        }
        if self.window < 3 {
            return Err(ForecastError::InvalidParameter(format!(
                "window must be at least 3, got {}",
                self.window
            )));
        }
        if self.max_comparison_counties == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_comparison_counties must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ForecastConfig::default();
        assert_eq!(config.horizon, 36);
        assert_eq!(config.window, 6);
        assert_eq!(config.max_comparison_counties, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"horizon": 12, "data_path": "ev.csv"}}"#).unwrap();

        let config = ForecastConfig::from_file(file.path()).unwrap();
        assert_eq!(config.horizon, 12);
        assert_eq!(config.window, DEFAULT_WINDOW);
        assert_eq!(config.data_path, Some(PathBuf::from("ev.csv")));
        assert_eq!(config.model_path, None);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"horizon": 0}}"#).unwrap();
        assert!(matches!(
            ForecastConfig::from_file(file.path()),
            Err(ForecastError::InvalidParameter(_))
        ));

        let config = ForecastConfig {
            window: 2,
            ..ForecastConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
