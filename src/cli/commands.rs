pub mod backtest;
pub mod compare;
pub mod counties;
pub mod forecast;

pub use backtest::backtest;
pub use compare::compare;
pub use counties::counties;
pub use forecast::forecast;

use anyhow::{anyhow, Context, Result};
use ev_forecast::{EvDataset, ForecastConfig, LinearPredictor};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use super::ExportFormat;

/// Load the EV table named by the settings
pub(crate) fn load_dataset(config: &ForecastConfig) -> Result<EvDataset> {
    let path = config
        .data_path
        .as_deref()
        .ok_or_else(|| anyhow!("No data file given; pass --data or set EV_DATA_PATH"))?;
    debug!("Loading EV data from {}", path.display());
    EvDataset::from_csv(path).with_context(|| format!("Failed to load data {}", path.display()))
}

/// Load the exported model named by the settings
pub(crate) fn load_model(config: &ForecastConfig) -> Result<LinearPredictor> {
    let path = config
        .model_path
        .as_deref()
        .ok_or_else(|| anyhow!("No model file given; pass --model or set EV_MODEL_PATH"))?;
    debug!("Loading model from {}", path.display());
    LinearPredictor::from_file(path)
        .with_context(|| format!("Failed to load model {}", path.display()))
}

/// Write an export with either the CSV or JSON writer
pub(crate) fn export<C, J>(path: &Path, format: ExportFormat, csv: C, json: J) -> Result<()>
where
    C: FnOnce(&mut File) -> ev_forecast::error::Result<()>,
    J: FnOnce() -> ev_forecast::error::Result<String>,
{
    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    match format {
        ExportFormat::Csv => csv(&mut file)?,
        ExportFormat::Json => {
            let body = json()?;
            file.write_all(body.as_bytes())?;
        }
    }
    info!("Wrote {:?} export to {}", format, path.display());
    Ok(())
}
