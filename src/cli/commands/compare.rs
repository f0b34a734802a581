use anyhow::{Context, Result};
use ev_forecast::{ComparisonReport, ForecastConfig, ForecastEngine};
use std::path::Path;
use tracing::info;

use super::{export, load_dataset, load_model};
use crate::cli::ExportFormat;

pub fn compare(
    config: &ForecastConfig,
    counties: &[String],
    output: Option<&Path>,
    format: ExportFormat,
) -> Result<()> {
    let dataset = load_dataset(config)?;
    let model = load_model(config)?;
    let engine = ForecastEngine::from_config(config)?;

    info!("Comparing {} counties", counties.len());
    let report = ComparisonReport::build(
        &dataset,
        counties,
        &model,
        &engine,
        config.max_comparison_counties,
    )
    .context("Comparison failed")?;

    println!("{}", report);
    for outlook in report.outlooks() {
        println!("{}", outlook);
    }

    if let Some(path) = output {
        export(path, format, |file| report.write_csv(file), || report.to_json())?;
    }
    Ok(())
}
