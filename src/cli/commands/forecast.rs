use anyhow::{Context, Result};
use ev_forecast::report::{write_csv, CountyOutlook};
use ev_forecast::{ForecastConfig, ForecastEngine};
use std::path::Path;
use std::slice;
use tracing::{debug, info};

use super::{export, load_dataset, load_model};
use crate::cli::ExportFormat;

pub fn forecast(
    config: &ForecastConfig,
    county: &str,
    output: Option<&Path>,
    format: ExportFormat,
) -> Result<()> {
    let dataset = load_dataset(config)?;
    let model = load_model(config)?;
    let engine = ForecastEngine::from_config(config)?;

    let series = dataset.county(county)?;
    debug!(
        county,
        months = series.len(),
        horizon = engine.horizon(),
        "Forecasting county"
    );
    let outlook = CountyOutlook::forecast_county(series, &model, &engine)
        .with_context(|| format!("Forecast failed for county '{}'", county))?;

    info!(
        county,
        final_total = outlook.forecasted_total(),
        "Forecast complete"
    );
    println!("{}", outlook);

    if let Some(path) = output {
        export(
            path,
            format,
            |file| write_csv(slice::from_ref(&outlook), file),
            || Ok(serde_json::to_string_pretty(&outlook)?),
        )?;
    }
    Ok(())
}
