use anyhow::{Context, Result};
use ev_forecast::metrics;
use ev_forecast::ForecastConfig;

use super::{load_dataset, load_model};

pub fn backtest(config: &ForecastConfig, county: &str, holdout: usize) -> Result<()> {
    let dataset = load_dataset(config)?;
    let model = load_model(config)?;
    let series = dataset.county(county)?;

    let report = metrics::backtest(series, &model, holdout, config.window)
        .with_context(|| format!("Backtest failed for county '{}'", county))?;
    println!("{}", report);
    Ok(())
}
