use anyhow::Result;
use ev_forecast::ForecastConfig;
use tracing::{info, warn};

use super::load_dataset;

pub fn counties(config: &ForecastConfig) -> Result<()> {
    let dataset = load_dataset(config)?;
    info!("{} counties available", dataset.len());

    for series in dataset.iter() {
        let span = match (series.first_date(), series.last_date()) {
            (Some(first), Some(last)) => format!("{} to {}", first, last),
            _ => "no observations".to_string(),
        };
        println!(
            "{:<24} {:>4} months  {}",
            series.county(),
            series.len(),
            span
        );
    }

    for name in dataset.rejected_names() {
        if let Err(err) = dataset.county(name) {
            warn!("{} skipped: {}", name, err);
        }
    }
    Ok(())
}
