use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use ev_forecast::ForecastConfig;
use std::path::PathBuf;
use tracing::debug;

pub mod commands;

use commands::{backtest, compare, counties, forecast};

#[derive(Parser)]
#[command(name = "ev_adoption")]
#[command(about = "Forecast cumulative EV adoption per county")]
#[command(version)]
pub struct Cli {
    /// JSON config file; flags below override its values
    #[arg(short, long, global = true, env = "EV_CONFIG_PATH")]
    pub config: Option<PathBuf>,

    /// Preprocessed EV table (CSV)
    #[arg(short, long, global = true, env = "EV_DATA_PATH")]
    pub data: Option<PathBuf>,

    /// Exported model coefficients (JSON)
    #[arg(short, long, global = true, env = "EV_MODEL_PATH")]
    pub model: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// File format for exported series
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the counties available in the data
    Counties,
    /// Forecast one county and print its growth summary
    Forecast {
        /// County name as it appears in the data
        #[arg(long)]
        county: String,

        /// Months to forecast
        #[arg(long)]
        horizon: Option<usize>,

        /// Write the combined history and forecast to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },
    /// Compare the forecast growth of several counties
    ///
    /// Example:
    ///   ev_adoption compare --county King --county Pierce --county Spokane
    Compare {
        /// County to include; repeat for each county
        #[arg(long = "county", required = true)]
        counties: Vec<String>,

        /// Months to forecast
        #[arg(long)]
        horizon: Option<usize>,

        /// Write the combined series of all counties to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
    },
    /// Forecast the last months of a county's history and report the error
    Backtest {
        #[arg(long)]
        county: String,

        /// Months held out from the end of the history
        #[arg(long, default_value_t = 12)]
        holdout: usize,
    },
}

impl Cli {
    /// Config file values with command-line overrides applied
    fn settings(&self, horizon: Option<usize>) -> Result<ForecastConfig> {
        let mut config = match &self.config {
            Some(path) => ForecastConfig::from_file(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => ForecastConfig::default(),
        };

        if let Some(data) = &self.data {
            config.data_path = Some(data.clone());
        }
        if let Some(model) = &self.model {
            config.model_path = Some(model.clone());
        }
        if let Some(horizon) = horizon {
            config.horizon = horizon;
        }

        config.validate()?;
        debug!(?config, "Resolved settings");
        Ok(config)
    }

    pub fn run(self) -> Result<()> {
        match &self.command {
            Commands::Counties => {
                let config = self.settings(None)?;
                counties(&config)?;
            }
            Commands::Forecast {
                county,
                horizon,
                output,
                format,
            } => {
                let config = self.settings(*horizon)?;
                forecast(&config, county, output.as_deref(), *format)?;
            }
            Commands::Compare {
                counties,
                horizon,
                output,
                format,
            } => {
                let config = self.settings(*horizon)?;
                compare(&config, counties, output.as_deref(), *format)?;
            }
            Commands::Backtest { county, holdout } => {
                let config = self.settings(None)?;
                backtest(&config, county, *holdout)?;
            }
        }
        Ok(())
    }
}
