//! County outlooks, growth summaries and tabular export
//!
//! An outlook joins a county's historical cumulative series with its
//! forecast so the two can be charted or exported as one table. Comparisons
//! run the same forecast over several counties and summarise their growth.

use crate::data::{CountySeries, EvDataset};
use crate::engine::{ForecastEngine, ForecastResult};
use crate::error::{ForecastError, Result};
use crate::models::Predictor;
use crate::utils::horizon_label;
use chrono::NaiveDate;
use polars::prelude::{CsvWriter, DataFrame, NamedFrom, SerWriter, Series};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::io::Write;
use tracing::info;

/// Origin of a cumulative value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Historical,
    Forecast,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Historical => write!(f, "Historical"),
            Source::Forecast => write!(f, "Forecast"),
        }
    }
}

/// Cumulative EV total at a month
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub cumulative: f64,
    pub source: Source,
}

/// Percentage growth from `historical` to `forecasted`.
///
/// `None` when there is no positive historical total to compare against.
pub fn growth_percent(historical: f64, forecasted: f64) -> Option<f64> {
    if historical > 0.0 {
        Some((forecasted - historical) / historical * 100.0)
    } else {
        None
    }
}

/// Historical and forecast cumulative series of one county
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountyOutlook {
    county: String,
    history: Vec<CumulativePoint>,
    forecast: ForecastResult,
    historical_total: f64,
    forecasted_total: f64,
    growth_pct: Option<f64>,
}

impl CountyOutlook {
    /// Join a county's history with a forecast produced for it
    pub fn build(series: &CountySeries, forecast: ForecastResult) -> Self {
        let history: Vec<CumulativePoint> = series
            .dates()
            .into_iter()
            .zip(series.cumulative_totals())
            .map(|(date, cumulative)| CumulativePoint {
                date,
                cumulative,
                source: Source::Historical,
            })
            .collect();

        let historical_total = history.last().map(|p| p.cumulative).unwrap_or(0.0);
        let forecasted_total = forecast.final_total();

        Self {
            county: series.county().to_string(),
            history,
            growth_pct: growth_percent(historical_total, forecasted_total),
            forecast,
            historical_total,
            forecasted_total,
        }
    }

    /// Forecast a county and build its outlook
    pub fn forecast_county<P>(
        series: &CountySeries,
        predictor: &P,
        engine: &ForecastEngine,
    ) -> Result<Self>
    where
        P: Predictor + ?Sized,
    {
        let forecast = engine.forecast(series, predictor)?;
        Ok(Self::build(series, forecast))
    }

    pub fn county(&self) -> &str {
        &self.county
    }

    pub fn history(&self) -> &[CumulativePoint] {
        &self.history
    }

    pub fn forecast(&self) -> &ForecastResult {
        &self.forecast
    }

    pub fn historical_total(&self) -> f64 {
        self.historical_total
    }

    pub fn forecasted_total(&self) -> f64 {
        self.forecasted_total
    }

    /// Growth over the horizon in percent, if the county has history
    pub fn growth_pct(&self) -> Option<f64> {
        self.growth_pct
    }

    /// History followed by forecast, in date order
    pub fn combined(&self) -> Vec<CumulativePoint> {
        let forecast = self.forecast.points().iter().map(|p| CumulativePoint {
            date: p.date,
            cumulative: p.cumulative,
            source: Source::Forecast,
        });
        self.history.iter().copied().chain(forecast).collect()
    }

    /// Combined series as a data frame
    pub fn to_frame(&self) -> Result<DataFrame> {
        outlook_frame(std::slice::from_ref(self))
    }
}

impl fmt::Display for CountyOutlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.growth_pct {
            Some(growth) => write!(
                f,
                "EV adoption in {} is expected to increase by {:.2}% over the next {}.",
                self.county,
                growth,
                horizon_phrase(self.forecast.horizon())
            ),
            None => write!(
                f,
                "No historical data available to compute percentage change for {}.",
                self.county
            ),
        }
    }
}

fn horizon_phrase(months: usize) -> String {
    match months {
        12 => "year".to_string(),
        m if m % 12 == 0 => format!("{} years", m / 12),
        1 => "month".to_string(),
        m => format!("{} months", m),
    }
}

/// Outlooks for several counties forecast with the same model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    horizon: usize,
    outlooks: Vec<CountyOutlook>,
}

impl ComparisonReport {
    /// Forecast each named county, allowing at most `max_counties` of them
    pub fn build<S, P>(
        dataset: &EvDataset,
        counties: &[S],
        predictor: &P,
        engine: &ForecastEngine,
        max_counties: usize,
    ) -> Result<Self>
    where
        S: AsRef<str>,
        P: Predictor + ?Sized,
    {
        if counties.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Select at least one county to compare".to_string(),
            ));
        }
        if counties.len() > max_counties {
            return Err(ForecastError::InvalidParameter(format!(
                "Select up to {} counties, got {}",
                max_counties,
                counties.len()
            )));
        }

        let mut seen = HashSet::new();
        let mut outlooks = Vec::with_capacity(counties.len());
        for name in counties {
            let name = name.as_ref();
            if !seen.insert(name) {
                return Err(ForecastError::InvalidParameter(format!(
                    "County '{}' selected more than once",
                    name
                )));
            }
            let series = dataset.county(name)?;
            outlooks.push(CountyOutlook::forecast_county(series, predictor, engine)?);
        }

        info!(counties = outlooks.len(), "Comparison complete");
        Ok(Self {
            horizon: engine.horizon(),
            outlooks,
        })
    }

    pub fn outlooks(&self) -> &[CountyOutlook] {
        &self.outlooks
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// `"County: 12.34% | Other: N/A"` growth line
    pub fn summary_line(&self) -> String {
        self.outlooks
            .iter()
            .map(|o| match o.growth_pct {
                Some(growth) => format!("{}: {:.2}%", o.county, growth),
                None => format!("{}: N/A", o.county),
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }

    pub fn to_frame(&self) -> Result<DataFrame> {
        outlook_frame(&self.outlooks)
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        write_csv(&self.outlooks, writer)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ComparisonReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Growth Forecast: {}",
            horizon_label(self.horizon),
            self.summary_line()
        )
    }
}

/// Combined history and forecast rows of every outlook.
///
/// Columns: `Date`, `County`, `Source`, `Cumulative EV`.
pub fn outlook_frame(outlooks: &[CountyOutlook]) -> Result<DataFrame> {
    let mut dates = Vec::new();
    let mut counties = Vec::new();
    let mut sources = Vec::new();
    let mut cumulative = Vec::new();

    for outlook in outlooks {
        for point in outlook.combined() {
            dates.push(point.date.format("%Y-%m-%d").to_string());
            counties.push(outlook.county.clone());
            sources.push(point.source.to_string());
            cumulative.push(point.cumulative);
        }
    }

    let df = DataFrame::new(vec![
        Series::new("Date", dates),
        Series::new("County", counties),
        Series::new("Source", sources),
        Series::new("Cumulative EV", cumulative),
    ])?;
    Ok(df)
}

/// Write the combined rows of every outlook as CSV
pub fn write_csv<W: Write>(outlooks: &[CountyOutlook], mut writer: W) -> Result<()> {
    let mut df = outlook_frame(outlooks)?;
    CsvWriter::new(&mut writer).has_header(true).finish(&mut df)?;
    Ok(())
}
