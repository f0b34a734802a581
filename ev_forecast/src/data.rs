//! County time series data handling

use crate::error::{ForecastError, Result};
use crate::utils::{months_between, parse_date};
use chrono::{Months, NaiveDate};
use ev_math::cumulative_sum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// One monthly observation for a county
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    /// Month of the observation
    pub date: NaiveDate,
    /// EV count for the month
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Monthly EV history of a single county, ordered by date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountySeries {
    /// County name
    county: String,
    /// Categorical encoding of the county used by the model
    county_code: i64,
    /// Observations, strictly increasing by date
    points: Vec<TimeSeriesPoint>,
    /// "Months since start" counter of the latest observation
    months_since_start: i64,
}

impl CountySeries {
    /// Create a series, rejecting points that are not strictly increasing by date
    pub fn new(
        county: impl Into<String>,
        county_code: i64,
        points: Vec<TimeSeriesPoint>,
        months_since_start: i64,
    ) -> Result<Self> {
        let county = county.into();
        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ForecastError::DataError(format!(
                "Dates for county '{}' are not strictly increasing ({} then {})",
                county, pair[0].date, pair[1].date
            )));
        }

        Ok(Self {
            county,
            county_code,
            points,
            months_since_start,
        })
    }

    /// Create a gap-free monthly series starting at `start`.
    ///
    /// The months-since-start counter is anchored at 0 on the first value.
    pub fn from_values(
        county: impl Into<String>,
        county_code: i64,
        start: NaiveDate,
        values: &[f64],
    ) -> Result<Self> {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                start
                    .checked_add_months(Months::new(i as u32))
                    .map(|date| TimeSeriesPoint::new(date, value))
                    .ok_or_else(|| {
                        ForecastError::DataError(format!("Date overflow at month {}", i))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        let months_since_start = values.len().saturating_sub(1) as i64;
        Self::new(county, county_code, points, months_since_start)
    }

    pub fn county(&self) -> &str {
        &self.county
    }

    pub fn county_code(&self) -> i64 {
        self.county_code
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    /// Counter value of the latest observation
    pub fn months_since_start(&self) -> i64 {
        self.months_since_start
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Monthly EV counts, oldest first
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Running cumulative totals over the full history
    pub fn cumulative_totals(&self) -> Vec<f64> {
        cumulative_sum(&self.values())
    }

    /// Sum of every observation in the history
    pub fn historical_total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// Months missing between consecutive observations
    pub fn missing_months(&self) -> Vec<NaiveDate> {
        let mut missing = Vec::new();
        for pair in self.points.windows(2) {
            let gap = months_between(pair[0].date, pair[1].date);
            for k in 1..gap {
                if let Some(date) = pair[0].date.checked_add_months(Months::new(k as u32)) {
                    missing.push(date);
                }
            }
        }
        missing
    }

    /// Keep only the first `len` observations
    pub fn truncate(&self, len: usize) -> Result<Self> {
        if len == 0 || len > self.points.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "Cannot truncate series of {} points to {}",
                self.points.len(),
                len
            )));
        }

        let dropped = (self.points.len() - len) as i64;
        Ok(Self {
            county: self.county.clone(),
            county_code: self.county_code,
            points: self.points[..len].to_vec(),
            months_since_start: self.months_since_start - dropped,
        })
    }
}

/// Raw row of the preprocessed EV table
#[derive(Debug, Deserialize)]
struct EvRecord {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "County")]
    county: Option<String>,
    county_encoded: f64,
    #[serde(rename = "Electric Vehicle (EV) Total")]
    ev_total: f64,
    months_since_start: f64,
}

/// Loaded EV table, grouped per county
#[derive(Debug, Clone, Default)]
pub struct EvDataset {
    counties: BTreeMap<String, CountySeries>,
    /// Counties whose rows could not form a series, with the reason
    rejected: BTreeMap<String, String>,
}

impl EvDataset {
    /// Load the dataset from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading EV data from {}", path.display());
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Load the dataset from any CSV reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut grouped: BTreeMap<String, Vec<(NaiveDate, f64, i64, i64)>> = BTreeMap::new();
        let mut rows = 0usize;
        for record in csv_reader.deserialize() {
            let record: EvRecord = record?;
            let county = match record.county {
                Some(county) if !county.is_empty() => county,
                _ => continue,
            };
            let date = parse_date(&record.date)?;
            grouped.entry(county).or_default().push((
                date,
                record.ev_total,
                record.county_encoded.round() as i64,
                record.months_since_start.round() as i64,
            ));
            rows += 1;
        }

        let mut counties = BTreeMap::new();
        let mut rejected = BTreeMap::new();
        for (county, mut entries) in grouped {
            entries.sort_by_key(|(date, ..)| *date);
            let county_code = entries[0].2;
            let months_since_start = entries.iter().map(|e| e.3).max().unwrap_or(0);
            let points = entries
                .iter()
                .map(|(date, value, ..)| TimeSeriesPoint::new(*date, *value))
                .collect();

            let series =
                match CountySeries::new(county.clone(), county_code, points, months_since_start) {
                    Ok(series) => series,
                    Err(err) => {
                        warn!(county = %county, "Skipping county: {}", err);
                        rejected.insert(county, err.to_string());
                        continue;
                    }
                };
            let missing = series.missing_months();
            if !missing.is_empty() {
                warn!(
                    county = %county,
                    missing = missing.len(),
                    "County history has gaps; lag features will span them"
                );
            }
            counties.insert(county, series);
        }

        info!(
            "Loaded {} rows for {} counties ({} skipped)",
            rows,
            counties.len(),
            rejected.len()
        );
        Ok(Self { counties, rejected })
    }

    /// Build a dataset from already constructed series
    pub fn from_series(series: impl IntoIterator<Item = CountySeries>) -> Self {
        Self {
            counties: series
                .into_iter()
                .map(|s| (s.county().to_string(), s))
                .collect(),
            rejected: BTreeMap::new(),
        }
    }

    /// County names in alphabetical order
    pub fn county_names(&self) -> Vec<&str> {
        self.counties.keys().map(String::as_str).collect()
    }

    /// Counties present in the table whose rows were rejected, alphabetically
    pub fn rejected_names(&self) -> Vec<&str> {
        self.rejected.keys().map(String::as_str).collect()
    }

    /// History of a single county.
    ///
    /// A county skipped at load time reports why it was skipped.
    pub fn county(&self, name: &str) -> Result<&CountySeries> {
        if let Some(reason) = self.rejected.get(name) {
            return Err(ForecastError::DataError(reason.clone()));
        }
        self.counties
            .get(name)
            .ok_or_else(|| ForecastError::DataError(format!("Unknown county '{}'", name)))
    }

    pub fn len(&self) -> usize {
        self.counties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CountySeries> {
        self.counties.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_rejects_unordered_dates() {
        let points = vec![
            TimeSeriesPoint::new(date(2023, 2, 28), 1.0),
            TimeSeriesPoint::new(date(2023, 1, 31), 2.0),
        ];
        assert!(CountySeries::new("King", 1, points, 1).is_err());

        let duplicated = vec![
            TimeSeriesPoint::new(date(2023, 1, 31), 1.0),
            TimeSeriesPoint::new(date(2023, 1, 31), 2.0),
        ];
        assert!(CountySeries::new("King", 1, duplicated, 1).is_err());
    }

    #[test]
    fn test_from_values_builds_monthly_dates() {
        let series =
            CountySeries::from_values("King", 7, date(2023, 1, 31), &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(
            series.dates(),
            vec![date(2023, 1, 31), date(2023, 2, 28), date(2023, 3, 31)]
        );
        assert_eq!(series.months_since_start(), 2);
        assert_eq!(series.county_code(), 7);
        assert_eq!(series.historical_total(), 6.0);
        assert_eq!(series.cumulative_totals(), vec![1.0, 3.0, 6.0]);
        assert!(series.missing_months().is_empty());
    }

    #[test]
    fn test_missing_months() {
        let points = vec![
            TimeSeriesPoint::new(date(2023, 1, 1), 1.0),
            TimeSeriesPoint::new(date(2023, 4, 1), 2.0),
        ];
        let series = CountySeries::new("Pierce", 2, points, 3).unwrap();
        assert_eq!(series.missing_months(), vec![date(2023, 2, 1), date(2023, 3, 1)]);
    }

    #[test]
    fn test_truncate_adjusts_counter() {
        let series =
            CountySeries::from_values("King", 1, date(2023, 1, 1), &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let head = series.truncate(2).unwrap();
        assert_eq!(head.len(), 2);
        assert_eq!(head.months_since_start(), 1);
        assert!(series.truncate(0).is_err());
        assert!(series.truncate(5).is_err());
    }

    #[test]
    fn test_dataset_from_reader_groups_and_sorts() {
        let csv = "\
Date,County,State,Electric Vehicle (EV) Total,county_encoded,months_since_start
2023-02-28,King,WA,12,5,1
2023-01-31,King,WA,10,5,0
2023-01-31,Adams,WA,1,0,0
2023-01-31,,WA,99,9,0
";
        let dataset = EvDataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.county_names(), vec!["Adams", "King"]);

        let king = dataset.county("King").unwrap();
        assert_eq!(king.values(), vec![10.0, 12.0]);
        assert_eq!(king.county_code(), 5);
        assert_eq!(king.months_since_start(), 1);
        assert!(dataset.county("Spokane").is_err());
    }
}
