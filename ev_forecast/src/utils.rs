//! Utility functions for the ev_forecast crate

use crate::data::CountySeries;
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Date layouts accepted in the input table
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a calendar date from the formats found in exported tables
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let raw = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Ok(date);
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(datetime.date());
        }
    }

    Err(ForecastError::DataError(format!(
        "Unrecognised date '{}'",
        raw
    )))
}

/// Whole calendar months from `from` to `to` (negative if `to` is earlier)
pub fn months_between(from: NaiveDate, to: NaiveDate) -> i32 {
    (to.year() - from.year()) * 12 + to.month() as i32 - from.month() as i32
}

/// Label a horizon in months, e.g. "3-Year" for 36 or "8-Month" for 8
pub fn horizon_label(months: usize) -> String {
    if months > 0 && months % 12 == 0 {
        format!("{}-Year", months / 12)
    } else {
        format!("{}-Month", months)
    }
}

/// Generate a synthetic monthly EV count history.
///
/// Counts start at `base`, grow by `growth` per month and carry uniform
/// noise of +/- `noise`. Values are clamped at zero. The same `seed`
/// always produces the same history.
pub fn synthetic_history(months: usize, base: f64, growth: f64, noise: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let spread = noise.abs();

    (0..months)
        .map(|i| {
            let jitter = if spread > 0.0 {
                rng.gen_range(-spread..=spread)
            } else {
                0.0
            };
            (base + growth * i as f64 + jitter).max(0.0).round()
        })
        .collect()
}

/// Synthetic county series built from [`synthetic_history`]
pub fn synthetic_series(
    county: &str,
    county_code: i64,
    start: NaiveDate,
    months: usize,
    seed: u64,
) -> Result<CountySeries> {
    let values = synthetic_history(months, 20.0, 3.0, 5.0, seed);
    CountySeries::from_values(county, county_code, start, &values)
}
