//! Small statistics helpers used to build forecast features

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Relative change from `base` to `current`.
///
/// A zero `base` yields `0.0`, so "no change" and "undefined" are reported
/// the same way.
pub fn pct_change(current: f64, base: f64) -> f64 {
    if base == 0.0 {
        0.0
    } else {
        (current - base) / base
    }
}

/// Running totals of `values`
pub fn cumulative_sum(values: &[f64]) -> Vec<f64> {
    values
        .iter()
        .scan(0.0, |total, &v| {
            *total += v;
            Some(*total)
        })
        .collect()
}
