//! Validation of a price series and derivation of the headline metrics.

use crate::domain::{MetricSummary, PriceSeries, ValidationResult};

/// Classify `series` and, when it holds two usable closes, compute the
/// day-over-day change between them.
pub fn derive(series: &PriceSeries) -> ValidationResult {
    let valid: Vec<_> = series
        .rows()
        .iter()
        .filter_map(|r| r.close.map(|c| (r.date, c)))
        .collect();

    let [earlier @ .., (latest_date, latest)] = valid.as_slice() else {
        return ValidationResult::Insufficient { valid_closes: 0 };
    };
    let (latest_date, latest) = (*latest_date, *latest);
    if earlier.is_empty() {
        return ValidationResult::Insufficient {
            valid_closes: valid.len(),
        };
    }

    if !latest.is_finite() {
        return ValidationResult::NonNumeric(latest);
    }

    // Non-finite closes between the two are skipped, not compared against.
    let Some(&(previous_date, previous)) = earlier.iter().rev().find(|(_, c)| c.is_finite()) else {
        let (_, bad) = earlier[earlier.len() - 1];
        return ValidationResult::NonNumeric(bad);
    };
    if previous == 0.0 {
        return ValidationResult::DivisionByZero { latest };
    }

    let absolute_change = latest - previous;
    let percent_change = (absolute_change / previous) * 100.0;

    // A non-empty `valid` implies a non-empty series.
    let period_start = series.first_date().unwrap_or(previous_date);
    let period_end = series.last_date().unwrap_or(latest_date);

    ValidationResult::Ok(MetricSummary {
        latest_close: latest,
        previous_close: previous,
        absolute_change,
        percent_change,
        latest_date,
        previous_date,
        period_start,
        period_end,
    })
}
