//! Long-form to wide-form pivot.
//!
//! The hover-rule tooltip needs every series' value for one date at the
//! same time, so the renderer's pivot transform widens the data back to
//! one column per series. The same pivot is exposed here as a pure
//! function over rows: the builder uses [`pivot_columns`] to enumerate
//! tooltip entries, and tests can verify the pivoted shape without a
//! renderer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use super::spec::SeriesRow;

/// Pivot long-form rows into a per-date mapping of series name to value.
///
/// For k distinct series and n distinct dates the result has exactly n
/// entries; a date's inner map holds one entry per series observed at
/// that date (up to k). The last row wins on duplicate (date, series)
/// pairs.
pub fn pivot_series(rows: &[SeriesRow]) -> BTreeMap<DateTime<Utc>, BTreeMap<String, f64>> {
    let mut pivoted: BTreeMap<DateTime<Utc>, BTreeMap<String, f64>> = BTreeMap::new();
    for row in rows {
        pivoted.entry(row.at).or_default().insert(row.series.clone(), row.value);
    }
    pivoted
}

/// Distinct series names, sorted. These become the value columns of the
/// pivoted table and the per-series tooltip entries, in a stable order.
pub fn pivot_columns(rows: &[SeriesRow]) -> Vec<String> {
    let mut columns: Vec<String> = rows.iter().map(|row| row.series.clone()).collect();
    columns.sort();
    columns.dedup();
    columns
}
