//! Calendar alignment: raw chronological observations to a [`YearMatrix`].

use std::collections::{BTreeMap, BTreeSet, HashSet};

use chrono::{Datelike, NaiveDateTime};

use crate::error::VeletaError;
use crate::table::{RawTable, REFERENCE_YEAR, YearMatrix};

/// Align a raw series onto the shared within-year calendar axis.
///
/// Each row's timestamp is parsed with `timestamp_format`, split into a
/// calendar year (the column key) and a within-year position (the row key,
/// the timestamp re-anchored to [`REFERENCE_YEAR`]). One column is built per
/// distinct year; positions a year never observed stay missing. Rows sharing
/// an identical timestamp are collapsed to the first occurrence.
///
/// With `include_leap_day == false`, Feb-29 rows are dropped entirely. Row
/// keys are anchored to the fixed reference year for every input, so a
/// single-year result needs no further normalization for downstream
/// frequency inference.
///
/// The raw table is not mutated.
///
/// # Errors
/// - `Err(VeletaError::MissingField)` if the timestamp or value column is
///   absent.
/// - `Err(VeletaError::Data)` if a timestamp or value cell fails to parse.
pub fn align_calendar(
    raw: &RawTable,
    timestamp_column: &str,
    value_column: &str,
    timestamp_format: &str,
    include_leap_day: bool,
) -> Result<YearMatrix, VeletaError> {
    let ts_idx = raw
        .column_index(timestamp_column)
        .ok_or_else(|| VeletaError::missing_field(timestamp_column))?;
    let value_idx = raw
        .column_index(value_column)
        .ok_or_else(|| VeletaError::missing_field(value_column))?;

    let mut seen: HashSet<NaiveDateTime> = HashSet::with_capacity(raw.len());
    let mut positions: BTreeSet<NaiveDateTime> = BTreeSet::new();
    let mut by_year: BTreeMap<i32, BTreeMap<NaiveDateTime, f64>> = BTreeMap::new();

    for row in raw.rows() {
        let ts_cell = &row[ts_idx];
        let ts = NaiveDateTime::parse_from_str(ts_cell, timestamp_format).map_err(|e| {
            VeletaError::Data(format!(
                "timestamp '{ts_cell}' does not match format '{timestamp_format}': {e}"
            ))
        })?;
        let value_cell = &row[value_idx];
        let value: f64 = value_cell
            .trim()
            .parse()
            .map_err(|_| VeletaError::Data(format!("value '{value_cell}' is not a number")))?;

        // First occurrence wins for duplicate timestamps.
        if !seen.insert(ts) {
            continue;
        }

        if !include_leap_day && ts.month() == 2 && ts.day() == 29 {
            continue;
        }

        // The reference year is a leap year, so re-anchoring never fails.
        let position = ts.with_year(REFERENCE_YEAR).ok_or_else(|| {
            VeletaError::Data(format!("timestamp '{ts}' has no reference-year equivalent"))
        })?;

        positions.insert(position);
        by_year.entry(ts.year()).or_default().insert(position, value);
    }

    let index: Vec<NaiveDateTime> = positions.into_iter().collect();
    let columns: BTreeMap<i32, Vec<Option<f64>>> = by_year
        .into_iter()
        .map(|(year, cells)| {
            let col = index.iter().map(|pos| cells.get(pos).copied()).collect();
            (year, col)
        })
        .collect();

    YearMatrix::new(index, columns)
}
