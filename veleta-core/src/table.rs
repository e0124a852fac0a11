//! Table types flowing through the pipeline.
//!
//! `RawTable` is what an [`IndicatorSource`](crate::source::IndicatorSource)
//! returns: named columns, string cells, no interpretation. `YearMatrix` is
//! the aligned form every stage consumes and produces. `ScenarioTable` is the
//! final synthetic output.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;

use crate::error::VeletaError;

/// The fixed year every within-year row key is anchored to.
///
/// 2000 is a leap year, so a Feb-29 position is representable when leap days
/// are kept. Anchoring all matrices here also satisfies the single-year
/// normalization requirement of calendar alignment by construction.
pub const REFERENCE_YEAR: i32 = 2000;

/// A chronologically-keyed raw table as returned by an indicator source.
///
/// Cells are kept as strings; parsing (timestamps per the configured format,
/// values as floats) happens during calendar alignment so that a bad cell
/// surfaces as a pipeline error naming the offending value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create an empty table with the given column names.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append one row.
    ///
    /// # Errors
    /// Returns `Err(VeletaError::Data)` if the row arity does not match the
    /// column count.
    pub fn push_row(&mut self, row: Vec<String>) -> Result<(), VeletaError> {
        if row.len() != self.columns.len() {
            return Err(VeletaError::Data(format!(
                "row has {} cells, table has {} columns",
                row.len(),
                self.columns.len()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Append all rows of `other`.
    ///
    /// # Errors
    /// Returns `Err(VeletaError::Data)` if the column names differ.
    pub fn append(&mut self, other: Self) -> Result<(), VeletaError> {
        if self.columns != other.columns {
            return Err(VeletaError::Data(format!(
                "cannot concatenate tables with different columns: {:?} vs {:?}",
                self.columns, other.columns
            )));
        }
        self.rows.extend(other.rows);
        Ok(())
    }

    /// Position of a named column, if present.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Column names, in order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows, in insertion order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Aligned multi-year table: rows keyed by within-year position, columns by
/// calendar year.
///
/// Row keys are `NaiveDateTime`s whose year component is always
/// [`REFERENCE_YEAR`]; they are unique and strictly increasing. Every column
/// holds exactly one `Option<f64>` cell per row, `None` marking a position
/// the year never observed.
#[derive(Debug, Clone, PartialEq)]
pub struct YearMatrix {
    index: Vec<NaiveDateTime>,
    columns: BTreeMap<i32, Vec<Option<f64>>>,
}

impl YearMatrix {
    /// Build a matrix from parts, validating the row-key and column-length
    /// invariants.
    ///
    /// # Errors
    /// - `Err(VeletaError::InvalidArg)` if the index is not strictly
    ///   increasing, if a row key is not anchored to [`REFERENCE_YEAR`], or
    ///   if any column length differs from the index length.
    pub fn new(
        index: Vec<NaiveDateTime>,
        columns: BTreeMap<i32, Vec<Option<f64>>>,
    ) -> Result<Self, VeletaError> {
        for pair in index.windows(2) {
            if pair[0] >= pair[1] {
                return Err(VeletaError::InvalidArg(format!(
                    "row keys must be strictly increasing, got {} then {}",
                    pair[0], pair[1]
                )));
            }
        }
        if let Some(ts) = index.iter().find(|ts| ts.year() != REFERENCE_YEAR) {
            return Err(VeletaError::InvalidArg(format!(
                "row key {ts} is not anchored to the reference year {REFERENCE_YEAR}"
            )));
        }
        for (year, col) in &columns {
            if col.len() != index.len() {
                return Err(VeletaError::InvalidArg(format!(
                    "column {year} has {} cells for {} rows",
                    col.len(),
                    index.len()
                )));
            }
        }
        Ok(Self { index, columns })
    }

    /// Row keys, strictly increasing, anchored to [`REFERENCE_YEAR`].
    #[must_use]
    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    /// Column years, sorted ascending.
    #[must_use]
    pub fn years(&self) -> Vec<i32> {
        self.columns.keys().copied().collect()
    }

    /// The cells of one year column.
    #[must_use]
    pub fn column(&self, year: i32) -> Option<&[Option<f64>]> {
        self.columns.get(&year).map(Vec::as_slice)
    }

    /// Smallest and largest column year, if any columns exist.
    #[must_use]
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let first = self.columns.keys().next()?;
        let last = self.columns.keys().next_back()?;
        Some((*first, *last))
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    /// Number of year columns.
    #[must_use]
    pub fn n_years(&self) -> usize {
        self.columns.len()
    }

    /// The observed (non-missing) cells of one row, across year columns in
    /// ascending year order.
    #[must_use]
    pub fn row_observations(&self, row: usize) -> Vec<f64> {
        self.columns
            .values()
            .filter_map(|col| col.get(row).copied().flatten())
            .collect()
    }

    /// Verify that the column years form a contiguous integer range.
    ///
    /// # Errors
    /// Returns `Err(VeletaError::NonContiguousYears)` listing the years as
    /// found when there is a gap.
    pub fn ensure_contiguous_years(&self) -> Result<(), VeletaError> {
        let years = self.years();
        if let (Some(first), Some(last)) = (years.first(), years.last()) {
            if years.len() != usize::try_from(last - first + 1).unwrap_or(usize::MAX) {
                return Err(VeletaError::NonContiguousYears { years });
            }
        }
        Ok(())
    }

    pub(crate) fn columns_mut(&mut self) -> &mut BTreeMap<i32, Vec<Option<f64>>> {
        &mut self.columns
    }

    pub(crate) fn into_parts(self) -> (Vec<NaiveDateTime>, BTreeMap<i32, Vec<Option<f64>>>) {
        (self.index, self.columns)
    }
}

/// Synthetic scenario draws: the source matrix's row keys with anonymous
/// sample columns `0..samples`.
///
/// Ephemeral by design; rebuilt on every sampling request. Serializable so an
/// I/O layer can write it to whatever tabular format it likes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioTable {
    index: Vec<NaiveDateTime>,
    rows: Vec<Vec<f64>>,
    samples: usize,
}

impl ScenarioTable {
    pub(crate) fn new(index: Vec<NaiveDateTime>, rows: Vec<Vec<f64>>, samples: usize) -> Self {
        debug_assert_eq!(index.len(), rows.len());
        debug_assert!(rows.iter().all(|r| r.len() == samples));
        Self {
            index,
            rows,
            samples,
        }
    }

    /// Row keys, identical (and identically ordered) to the source matrix.
    #[must_use]
    pub fn index(&self) -> &[NaiveDateTime] {
        &self.index
    }

    /// Number of sample columns.
    #[must_use]
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// The draws of one row, sample indices `0..samples`.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        self.rows.get(row).map(Vec::as_slice)
    }

    /// All rows, in row-key order.
    #[must_use]
    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }
}
