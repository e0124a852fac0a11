//! veleta-localcsv
//!
//! [`IndicatorSource`] backed by a CSV file on disk. The file is read in
//! full on every fetch and filtered down to the requested window, so the
//! source has no state to invalidate between calls.
#![warn(missing_docs)]

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDateTime;
use veleta_core::{IndicatorSource, RawTable, TimeTruncation, VeletaError};

/// Indicator source reading observations from a local CSV file.
///
/// The first CSV record is taken as the header row. Window filtering parses
/// the configured timestamp column with the configured format; the indicator
/// ids and time truncation of a fetch are ignored, the file is the data.
pub struct LocalCsvSource {
    path: PathBuf,
    timestamp_column: String,
    timestamp_format: String,
}

impl LocalCsvSource {
    /// Create a source over `path`.
    ///
    /// `timestamp_column` names the header cell holding timestamps, written
    /// in `timestamp_format` (a chrono strftime pattern).
    pub fn new(
        path: impl AsRef<Path>,
        timestamp_column: impl Into<String>,
        timestamp_format: impl Into<String>,
    ) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            timestamp_column: timestamp_column.into(),
            timestamp_format: timestamp_format.into(),
        }
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<RawTable, VeletaError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_path(&self.path)
            .map_err(|e| VeletaError::source(SOURCE_NAME, e.to_string()))?;

        let headers = reader
            .headers()
            .map_err(|e| VeletaError::source(SOURCE_NAME, e.to_string()))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut table = RawTable::new(headers);
        for record in reader.records() {
            let record = record.map_err(|e| VeletaError::source(SOURCE_NAME, e.to_string()))?;
            table.push_row(record.iter().map(str::to_string).collect())?;
        }
        Ok(table)
    }
}

const SOURCE_NAME: &str = "veleta-localcsv";

#[async_trait]
impl IndicatorSource for LocalCsvSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_indicator_series(
        &self,
        _indicators: &[u32],
        start: NaiveDateTime,
        end: NaiveDateTime,
        _truncation: TimeTruncation,
    ) -> Result<RawTable, VeletaError> {
        let full = self.read_all()?;
        let ts_idx = full
            .column_index(&self.timestamp_column)
            .ok_or_else(|| VeletaError::missing_field(&self.timestamp_column))?;

        let mut window = RawTable::new(full.columns().to_vec());
        for row in full.rows() {
            let ts = NaiveDateTime::parse_from_str(&row[ts_idx], &self.timestamp_format)
                .map_err(|e| {
                    VeletaError::Data(format!(
                        "cannot parse timestamp '{}' with format '{}': {e}",
                        row[ts_idx], self.timestamp_format
                    ))
                })?;
            if ts >= start && ts < end {
                window.push_row(row.clone())?;
            }
        }
        Ok(window)
    }
}
