//! veleta-mock
//!
//! Deterministic [`IndicatorSource`] for CI-safe tests and examples. Values
//! are a pure function of the timestamp and indicator id, so repeated
//! fetches and overlapping year windows always agree.
#![warn(missing_docs)]

use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime, Timelike};
use veleta_core::{IndicatorSource, RawTable, TimeTruncation, VeletaError};

/// Requesting this indicator id makes the fetch fail, for error-path tests.
pub const FAILING_INDICATOR: u32 = 9_999;

/// Timestamp format used in the mock's raw tables.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Mock indicator source producing a deterministic synthetic series.
pub struct MockSource;

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    /// Create a mock source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// The deterministic observation for a timestamp and indicator.
    ///
    /// Shaped like a demand curve: a daily swing on top of a yearly drift,
    /// scaled a little per indicator so different ids stay distinguishable.
    #[must_use]
    pub fn value_at(indicator: u32, ts: NaiveDateTime) -> f64 {
        let daily = f64::from((ts.hour() + 18) % 24) * 2.5;
        let seasonal = f64::from(ts.ordinal() % 120) * 0.25;
        let yearly = f64::from(ts.year() - 2000) * 0.5;
        50.0 + daily + seasonal + yearly + f64::from(indicator % 7)
    }

    const fn step_seconds(truncation: TimeTruncation) -> i64 {
        match truncation {
            TimeTruncation::FiveMinutes => 300,
            TimeTruncation::Day => 86_400,
            _ => 3_600,
        }
    }
}

#[async_trait]
impl IndicatorSource for MockSource {
    fn name(&self) -> &'static str {
        "veleta-mock"
    }

    async fn fetch_indicator_series(
        &self,
        indicators: &[u32],
        start: NaiveDateTime,
        end: NaiveDateTime,
        truncation: TimeTruncation,
    ) -> Result<RawTable, VeletaError> {
        if indicators.contains(&FAILING_INDICATOR) {
            return Err(VeletaError::source(
                self.name(),
                format!("forced failure for indicator {FAILING_INDICATOR}"),
            ));
        }
        if end <= start {
            return Err(VeletaError::InvalidArg(format!(
                "empty fetch window: {start} to {end}"
            )));
        }
        // One block of rows per indicator, in request order, like the
        // production sources. No ids at all means one default series.
        let ids: &[u32] = if indicators.is_empty() { &[1] } else { indicators };

        let mut table = RawTable::new(vec!["datetime".to_string(), "value".to_string()]);
        let step = chrono::Duration::seconds(Self::step_seconds(truncation));
        for &indicator in ids {
            let mut ts = start;
            while ts < end {
                table.push_row(vec![
                    ts.format(TIMESTAMP_FORMAT).to_string(),
                    Self::value_at(indicator, ts).to_string(),
                ])?;
                ts += step;
            }
        }
        Ok(table)
    }
}
