//! The indicator-source capability trait.

use async_trait::async_trait;
use chrono::NaiveDateTime;

use crate::error::VeletaError;
use crate::table::RawTable;
pub use veleta_types::SourceKey;

/// Server-side truncation granularity for fetched series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum TimeTruncation {
    /// One observation per hour.
    #[default]
    Hour,
    /// One observation per five minutes.
    FiveMinutes,
    /// Daily observations.
    Day,
}

impl TimeTruncation {
    /// Wire name of the truncation mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::FiveMinutes => "five_minutes",
            Self::Day => "day",
        }
    }

    /// Parse a configured truncation name.
    ///
    /// # Errors
    /// Returns `Err(VeletaError::InvalidArg)` for unrecognized names.
    pub fn parse(name: &str) -> Result<Self, VeletaError> {
        match name {
            "hour" => Ok(Self::Hour),
            "five_minutes" => Ok(Self::FiveMinutes),
            "day" => Ok(Self::Day),
            other => Err(VeletaError::InvalidArg(format!(
                "unknown time truncation '{other}'"
            ))),
        }
    }
}

/// Capability trait for anything that can produce raw indicator observations.
///
/// Implementations are opaque to the pipeline: they return a [`RawTable`]
/// with at least a timestamp column and one value column, and the pipeline
/// never mutates what they hand back. The two production implementations
/// (remote ESIOS API, local CSV file) are selected by configuration at
/// construction time.
#[async_trait]
pub trait IndicatorSource: Send + Sync {
    /// Stable machine name of this source, used in errors and logs.
    fn name(&self) -> &'static str;

    /// Typed key for configuration references.
    fn key(&self) -> SourceKey {
        SourceKey::new(self.name())
    }

    /// Fetch observations for the given indicators over `[start, end)`.
    async fn fetch_indicator_series(
        &self,
        indicators: &[u32],
        start: NaiveDateTime,
        end: NaiveDateTime,
        truncation: TimeTruncation,
    ) -> Result<RawTable, VeletaError>;
}
