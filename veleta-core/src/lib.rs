//! veleta-core
//!
//! Core table types, the indicator-source trait, and the time-series
//! algorithms shared across the veleta ecosystem.
//!
//! - `table`: the data model (`RawTable`, `YearMatrix`, `ScenarioTable`).
//! - `source`: the `IndicatorSource` capability trait.
//! - `timeseries`: the pipeline stages (align, adjust, resample, sample).
//!
//! All transforms are synchronous, batch-style, and validate-then-apply:
//! every error is raised before the stage mutates anything, carries the
//! offending value, and is never retried. Only the source trait is async
//! (Tokio via `async-trait`), matching the I/O boundary.
#![warn(missing_docs)]

/// Unified error type for the workspace.
pub mod error;
/// The indicator-source capability trait and related types.
pub mod source;
/// Table types flowing through the pipeline.
pub mod table;
/// Time-series transforms making up the pipeline stages.
pub mod timeseries;

pub use error::VeletaError;
pub use source::{IndicatorSource, SourceKey, TimeTruncation};
pub use table::{RawTable, REFERENCE_YEAR, ScenarioTable, YearMatrix};
pub use timeseries::adjust::{AdjustmentMap, AdjustmentPolicy, apply_annual_adjustment};
pub use timeseries::align::align_calendar;
pub use timeseries::frequency::{Frequency, FrequencyGrammar};
pub use timeseries::infer::infer_step_seconds;
pub use timeseries::resample::{Aggregation, downsample, upsample};
pub use timeseries::sample::{generate_scenarios, generate_scenarios_with_rng};
