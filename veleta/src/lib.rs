//! veleta
//!
//! Orchestrator crate. Selects an indicator source from configuration,
//! fetches one window per historical year, and runs the staged pipeline
//! (align, adjust, resample, sample) to produce a scenario table.
//!
//! ```no_run
//! use std::sync::Arc;
//! use veleta::{Veleta, load_config};
//! use veleta_mock::MockSource;
//!
//! # async fn run() -> Result<(), veleta_core::VeletaError> {
//! let config = load_config("pipeline.json")?;
//! let veleta = Veleta::builder()
//!     .with_source(Arc::new(MockSource::new()))
//!     .with_config(config)
//!     .build()?;
//! let init = chrono::NaiveDate::from_ymd_opt(2023, 6, 1)
//!     .and_then(|d| d.and_hms_opt(10, 0, 0))
//!     .ok_or_else(|| veleta_core::VeletaError::InvalidArg("bad init".into()))?;
//! let scenarios = veleta.run(init).await?;
//! # Ok(())
//! # }
//! ```
#![warn(missing_docs)]

pub(crate) mod core;

pub use core::{ESIOS_SOURCE, LOCAL_CSV_SOURCE, Veleta, VeletaBuilder, load_config};
pub use veleta_core::{
    Aggregation, AdjustmentMap, Frequency, IndicatorSource, RawTable, ScenarioTable,
    TimeTruncation, VeletaError, YearMatrix,
};
pub use veleta_types::{
    AdjustmentParams, AdjustmentPolicy, DownsamplingParams, EsiosParams, FrequencyGrammar,
    LocalCsvParams, PipelineConfig, SamplingParams, SourceParams, UpsamplingParams,
};
