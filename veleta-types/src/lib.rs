//! Veleta-specific configuration primitives shared across the pipeline crates.
#![warn(missing_docs)]

mod config;
mod source;

pub use config::{
    AdjustmentParams, AdjustmentPolicy, DownsamplingParams, EsiosParams, FrequencyGrammar,
    LocalCsvParams, PipelineConfig, SamplingParams, SourceParams, UpsamplingParams,
};
pub use source::SourceKey;
