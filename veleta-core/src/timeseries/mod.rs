//! Time-series transforms making up the pipeline stages.
//!
//! Modules include:
//! - `align`: calendar alignment of raw observations onto the within-year axis
//! - `adjust`: per-year percentage scaling with coverage validation
//! - `frequency`: frequency-string grammar, parsing, and normalization
//! - `infer`: current-step inference from row spacing
//! - `resample`: upsampling (interpolation) and downsampling (aggregation)
//! - `sample`: bounded-distribution scenario generation

/// Per-year adjustment maps, policies, and application.
pub mod adjust;
/// Calendar alignment of raw observations.
pub mod align;
/// Frequency grammar and parsing helpers.
pub mod frequency;
/// Step inference from row spacing.
pub mod infer;
/// Row-resolution changes in both directions.
pub mod resample;
/// Scenario sampling from per-row distribution fits.
pub mod sample;
