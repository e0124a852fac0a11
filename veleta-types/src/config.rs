//! Configuration types shared by the orchestrator and the indicator sources.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Coverage policy for per-year adjustments.
///
/// The source history of this pipeline carried both behaviors; the policy is
/// therefore an explicit configuration choice rather than a guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum AdjustmentPolicy {
    /// Every year in the matrix's span must have an adjustment entry;
    /// incomplete coverage is an error.
    #[default]
    Strict,
    /// Only overlapping years are adjusted; years without an entry are left
    /// unscaled (and logged when tracing is enabled).
    Lenient,
}

/// Unit alphabet accepted when parsing frequency strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum FrequencyGrammar {
    /// Seconds, minutes, hours, days (`s`, `m`, `h`, `d`).
    #[default]
    Standard,
    /// Standard units plus weeks (`w`). Months are deliberately absent: a
    /// month is not a fixed-length period and cannot be normalized to a
    /// second count.
    Extended,
}

/// Parameters for the remote ESIOS indicator source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EsiosParams {
    /// Indicator ids to request.
    pub indicators: Vec<u32>,
    /// Server-side time truncation granularity (e.g. `"hour"`).
    pub time_trunc: String,
    /// Path of the JSON file holding the API key.
    pub keys_file: PathBuf,
}

/// Parameters for the local CSV indicator source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalCsvParams {
    /// Path of the CSV file to read.
    pub file: PathBuf,
}

/// Where and how to fetch the raw observations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceParams {
    /// First calendar year considered for the request.
    pub initial_year: i32,
    /// Hours from the init month-day-time covered by each per-year request.
    pub hours_ahead: u32,
    /// Name of the data source to use. Must be one of `options`.
    pub data_source: String,
    /// Names of the data sources this deployment recognizes.
    pub options: Vec<String>,
    /// ESIOS source parameters; required when `data_source` selects ESIOS.
    #[serde(default)]
    pub esios: Option<EsiosParams>,
    /// Local CSV source parameters; required when `data_source` selects it.
    #[serde(default)]
    pub local_csv: Option<LocalCsvParams>,
}

/// Per-year adjustment section.
///
/// The map is kept with string keys exactly as deserialized; key-to-year
/// parsing is validated by the core when the map is first used, so a
/// non-integer key surfaces as a pipeline error rather than a serde error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdjustmentParams {
    /// Coverage policy to apply.
    #[serde(default)]
    pub policy: AdjustmentPolicy,
    /// Percentage delta per year; `+3` scales the year's column by `1.03`.
    #[serde(default)]
    pub by_year: BTreeMap<String, f64>,
}

/// Interpolation parameters for upsampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsamplingParams {
    /// Target frequency string, e.g. `"30m"`.
    pub frequency: String,
    /// Interpolation method name (`"polynomial"` or `"spline"`).
    pub method: String,
    /// Interpolation order used when a call does not override it.
    pub order: u32,
}

/// Aggregation parameters for downsampling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownsamplingParams {
    /// Target frequency string, e.g. `"2h"`.
    pub frequency: String,
    /// Named aggregation applied to each bucket (`"mean"`, `"sum"`, ...).
    pub aggregation: String,
}

/// Scenario sampling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplingParams {
    /// Number of synthetic samples drawn per row.
    pub samples: usize,
    /// Distribution family name (`"truncnorm"`).
    pub distribution: String,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            samples: 100,
            distribution: "truncnorm".to_string(),
        }
    }
}

/// Full configuration surface for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Data-source selection and fetch window parameters.
    pub source: SourceParams,
    /// Keep Feb-29 rows on the within-year axis.
    #[serde(default)]
    pub include_leap_day: bool,
    /// chrono format string used to parse source timestamps.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
    /// Name of the timestamp column in the raw table.
    #[serde(default = "default_timestamp_column")]
    pub timestamp_column: String,
    /// Name of the value column to analyze.
    #[serde(default = "default_value_column")]
    pub value_column: String,
    /// Unit alphabet in force for frequency strings.
    #[serde(default)]
    pub frequency_grammar: FrequencyGrammar,
    /// Per-year adjustment section.
    #[serde(default)]
    pub adjustment: AdjustmentParams,
    /// Optional upsampling stage.
    #[serde(default)]
    pub upsampling: Option<UpsamplingParams>,
    /// Optional downsampling stage.
    #[serde(default)]
    pub downsampling: Option<DownsamplingParams>,
    /// Scenario sampling stage.
    #[serde(default)]
    pub sampling: SamplingParams,
}

fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M".to_string()
}

fn default_timestamp_column() -> String {
    "datetime".to_string()
}

fn default_value_column() -> String {
    "value".to_string()
}
