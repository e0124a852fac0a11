use std::path::Path;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use veleta_core::{
    Aggregation, AdjustmentMap, IndicatorSource, RawTable, ScenarioTable, TimeTruncation,
    VeletaError, YearMatrix, align_calendar, apply_annual_adjustment, downsample,
    generate_scenarios, upsample,
};
use veleta_esios::{ApiKey, EsiosSource};
use veleta_localcsv::LocalCsvSource;
use veleta_types::PipelineConfig;

/// Configured source name for the remote ESIOS API.
pub const ESIOS_SOURCE: &str = "esios";
/// Configured source name for a local CSV file.
pub const LOCAL_CSV_SOURCE: &str = "local_csv";

/// Read a [`PipelineConfig`] from a JSON file.
///
/// # Errors
/// `Data` if the file cannot be read or does not deserialize.
pub fn load_config(path: impl AsRef<Path>) -> Result<PipelineConfig, VeletaError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .map_err(|e| VeletaError::Data(format!("cannot read config {}: {e}", path.display())))?;
    serde_json::from_str(&contents)
        .map_err(|e| VeletaError::Data(format!("cannot parse config {}: {e}", path.display())))
}

/// Orchestrator running the staged pipeline against one indicator source.
pub struct Veleta {
    source: Arc<dyn IndicatorSource>,
    config: PipelineConfig,
    indicators: Vec<u32>,
    truncation: TimeTruncation,
}

impl std::fmt::Debug for Veleta {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Veleta")
            .field("config", &self.config)
            .field("indicators", &self.indicators)
            .field("truncation", &self.truncation)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`Veleta`] with an explicit source.
#[derive(Default)]
pub struct VeletaBuilder {
    source: Option<Arc<dyn IndicatorSource>>,
    config: Option<PipelineConfig>,
}

impl VeletaBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use this indicator source instead of selecting one from the config.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn IndicatorSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Set the pipeline configuration.
    #[must_use]
    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Finish the builder.
    ///
    /// # Errors
    /// `InvalidArg` when the source or config is missing, or when the
    /// configured ESIOS time truncation is not a recognized name.
    pub fn build(self) -> Result<Veleta, VeletaError> {
        let source = self
            .source
            .ok_or_else(|| VeletaError::InvalidArg("no indicator source registered".to_string()))?;
        let config = self
            .config
            .ok_or_else(|| VeletaError::InvalidArg("no pipeline configuration set".to_string()))?;

        let (indicators, truncation) = match &config.source.esios {
            Some(params) => (
                params.indicators.clone(),
                TimeTruncation::parse(&params.time_trunc)?,
            ),
            None => (Vec::new(), TimeTruncation::default()),
        };
        Ok(Veleta {
            source,
            config,
            indicators,
            truncation,
        })
    }
}

impl Veleta {
    /// Returns an empty builder; register a source and a config, then `build()`.
    #[must_use]
    pub fn builder() -> VeletaBuilder {
        VeletaBuilder::new()
    }

    /// Construct from configuration alone, selecting the indicator source by
    /// the configured name.
    ///
    /// The name must be listed in the configured option list; a listed but
    /// unimplemented name is still `UnknownDataSource`. Selecting ESIOS reads
    /// the API key from the configured keys file here, once, and moves it
    /// into the connector.
    pub fn from_config(config: PipelineConfig) -> Result<Self, VeletaError> {
        let requested = config.source.data_source.as_str();
        if !config.source.options.iter().any(|o| o == requested) {
            return Err(VeletaError::unknown_data_source(requested));
        }
        let source: Arc<dyn IndicatorSource> = match requested {
            ESIOS_SOURCE => {
                let params = config
                    .source
                    .esios
                    .as_ref()
                    .ok_or_else(|| VeletaError::missing_field("source.esios"))?;
                let api_key = ApiKey::load(&params.keys_file)?;
                Arc::new(EsiosSource::new(api_key))
            }
            LOCAL_CSV_SOURCE => {
                let params = config
                    .source
                    .local_csv
                    .as_ref()
                    .ok_or_else(|| VeletaError::missing_field("source.local_csv"))?;
                Arc::new(LocalCsvSource::new(
                    &params.file,
                    &config.timestamp_column,
                    &config.timestamp_format,
                ))
            }
            other => return Err(VeletaError::unknown_data_source(other)),
        };
        Self::builder().with_source(source).with_config(config).build()
    }

    /// Name of the indicator source in use.
    #[must_use]
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// The configuration this orchestrator runs with.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fetch one window per historical year and align the results on the
    /// within-year calendar axis.
    ///
    /// Each window starts at `init`'s month-day-time in that year and spans
    /// the configured number of hours; years run from the configured initial
    /// year up to (exclusive) `init`'s year.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn fetch_aligned(&self, init: NaiveDateTime) -> Result<YearMatrix, VeletaError> {
        self.fetch_aligned_with(
            init,
            self.config.source.initial_year,
            self.config.source.hours_ahead,
        )
        .await
    }

    /// [`fetch_aligned`](Self::fetch_aligned) with the configured window
    /// overridden for this call only.
    pub async fn fetch_aligned_with(
        &self,
        init: NaiveDateTime,
        initial_year: i32,
        hours_ahead: u32,
    ) -> Result<YearMatrix, VeletaError> {
        if initial_year >= init.year() {
            return Err(VeletaError::InvalidArg(format!(
                "initial year {initial_year} is not before the init year {}",
                init.year()
            )));
        }

        let mut combined: Option<RawTable> = None;
        for year in initial_year..init.year() {
            let start = anchor_in_year(init, year)?;
            let end = start + Duration::hours(i64::from(hours_ahead));
            #[cfg(feature = "tracing")]
            tracing::debug!(year, %start, %end, "fetching window");
            let chunk = self
                .source
                .fetch_indicator_series(&self.indicators, start, end, self.truncation)
                .await?;
            match combined.as_mut() {
                Some(table) => table.append(chunk)?,
                None => combined = Some(chunk),
            }
        }
        let raw = combined.ok_or_else(|| {
            VeletaError::Data("no windows were fetched for the requested span".to_string())
        })?;
        align_calendar(
            &raw,
            &self.config.timestamp_column,
            &self.config.value_column,
            &self.config.timestamp_format,
            self.config.include_leap_day,
        )
    }

    /// Run the full pipeline: fetch, align, adjust, resample, sample.
    ///
    /// Stage order follows the config: adjustments first, then upsampling
    /// and/or downsampling when configured, then scenario sampling.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn run(&self, init: NaiveDateTime) -> Result<ScenarioTable, VeletaError> {
        let mut matrix = self.fetch_aligned(init).await?;

        let adjustments = AdjustmentMap::from_config(&self.config.adjustment.by_year)?;
        if !adjustments.is_empty() {
            matrix = apply_annual_adjustment(matrix, &adjustments, self.config.adjustment.policy)?;
        }

        let grammar = self.config.frequency_grammar;
        if let Some(params) = &self.config.upsampling {
            matrix = upsample(matrix, &params.frequency, &params.method, params.order, grammar)?;
        }
        if let Some(params) = &self.config.downsampling {
            let aggregation = Aggregation::parse(&params.aggregation)?;
            matrix = downsample(matrix, &params.frequency, &aggregation, grammar)?;
        }

        generate_scenarios(
            &matrix,
            self.config.sampling.samples,
            &self.config.sampling.distribution,
        )
    }
}

/// `init`'s month-day-time placed in `year`.
///
/// Fails for a Feb-29 init when `year` is not a leap year; callers picking a
/// leap-day anchor must also pick leap initial years.
fn anchor_in_year(init: NaiveDateTime, year: i32) -> Result<NaiveDateTime, VeletaError> {
    NaiveDate::from_ymd_opt(year, init.month(), init.day())
        .and_then(|d| d.and_hms_opt(init.hour(), init.minute(), 0))
        .ok_or_else(|| {
            VeletaError::InvalidArg(format!(
                "init anchor {:02}-{:02} {:02}:{:02} does not exist in year {year}",
                init.month(),
                init.day(),
                init.hour(),
                init.minute()
            ))
        })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::anchor_in_year;

    fn at(y: i32, m: u32, d: u32, h: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn anchor_keeps_month_day_and_time() {
        let anchored = anchor_in_year(at(2023, 6, 15, 9), 2020).unwrap();
        assert_eq!(anchored, at(2020, 6, 15, 9));
    }

    #[test]
    fn leap_day_anchor_fails_in_common_years() {
        assert!(anchor_in_year(at(2024, 2, 29, 0), 2020).is_ok());
        assert!(anchor_in_year(at(2024, 2, 29, 0), 2021).is_err());
    }
}
