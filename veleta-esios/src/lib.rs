//! veleta-esios
//!
//! [`IndicatorSource`] backed by the public ESIOS REST API of Red Eléctrica
//! de España. One HTTP request is issued per indicator id; the responses are
//! flattened into a single raw table with `datetime` and `value` columns.
#![warn(missing_docs)]

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use veleta_core::{IndicatorSource, RawTable, TimeTruncation, VeletaError};

const SOURCE_NAME: &str = "veleta-esios";
const DEFAULT_BASE_URL: &str = "https://api.esios.ree.es";
const ACCEPT_HEADER: &str = "application/json; application/vnd.esios-api-v1+json";

/// Timestamp format the source writes into its raw tables.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Personal ESIOS access token.
///
/// Loaded once from a keys file and passed to the source explicitly; the
/// `Debug` impl never prints the token itself.
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap an already-obtained token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Read the token from a JSON keys file with an `ESIOS_KEY` entry.
    ///
    /// # Errors
    /// `Source` if the file cannot be read or is not JSON, `MissingField`
    /// if the `ESIOS_KEY` entry is absent or not a string.
    pub fn load(keys_file: impl AsRef<Path>) -> Result<Self, VeletaError> {
        let contents = std::fs::read_to_string(keys_file.as_ref())
            .map_err(|e| VeletaError::source(SOURCE_NAME, e.to_string()))?;
        let parsed: serde_json::Value = serde_json::from_str(&contents)
            .map_err(|e| VeletaError::source(SOURCE_NAME, e.to_string()))?;
        parsed
            .get("ESIOS_KEY")
            .and_then(serde_json::Value::as_str)
            .map(Self::new)
            .ok_or_else(|| VeletaError::missing_field("ESIOS_KEY"))
    }

    fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Builder for [`EsiosSource`].
pub struct EsiosBuilder {
    api_key: ApiKey,
    base_url: String,
}

impl EsiosBuilder {
    /// Point the source at a different host. Intended for tests against a
    /// local mock server.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Finish the builder.
    #[must_use]
    pub fn build(self) -> EsiosSource {
        EsiosSource {
            client: reqwest::Client::new(),
            api_key: self.api_key,
            base_url: self.base_url,
        }
    }
}

/// Indicator source talking to the ESIOS API over HTTPS.
pub struct EsiosSource {
    client: reqwest::Client,
    api_key: ApiKey,
    base_url: String,
}

#[derive(Deserialize)]
struct IndicatorEnvelope {
    indicator: IndicatorBody,
}

#[derive(Deserialize)]
struct IndicatorBody {
    values: Vec<IndicatorValue>,
}

#[derive(Deserialize)]
struct IndicatorValue {
    datetime: String,
    value: f64,
}

impl EsiosSource {
    /// Source against the production ESIOS host.
    #[must_use]
    pub fn new(api_key: ApiKey) -> Self {
        Self::builder(api_key).build()
    }

    /// Builder for customizing the source before use.
    #[must_use]
    pub fn builder(api_key: ApiKey) -> EsiosBuilder {
        EsiosBuilder {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    async fn fetch_one(
        &self,
        indicator: u32,
        start: NaiveDateTime,
        end: NaiveDateTime,
        truncation: TimeTruncation,
    ) -> Result<Vec<IndicatorValue>, VeletaError> {
        let url = format!("{}/indicators/{indicator}", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Accept", ACCEPT_HEADER)
            .header("x-api-key", self.api_key.token())
            .query(&[
                ("start_date", start.format("%Y-%m-%dT%H:%M:%S").to_string()),
                ("end_date", end.format("%Y-%m-%dT%H:%M:%S").to_string()),
                ("time_trunc", truncation.as_str().to_string()),
            ])
            .send()
            .await
            .map_err(|e| VeletaError::source(SOURCE_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(VeletaError::source(
                SOURCE_NAME,
                format!("indicator {indicator}: HTTP {status}"),
            ));
        }
        let envelope: IndicatorEnvelope = response
            .json()
            .await
            .map_err(|e| VeletaError::source(SOURCE_NAME, e.to_string()))?;
        Ok(envelope.indicator.values)
    }

    /// ESIOS reports zoned ISO 8601 timestamps; the pipeline works on naive
    /// local time, so drop the offset after parsing.
    fn localize(datetime: &str) -> Result<String, VeletaError> {
        let parsed = DateTime::parse_from_rfc3339(datetime).map_err(|e| {
            VeletaError::Data(format!("cannot parse ESIOS datetime '{datetime}': {e}"))
        })?;
        Ok(parsed.naive_local().format(TIMESTAMP_FORMAT).to_string())
    }
}

#[async_trait]
impl IndicatorSource for EsiosSource {
    fn name(&self) -> &'static str {
        SOURCE_NAME
    }

    async fn fetch_indicator_series(
        &self,
        indicators: &[u32],
        start: NaiveDateTime,
        end: NaiveDateTime,
        truncation: TimeTruncation,
    ) -> Result<RawTable, VeletaError> {
        if indicators.is_empty() {
            return Err(VeletaError::InvalidArg(
                "at least one indicator id is required".to_string(),
            ));
        }
        let mut table = RawTable::new(vec!["datetime".to_string(), "value".to_string()]);
        for &indicator in indicators {
            for entry in self.fetch_one(indicator, start, end, truncation).await? {
                table.push_row(vec![Self::localize(&entry.datetime)?, entry.value.to_string()])?;
            }
        }
        Ok(table)
    }
}
