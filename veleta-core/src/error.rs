use thiserror::Error;

/// Unified error type for the veleta workspace.
///
/// Every variant represents a caller or configuration mistake: validation is
/// performed synchronously before any stage mutates its input, nothing is
/// retried, and the offending value rides along in the variant.
#[derive(Debug, Error)]
pub enum VeletaError {
    /// A required column is absent from the raw source table.
    #[error("missing required field '{field}' in source table")]
    MissingField {
        /// Name of the missing column.
        field: String,
    },

    /// The year columns of a matrix do not form a contiguous integer range.
    #[error("year columns must be contiguous, got {years:?}")]
    NonContiguousYears {
        /// The column years as found, sorted.
        years: Vec<i32>,
    },

    /// An adjustment-map key could not be read as an integer year.
    #[error("adjustment key '{key}' is not an integer year")]
    InvalidAdjustmentKey {
        /// The offending key, verbatim.
        key: String,
    },

    /// The adjustment map does not cover every year of the matrix's span.
    #[error("adjustment map is missing entries for years {missing:?}")]
    IncompleteAdjustmentCoverage {
        /// Years of the required span without an entry, sorted.
        missing: Vec<i32>,
    },

    /// A frequency string does not match the configured grammar.
    #[error(
        "frequency '{input}' is not valid; expected <magnitude><unit> with unit one of [{units}] (e.g. \"2m\" for one entry every 2 minutes)"
    )]
    InvalidFrequencyFormat {
        /// The rejected frequency string, verbatim.
        input: String,
        /// Unit letters legal under the grammar in force.
        units: &'static str,
    },

    /// The requested frequency points the wrong way for the operation.
    #[error(
        "requested frequency '{requested}' ({requested_secs}s) is not strictly {needed} than the series frequency ({current_secs}s)"
    )]
    ResolutionDirection {
        /// The requested frequency string, verbatim.
        requested: String,
        /// Requested period in seconds.
        requested_secs: i64,
        /// Inferred series period in seconds.
        current_secs: i64,
        /// `"finer"` for upsampling, `"coarser"` for downsampling.
        needed: &'static str,
    },

    /// An interpolation or aggregation method name is not implemented.
    #[error("method '{method}' is not implemented; choose one of: {}", supported.join(", "))]
    UnsupportedMethod {
        /// The rejected method name.
        method: String,
        /// The supported set, for the caller.
        supported: &'static [&'static str],
    },

    /// A distribution family name is not available for sampling.
    #[error("distribution '{family}' is not available for sampling; choose one of: {}", supported.join(", "))]
    UnsupportedDistribution {
        /// The rejected family name.
        family: String,
        /// The supported set, for the caller.
        supported: &'static [&'static str],
    },

    /// The configured data-source name is not among the recognized options.
    #[error("unknown data source '{name}'")]
    UnknownDataSource {
        /// The rejected source name.
        name: String,
    },

    /// An indicator source failed while fetching.
    #[error("{source_name} failed: {msg}")]
    Source {
        /// Source name that failed.
        source_name: String,
        /// Human-readable error message.
        msg: String,
    },

    /// Issues with returned or expected data (unparseable cells, empty rows, ...).
    #[error("data issue: {0}")]
    Data(String),

    /// Invalid input argument.
    #[error("invalid argument: {0}")]
    InvalidArg(String),
}

impl VeletaError {
    /// Helper: build a `MissingField` error for a column name.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Helper: build a `Source` error with the source name and message.
    pub fn source(source_name: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            msg: msg.into(),
        }
    }

    /// Helper: build an `UnknownDataSource` error.
    pub fn unknown_data_source(name: impl Into<String>) -> Self {
        Self::UnknownDataSource { name: name.into() }
    }
}
