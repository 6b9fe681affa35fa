//! Error types for the categorization engine.

use thiserror::Error;

/// Result type alias for engine operations that can fail.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures that abort a categorization run.
///
/// Per-response anomalies (blank lines, vocabulary exhaustion) are handled
/// with defined fallback values and never surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// The category vocabulary and the response mapping disagree, or a
    /// domain's configuration is unusable. Raised before any matrix work.
    #[error("configuration mismatch: {message}")]
    ConfigurationMismatch {
        /// Description of the mismatch
        message: String,
    },

    /// The embedding model could not be loaded. Fatal to the whole run.
    #[error("unable to load the embedding model: {message}")]
    ModelLoad {
        /// Description of the load failure
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The run was cancelled through its cancellation flag.
    #[error("the categorization run was cancelled")]
    Cancelled,

    /// I/O failure while writing observer or export output.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error
        #[from]
        source: std::io::Error,
    },

    /// JSON serialization failure in an observer.
    #[error("JSON serialization error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// CSV writing failure in the result exporter.
    #[error("CSV export error: {source}")]
    Csv {
        /// The underlying CSV error
        #[from]
        source: csv::Error,
    },
}

impl Error {
    pub(crate) fn mismatch(message: impl Into<String>) -> Self {
        Error::ConfigurationMismatch {
            message: message.into(),
        }
    }

    pub(crate) fn model_load(message: impl Into<String>) -> Self {
        Error::ModelLoad {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn model_load_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::ModelLoad {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}
