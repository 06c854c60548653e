//! Error types for flightclues.
//!
//! Only conditions that stop a run are errors. Malformed record fields never
//! surface here (they simply contribute no findings), and the outcome of the
//! verification request is a value, not an error.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for flightclues operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Input Errors ===
    /// The record store does not exist.
    #[error("record store not found at {path}")]
    InputMissing {
        /// Path that was expected to hold the records.
        path: PathBuf,
    },

    /// The record store exists but could not be read.
    #[error("failed to read record store at {path}: {source}")]
    InputRead {
        /// Path to the record store.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The record store is not a JSON array of records.
    #[error("record store at {path} is malformed: {message}")]
    InputFormat {
        /// Path to the record store.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Network Errors ===
    /// A URL could not be built from the configured base and a path segment.
    #[error("invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The URL that failed to parse.
        url: String,
        /// Description of what went wrong.
        message: String,
    },

    /// HTTP client setup or transfer failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for flightclues operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a malformed-input error.
    #[must_use]
    pub fn input_format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InputFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an invalid URL error.
    #[must_use]
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Check if this error means no record collection was supplied.
    #[must_use]
    pub fn is_input_missing(&self) -> bool {
        matches!(self, Self::InputMissing { .. })
    }
}
