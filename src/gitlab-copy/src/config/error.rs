//! Configuration error types.

use super::range::RangeError;
use thiserror::Error;

/// Errors that can occur while loading the migration configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("Failed to parse configuration: {source}")]
    YamlError {
        #[source]
        source: serde_yaml::Error,
    },

    /// A required value is missing or invalid.
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    /// The issue selection of the source project is malformed.
    #[error("Invalid issue selection: {0}")]
    Range(#[from] RangeError),
}
