//! Error types for descriptor and value file handling.
//!
//! Covers I/O, serialization, and the declaration or coercion failures that
//! surface while turning a descriptor into a schema registry.

use param_schema_core::{DeclarationError, ValidationError};
use thiserror::Error;

/// Errors that can occur while loading descriptors or value files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A class or param declaration was rejected.
    #[error("class '{class}': {source}")]
    Declaration {
        class: String,
        #[source]
        source: DeclarationError,
    },

    /// A static default does not fit its param's type.
    #[error("class '{class}': invalid default for param '{param}': {source}")]
    InvalidDefault {
        class: String,
        param: String,
        #[source]
        source: ValidationError,
    },

    /// Both `default` and `default_env` were given.
    #[error("class '{class}': param '{param}' sets both 'default' and 'default_env'")]
    ConflictingDefaults { class: String, param: String },

    /// A value file's top level is not a mapping.
    #[error("value file must contain a mapping of param names to values")]
    InvalidValues,
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
