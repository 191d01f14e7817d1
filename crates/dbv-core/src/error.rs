//! Error types for dbv-core

use thiserror::Error;

/// Core error type for dbversion
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Failed to parse configuration file
    #[error("[C002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// C003: Invalid configuration value
    #[error("[C003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C004: IO error with file path context
    #[error("[C004] IO error at {path}: {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C005: Invalid table name
    #[error("[C005] Invalid table name '{name}': {reason}")]
    InvalidTableName { name: String, reason: String },
}

impl From<serde_yaml::Error> for CoreError {
    fn from(err: serde_yaml::Error) -> Self {
        CoreError::ConfigParseError {
            message: err.to_string(),
        }
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
