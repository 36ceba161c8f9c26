//! Error types for ragmind core.

use std::path::PathBuf;
use thiserror::Error;

/// Core result type alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from core types and helpers.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A string that does not name a variant of a closed set
    /// (preference levels, memory types).
    #[error("Invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

/// Loading, saving, and validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Invalid JSON5 syntax or shape.
    #[error("JSON5 parse error: {0}")]
    Json5(String),

    /// Serializing the config for writing failed.
    #[error("Serialize error: {0}")]
    Parse(String),

    /// Every failed check, joined with "; ".
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnv(String),
}
