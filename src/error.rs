//! Error types for the compliance engine
//!
//! Validation entry points never surface these: every failure inside a
//! validation call is converted into a diagnostic. These errors are returned
//! by the infrastructure layers (store, config, checker file wrappers).

use std::path::PathBuf;

use thiserror::Error;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, ComplianceError>;

/// Compliance engine errors
#[derive(Error, Debug)]
pub enum ComplianceError {
    #[error("Schema not found: {name} ({})", .path.display())]
    SchemaNotFound { name: String, path: PathBuf },

    #[error("Invalid schema document {name}: {reason}")]
    InvalidSchema { name: String, reason: String },

    #[error("Failed to compile schema {name}: {reason}")]
    Compile { name: String, reason: String },

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Invalid naming pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Unknown validator: {0}")]
    UnknownValidator(String),

    #[error("Unknown report format: {0}")]
    UnknownReportFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config_crate::ConfigError),

    #[error("Configuration serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
