//! Error types for configuration parsing and validation

use thiserror::Error;

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, ManifestError>;

/// Errors that can occur while loading a `breakdetect.toml`
#[derive(Debug, Error)]
pub enum ManifestError {
    /// I/O error reading or writing the manifest file
    #[error("I/O error: {0}")]
    Io(String),

    /// TOML parsing error
    #[error("Failed to parse manifest: {0}")]
    Parse(String),

    /// TOML serialization error
    #[error("Failed to serialize manifest: {0}")]
    Serialize(String),

    /// Semantically invalid settings
    #[error("Validation error: {0}")]
    Validation(String),
}
