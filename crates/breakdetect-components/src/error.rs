//! Error types for component construction

use thiserror::Error;

/// Result type for component operations
pub type Result<T> = std::result::Result<T, ComponentError>;

/// Errors raised while building failure or electrical models
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ComponentError {
    /// Wire gauge is neither an AWG integer nor an aught string such as "000" or "3/0"
    #[error("Invalid wire gauge: {0}")]
    InvalidGauge(String),

    /// A model parameter is out of its valid domain
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
