//! Error types for results analysis

use std::path::PathBuf;
use thiserror::Error;

/// Result type for analysis operations
pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The results file does not exist
    #[error("Results file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("Invalid tolerance: {0}")]
    InvalidTolerance(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
