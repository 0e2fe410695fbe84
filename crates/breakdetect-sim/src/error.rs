//! Error types for simulation runs

use breakdetect_components::ComponentError;
use thiserror::Error;

/// Result type for simulation operations
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised while building networks, running trials or persisting results
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Component error: {0}")]
    Component(#[from] ComponentError),

    /// `advance` was called with a cycle earlier than one already observed
    #[error("Cycle regression: network is at cycle {previous}, cannot advance to {requested}")]
    CycleRegression { previous: u64, requested: u64 },

    #[error("Invalid simulation configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Worker pool error: {0}")]
    ThreadPool(String),

    #[error("Malformed results record: {0}")]
    MalformedRecord(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
