//! # breakdetect simulation
//!
//! Runs accelerated-life-test trials over a network of instrumented parts wired in
//! parallel, recording which failure combinations produce which aggregate resistance.
//!
//! - [`SensorNetwork`]: per-trial state machine advanced cycle by cycle
//! - [`simulate`]: one trial to completion or to the cycle ceiling
//! - [`MonteCarloDriver`]: many independent trials, sequential or on a worker pool
//! - [`results`]: the delimited results-file format shared with the analyzer

pub mod driver;
pub mod error;
pub mod network;
pub mod results;

pub use driver::{
    multirun_simulation, run_simulation, simulate, BatchSummary, ExecutionMode,
    MonteCarloDriver, SimulationConfig, TrialOutcome, MAX_WORKERS,
};
pub use error::{SimError, SimResult};
pub use network::{reading_key, SensorNetwork, StatusLog};
pub use results::{ResultRecord, ResultsWriter};
