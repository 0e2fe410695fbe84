//! Monte Carlo driver
//!
//! Every trial builds its own [`SensorNetwork`] from its own generator, so trials share
//! no state and can run in any order. In pooled mode workers only compute trial
//! outcomes; the coordinating thread owns the sink and writes outcomes in simulation
//! index order, so both modes produce the same file for the same seed.

use crate::error::{SimError, SimResult};
use crate::network::{SensorNetwork, StatusLog};
use crate::results::ResultsWriter;
use breakdetect_components::PartConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Trials handed to each worker per dispatch round
const TRIALS_PER_WORKER: usize = 64;

/// Largest worker pool the driver will build
pub const MAX_WORKERS: usize = 1024;

/// Result of one trial
#[derive(Debug, Clone, PartialEq)]
pub struct TrialOutcome {
    pub status_log: StatusLog,
    /// Last cycle the network was advanced to
    pub cycles: u64,
    /// False when the cycle ceiling was reached with parts still intact
    pub complete: bool,
}

/// Run a single trial from `start_cycle` up to (not including) `cycle_ceiling`
pub fn simulate<R: Rng + ?Sized>(
    cycle_ceiling: u64,
    parts: &[PartConfig],
    start_cycle: u64,
    rng: &mut R,
) -> SimResult<TrialOutcome> {
    let mut network = SensorNetwork::new(parts, start_cycle, rng)?;
    for cycle in start_cycle..cycle_ceiling {
        if network.complete() {
            break;
        }
        network.advance(cycle)?;
    }

    Ok(TrialOutcome {
        cycles: network.cycles(),
        complete: network.complete(),
        status_log: network.into_status_log(),
    })
}

/// How trials are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    #[default]
    Sequential,
    Pooled,
}

/// Batch configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub num_simulations: usize,
    /// Exclusive upper bound on simulated cycles
    pub cycle_ceiling: u64,
    pub start_cycle: u64,
    pub parts: Vec<PartConfig>,
    pub mode: ExecutionMode,
    /// Pool size; defaults to the number of logical CPUs
    pub workers: Option<usize>,
    /// Master seed; trial `i` derives its generator from it. Entropy when unset.
    pub seed: Option<u64>,
}

impl SimulationConfig {
    pub fn new(num_simulations: usize, cycle_ceiling: u64, parts: Vec<PartConfig>) -> Self {
        Self {
            num_simulations,
            cycle_ceiling,
            start_cycle: 0,
            parts,
            mode: ExecutionMode::Sequential,
            workers: None,
            seed: None,
        }
    }

    pub fn with_start_cycle(mut self, start_cycle: u64) -> Self {
        self.start_cycle = start_cycle;
        self
    }

    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Effective pool size, clamped to `1..=MAX_WORKERS`
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).clamp(1, MAX_WORKERS)
    }
}

/// What a batch produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub trials: usize,
    pub rows: usize,
    /// Trials truncated by the cycle ceiling
    pub incomplete_trials: usize,
    pub destination: Option<PathBuf>,
}

pub struct MonteCarloDriver {
    config: SimulationConfig,
}

impl MonteCarloDriver {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run the batch, writing the header and every trial's rows to `sink`
    pub fn run<W: Write>(&self, sink: W) -> SimResult<BatchSummary> {
        let config = &self.config;
        if config.start_cycle > config.cycle_ceiling {
            return Err(SimError::InvalidConfiguration(format!(
                "start cycle {} is past the cycle ceiling {}",
                config.start_cycle, config.cycle_ceiling
            )));
        }

        info!(
            "Running {} simulations of {} cycles over {} parts ({:?})",
            config.num_simulations,
            config.cycle_ceiling,
            config.parts.len(),
            config.mode
        );
        let start = Instant::now();

        let mut writer = ResultsWriter::new(sink);
        writer.write_header(config.num_simulations, config.cycle_ceiling)?;

        let incomplete_trials = match config.mode {
            ExecutionMode::Sequential => self.run_sequential(&mut writer)?,
            ExecutionMode::Pooled => self.run_pooled(&mut writer)?,
        };
        let rows = writer.rows();
        writer.finish()?;

        if incomplete_trials > 0 {
            warn!(
                "{} of {} trials reached the cycle ceiling before every part failed",
                incomplete_trials, config.num_simulations
            );
        }
        info!(
            "Wrote {} rows for {} trials in {:.3}s",
            rows,
            config.num_simulations,
            start.elapsed().as_secs_f64()
        );

        Ok(BatchSummary {
            trials: config.num_simulations,
            rows,
            incomplete_trials,
            destination: None,
        })
    }

    /// Run the batch into a file at `path`
    ///
    /// Rows go to a temporary file next to `path`, which replaces `path` only once the
    /// whole batch has succeeded. A failed batch leaves `path` untouched.
    pub fn run_to_path(&self, path: impl AsRef<Path>) -> SimResult<BatchSummary> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut staged = NamedTempFile::new_in(dir)?;
        let mut summary = self.run(BufWriter::new(staged.as_file_mut()))?;
        staged.persist(path).map_err(|e| SimError::Io(e.error))?;

        summary.destination = Some(path.to_path_buf());
        Ok(summary)
    }

    /// Run trial `index` with its own generator
    pub fn run_trial(&self, index: usize) -> SimResult<TrialOutcome> {
        let config = &self.config;
        let mut rng = self.trial_rng(index);
        let outcome = simulate(config.cycle_ceiling, &config.parts, config.start_cycle, &mut rng)?;
        debug!(
            trial = index,
            readings = outcome.status_log.len(),
            cycles = outcome.cycles,
            complete = outcome.complete,
            "trial finished"
        );
        Ok(outcome)
    }

    fn trial_rng(&self, index: usize) -> StdRng {
        match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(mix_seed(seed, index as u64)),
            None => StdRng::from_entropy(),
        }
    }

    fn run_sequential<W: Write>(&self, writer: &mut ResultsWriter<W>) -> SimResult<usize> {
        let mut incomplete = 0;
        for index in 0..self.config.num_simulations {
            let outcome = self.run_trial(index)?;
            if !outcome.complete {
                incomplete += 1;
            }
            writer.write_trial(index, &outcome.status_log)?;
        }
        Ok(incomplete)
    }

    fn run_pooled<W: Write>(&self, writer: &mut ResultsWriter<W>) -> SimResult<usize> {
        let workers = self.config.worker_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("breakdetect-worker-{}", i))
            .build()
            .map_err(|e| SimError::ThreadPool(e.to_string()))?;
        debug!("Started worker pool with {} threads", workers);

        let batch_size = workers.saturating_mul(TRIALS_PER_WORKER);
        let mut incomplete = 0;
        let mut next = 0;
        while next < self.config.num_simulations {
            let end = (next + batch_size).min(self.config.num_simulations);
            let outcomes = pool.install(|| {
                (next..end)
                    .into_par_iter()
                    .map(|index| self.run_trial(index))
                    .collect::<SimResult<Vec<_>>>()
            })?;

            for (index, outcome) in (next..end).zip(&outcomes) {
                if !outcome.complete {
                    incomplete += 1;
                }
                writer.write_trial(index, &outcome.status_log)?;
            }
            next = end;
        }
        Ok(incomplete)
    }
}

/// SplitMix64 finalizer over the master seed and trial index
fn mix_seed(seed: u64, index: u64) -> u64 {
    let mut z = seed ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Run `num_simulations` trials on the calling thread, writing results to `path`
pub fn run_simulation(
    num_simulations: usize,
    cycle_ceiling: u64,
    parts: &[PartConfig],
    start_cycle: u64,
    path: impl AsRef<Path>,
) -> SimResult<BatchSummary> {
    let config = SimulationConfig::new(num_simulations, cycle_ceiling, parts.to_vec())
        .with_start_cycle(start_cycle);
    MonteCarloDriver::new(config).run_to_path(path)
}

/// Run `num_simulations` trials on a worker pool, writing results to `path`
///
/// `workers` defaults to the number of logical CPUs.
pub fn multirun_simulation(
    num_simulations: usize,
    cycle_ceiling: u64,
    parts: &[PartConfig],
    start_cycle: u64,
    workers: Option<usize>,
    path: impl AsRef<Path>,
) -> SimResult<BatchSummary> {
    let mut config = SimulationConfig::new(num_simulations, cycle_ceiling, parts.to_vec())
        .with_start_cycle(start_cycle)
        .with_mode(ExecutionMode::Pooled);
    config.workers = workers;
    MonteCarloDriver::new(config).run_to_path(path)
}
