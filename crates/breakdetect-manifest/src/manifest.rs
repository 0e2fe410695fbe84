//! Manifest structure definitions

use crate::error::{ManifestError, Result};
use breakdetect_components::{validate_name, PartConfig};
use breakdetect_sim::{ExecutionMode, SimulationConfig, MAX_WORKERS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File name `breakdetect init` writes and the CLI looks for
pub const DEFAULT_MANIFEST_NAME: &str = "breakdetect.toml";

/// Complete configuration for a simulation campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    /// Batch settings
    #[serde(default)]
    pub simulation: SimulationSection,

    /// Collision analysis settings
    #[serde(default)]
    pub analysis: AnalysisSection,

    /// Parts wired in parallel, in configuration order
    #[serde(default)]
    pub parts: Vec<PartConfig>,
}

/// `[simulation]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSection {
    /// Number of independent trials
    #[serde(default = "default_simulations")]
    pub simulations: usize,

    /// Ceiling as a multiple of the longest part MTTF
    #[serde(default = "default_cycles_per_mttf")]
    pub cycles_per_mttf: f64,

    /// Explicit cycle ceiling, overriding `cycles_per_mttf`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_ceiling: Option<u64>,

    #[serde(default)]
    pub start_cycle: u64,

    #[serde(default)]
    pub mode: ExecutionMode,

    /// Worker pool size (pooled mode); defaults to the logical CPU count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    /// Master seed for reproducible batches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    /// Results file
    #[serde(default = "default_output")]
    pub output: PathBuf,
}

fn default_simulations() -> usize {
    1000
}

fn default_cycles_per_mttf() -> f64 {
    3.0
}

fn default_output() -> PathBuf {
    PathBuf::from("results.csv")
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            simulations: default_simulations(),
            cycles_per_mttf: default_cycles_per_mttf(),
            cycle_ceiling: None,
            start_cycle: 0,
            mode: ExecutionMode::Sequential,
            workers: None,
            seed: None,
            output: default_output(),
        }
    }
}

/// `[analysis]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSection {
    /// Readings within this many ohms are treated as the same signature; 0 is exact
    #[serde(default)]
    pub tolerance: f64,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self { tolerance: 0.0 }
    }
}

impl Manifest {
    /// Five sensors of 1k-5k ohms with a 15-cycle MTTF; about as many parts as a
    /// single parallel network can still tell apart
    pub fn default_network() -> Self {
        let parts = [1e3, 2e3, 3e3, 4e3, 5e3]
            .iter()
            .map(|&resistance| PartConfig::new(15.0, resistance))
            .collect();
        Self {
            simulation: SimulationSection::default(),
            analysis: AnalysisSection::default(),
            parts,
        }
    }

    /// Exclusive cycle ceiling for each trial
    pub fn cycle_ceiling(&self) -> u64 {
        if let Some(ceiling) = self.simulation.cycle_ceiling {
            return ceiling;
        }
        let longest_mttf = self
            .parts
            .iter()
            .map(|p| p.mttf)
            .fold(0.0_f64, f64::max);
        (self.simulation.cycles_per_mttf * longest_mttf) as u64
    }

    /// Batch configuration for the Monte Carlo driver
    pub fn simulation_config(&self) -> SimulationConfig {
        let sim = &self.simulation;
        SimulationConfig {
            num_simulations: sim.simulations,
            cycle_ceiling: self.cycle_ceiling(),
            start_cycle: sim.start_cycle,
            parts: self.parts.clone(),
            mode: sim.mode,
            workers: sim.workers,
            seed: sim.seed,
        }
    }

    /// Validate the manifest
    pub fn validate(&self) -> Result<()> {
        let sim = &self.simulation;

        if self.parts.is_empty() {
            return Err(ManifestError::Validation(
                "at least one [[parts]] entry is required".to_string(),
            ));
        }
        if sim.simulations == 0 {
            return Err(ManifestError::Validation(
                "simulations must be at least 1".to_string(),
            ));
        }
        if !(sim.cycles_per_mttf.is_finite() && sim.cycles_per_mttf > 0.0) {
            return Err(ManifestError::Validation(format!(
                "cycles_per_mttf must be positive, got {}",
                sim.cycles_per_mttf
            )));
        }
        if let Some(workers) = sim.workers {
            if !(1..=MAX_WORKERS).contains(&workers) {
                return Err(ManifestError::Validation(format!(
                    "workers must be between 1 and {}, got {}",
                    MAX_WORKERS, workers
                )));
            }
        }
        if sim.start_cycle > self.cycle_ceiling() {
            return Err(ManifestError::Validation(format!(
                "start_cycle {} is past the cycle ceiling {}",
                sim.start_cycle,
                self.cycle_ceiling()
            )));
        }
        if !(self.analysis.tolerance.is_finite() && self.analysis.tolerance >= 0.0) {
            return Err(ManifestError::Validation(format!(
                "analysis tolerance must be non-negative, got {}",
                self.analysis.tolerance
            )));
        }

        for (index, part) in self.parts.iter().enumerate() {
            validate_part(index, part)?;
        }
        Ok(())
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| ManifestError::Serialize(e.to_string()))
    }
}

fn validate_part(index: usize, part: &PartConfig) -> Result<()> {
    let label = format!("part {} ({})", index, part.display_name());
    let positive = |field: &str, value: f64| {
        if value.is_finite() && value > 0.0 {
            Ok(())
        } else {
            Err(ManifestError::Validation(format!(
                "{}: {} must be positive, got {}",
                label, field, value
            )))
        }
    };

    validate_name(&part.display_name())
        .map_err(|e| ManifestError::Validation(format!("part {}: {}", index, e)))?;
    positive("mttf", part.mttf)?;
    if !(part.resistance.is_finite() && part.resistance >= 0.0) {
        return Err(ManifestError::Validation(format!(
            "{}: resistance must be non-negative, got {}",
            label, part.resistance
        )));
    }
    if let Some(length) = part.length {
        if !(length.is_finite() && length >= 0.0) {
            return Err(ManifestError::Validation(format!(
                "{}: length must be non-negative, got {}",
                label, length
            )));
        }
    }
    if let Some(shape) = part.shape {
        positive("shape", shape)?;
    }
    if let Some(scale) = part.scale {
        positive("scale", scale)?;
    }
    Ok(())
}
