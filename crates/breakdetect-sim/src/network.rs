//! Sensor network state machine
//!
//! A network starts *active* with every configured part present, sorted by sampled
//! lifetime, and becomes *complete* once the last part has failed. Each advance moves
//! the leading failed parts to the failure list and logs the resulting aggregate
//! resistance the first time that reading is seen.

use crate::error::{SimError, SimResult};
use breakdetect_components::{parallel_resistance, HasResistance, InstrumentedPart, PartConfig};
use indexmap::IndexMap;
use rand::Rng;

/// First-seen resistance readings mapped to the parts failed at that point, in fail order
pub type StatusLog = IndexMap<String, Vec<String>>;

/// Status-log key for a resistance reading: ohms to one decimal place, `inf` when open
pub fn reading_key(ohms: f64) -> String {
    format!("{:.1}", ohms)
}

#[derive(Debug, Clone)]
pub struct SensorNetwork {
    /// Parts still intact, ascending by lifetime
    active: Vec<InstrumentedPart>,
    /// Parts in the order they were observed to fail
    failed: Vec<InstrumentedPart>,
    cycle: u64,
    status_log: StatusLog,
}

impl SensorNetwork {
    /// Build one part per config, sampling every part from `rng`
    pub fn new<R: Rng + ?Sized>(
        configs: &[PartConfig],
        start_cycle: u64,
        rng: &mut R,
    ) -> SimResult<Self> {
        let parts = configs
            .iter()
            .map(|config| InstrumentedPart::from_config(config, &mut *rng))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_parts(parts, start_cycle))
    }

    /// Network over already-built parts
    pub fn from_parts(mut parts: Vec<InstrumentedPart>, start_cycle: u64) -> Self {
        parts.sort_by(|a, b| a.lifetime().total_cmp(&b.lifetime()));
        Self {
            active: parts,
            failed: Vec::new(),
            cycle: start_cycle,
            status_log: StatusLog::new(),
        }
    }

    /// Advance the network to `cycle`
    ///
    /// Cycles must be non-decreasing across calls: failure detection only scans the
    /// leading parts of the lifetime-sorted active list, which is sound only if no
    /// earlier cycle is revisited. An earlier cycle is rejected with
    /// [`SimError::CycleRegression`] and leaves the network unchanged. Once the network
    /// is complete, advancing is a no-op.
    pub fn advance(&mut self, cycle: u64) -> SimResult<()> {
        if self.complete() {
            return Ok(());
        }
        if cycle < self.cycle {
            return Err(SimError::CycleRegression {
                previous: self.cycle,
                requested: cycle,
            });
        }
        self.cycle = cycle;

        let now = cycle as f64;
        let mut newly_failed = 0;
        while newly_failed < self.active.len() && self.active[newly_failed].failed(now) {
            newly_failed += 1;
        }
        self.failed.extend(self.active.drain(..newly_failed));

        let key = reading_key(self.resistance());
        if !self.status_log.contains_key(&key) {
            let names = self.failed.iter().map(|p| p.name().to_string()).collect();
            self.status_log.insert(key, names);
        }
        Ok(())
    }

    /// Aggregate resistance of the intact parts in parallel
    pub fn resistance(&self) -> f64 {
        parallel_resistance(self.active.iter().map(|p| p.resistance()))
    }

    /// Failed parts in fail order
    pub fn failures(&self) -> &[InstrumentedPart] {
        &self.failed
    }

    /// Parts still intact, ascending by lifetime
    pub fn active(&self) -> &[InstrumentedPart] {
        &self.active
    }

    pub fn complete(&self) -> bool {
        self.active.is_empty()
    }

    pub fn cycles(&self) -> u64 {
        self.cycle
    }

    /// Every part, intact or failed, carrying `name`
    pub fn get_part(&self, name: &str) -> Vec<&InstrumentedPart> {
        self.active
            .iter()
            .chain(self.failed.iter())
            .filter(|p| p.name() == name)
            .collect()
    }

    pub fn status_log(&self) -> &StatusLog {
        &self.status_log
    }

    pub fn into_status_log(self) -> StatusLog {
        self.status_log
    }
}
