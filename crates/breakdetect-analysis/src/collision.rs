//! Collision detection over persisted trial results
//!
//! The analyzer remembers the first failed-part set seen for each reading. A later row
//! whose reading matches but whose failed set differs is a collision. Readings match
//! exactly by default; with a positive tolerance, any earlier reading within
//! `tolerance` ohms counts as a match.

use crate::error::{AnalysisError, AnalysisResult};
use breakdetect_sim::results::is_data_line;
use breakdetect_sim::{ResultRecord, SimError};
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Exact matching of readings
pub const DEFAULT_TOLERANCE: f64 = 0.0;

/// Collisions keyed by the reading of the conflicting row
pub type Collisions = IndexMap<String, Collision>;

/// A reading that two different failure sets produced
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    /// Reading of the conflicting row
    pub reading: String,
    /// Reading that first established `original`; equals `reading` under exact matching
    pub original_reading: String,
    /// Sorted failed set first seen for the reading
    pub original: Vec<String>,
    /// Sorted failed set of the conflicting row
    pub conflicting: Vec<String>,
    /// Simulation index of the conflicting row
    pub simulation: usize,
}

/// Reading in ohms ordered by `f64::total_cmp`
#[derive(Debug, Clone, Copy)]
struct Ohms(f64);

impl PartialEq for Ohms {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ohms {}

impl PartialOrd for Ohms {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ohms {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug)]
pub struct CollisionAnalyzer {
    results_path: PathBuf,
    tolerance: f64,
    /// First failed set per reading
    resistances: IndexMap<String, Vec<String>>,
    /// Same readings ordered numerically, for tolerance lookups
    by_ohms: BTreeMap<Ohms, String>,
    rows: usize,
}

impl CollisionAnalyzer {
    pub fn new(results_path: impl Into<PathBuf>) -> Self {
        Self {
            results_path: results_path.into(),
            tolerance: DEFAULT_TOLERANCE,
            resistances: IndexMap::new(),
            by_ohms: BTreeMap::new(),
            rows: 0,
        }
    }

    /// Match readings within `tolerance` ohms of each other
    pub fn with_tolerance(mut self, tolerance: f64) -> AnalysisResult<Self> {
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(AnalysisError::InvalidTolerance(tolerance));
        }
        self.tolerance = tolerance;
        Ok(self)
    }

    pub fn results_path(&self) -> &Path {
        &self.results_path
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Data rows read by the last check
    pub fn rows_read(&self) -> usize {
        self.rows
    }

    /// Distinct readings seen by the last check
    pub fn distinct_readings(&self) -> usize {
        self.resistances.len()
    }

    /// Scan the results file for readings produced by more than one failure set
    pub fn check_obvious_collisions(&mut self) -> AnalysisResult<Collisions> {
        if !self.results_path.exists() {
            return Err(AnalysisError::NotFound(self.results_path.clone()));
        }
        self.resistances.clear();
        self.by_ohms.clear();
        self.rows = 0;

        let reader = BufReader::new(File::open(&self.results_path)?);
        let mut collisions = Collisions::new();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;
            if !is_data_line(&line) {
                continue;
            }
            let record: ResultRecord =
                line.parse().map_err(|e| AnalysisError::MalformedRecord {
                    line: number + 1,
                    reason: match e {
                        SimError::MalformedRecord(reason) => reason,
                        other => other.to_string(),
                    },
                })?;
            self.rows += 1;

            if let Some(collision) = self.observe(&record) {
                debug!(
                    reading = %collision.reading,
                    simulation = collision.simulation,
                    "collision"
                );
                collisions.insert(collision.reading.clone(), collision);
            }
        }

        info!(
            "Checked {} rows over {} distinct readings: {} collisions",
            self.rows,
            self.resistances.len(),
            collisions.len()
        );
        Ok(collisions)
    }

    fn observe(&mut self, record: &ResultRecord) -> Option<Collision> {
        let failed = record.failed_set();
        let collision = self
            .matching_reading(record, &failed)
            .map(|(original_reading, original)| Collision {
                reading: record.reading.clone(),
                original_reading,
                original,
                conflicting: failed.clone(),
                simulation: record.simulation,
            });

        if !self.resistances.contains_key(&record.reading) {
            self.by_ohms.insert(Ohms(record.ohms), record.reading.clone());
            self.resistances.insert(record.reading.clone(), failed);
        }
        collision
    }

    /// Earlier reading matching `record` whose failed set differs from `failed`
    fn matching_reading(
        &self,
        record: &ResultRecord,
        failed: &[String],
    ) -> Option<(String, Vec<String>)> {
        if self.tolerance == 0.0 {
            return self
                .resistances
                .get(&record.reading)
                .filter(|original| original.as_slice() != failed)
                .map(|original| (record.reading.clone(), original.clone()));
        }

        let low = Ohms(record.ohms - self.tolerance);
        let high = Ohms(record.ohms + self.tolerance);
        self.by_ohms
            .range(low..=high)
            .filter_map(|(ohms, reading)| {
                let original = &self.resistances[reading];
                (original.as_slice() != failed)
                    .then(|| ((ohms.0 - record.ohms).abs(), reading, original))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, reading, original)| (reading.clone(), original.clone()))
    }
}
