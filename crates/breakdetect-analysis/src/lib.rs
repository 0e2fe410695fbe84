//! # breakdetect analysis
//!
//! Post-hoc checks over a results file written by `breakdetect-sim`. A *collision* is a
//! resistance reading produced by more than one distinct set of failed parts, which
//! means the reading alone cannot diagnose which parts failed.

pub mod collision;
pub mod error;
pub mod report;

pub use collision::{Collision, CollisionAnalyzer, Collisions, DEFAULT_TOLERANCE};
pub use error::{AnalysisError, AnalysisResult};
pub use report::format_collision_report;
