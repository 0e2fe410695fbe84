//! # breakdetect components
//!
//! Models of the parts that go into an accelerated-life-test sensor network:
//!
//! - [`FailureModel`]: Weibull-distributed lifetime for one part
//! - [`Resistor`] and the series/parallel reduction rules over [`HasResistance`]
//! - [`Wire`]: copper lead sized by AWG gauge, which opens when the part breaks
//! - [`InstrumentedPart`]: a part carrying a [`BreakSensor`] (resistor in series with a wire)
//!
//! Every random draw takes an explicit generator so that callers control seeding.

pub mod error;
pub mod failure;
pub mod part;
pub mod resistor;
pub mod wire;

pub use error::{ComponentError, Result};
pub use failure::FailureModel;
pub use part::{validate_name, BreakSensor, InstrumentedPart, PartConfig};
pub use resistor::{parallel_resistance, series_resistance, HasResistance, Resistor};
pub use wire::{Gauge, Wire};
