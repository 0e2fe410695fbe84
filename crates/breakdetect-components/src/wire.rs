//! Copper lead model sized by American Wire Gauge
//!
//! Diameter follows the AWG geometric progression
//! `d = 0.005 in * 92^((36 - n) / 39)`, where `n` is the gauge number for 0-40 AWG and
//! `1 - zeros` for aught sizes ("00" = "2/0" gives `n = -1`).

use crate::error::{ComponentError, Result};
use crate::resistor::{HasResistance, Resistor};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Resistivity of copper in ohm-inches
pub const RESISTIVITY: f64 = 6.69e-7;

/// Ampacity rule of thumb for power transmission
pub const CIRCULAR_MILS_PER_AMP: f64 = 700.0;

/// Manufacturing tolerance on a lead's resistance
pub const WIRE_TOLERANCE: f64 = 0.01;

/// Default lead length in inches
pub const DEFAULT_LENGTH: f64 = 6.0;

/// Default lead gauge
pub const DEFAULT_GAUGE: Gauge = Gauge::Awg(24);

/// Thinnest gauge number accepted
pub const MAX_AWG: u8 = 40;

/// AWG wire size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "GaugeSpec", into = "GaugeSpec")]
pub enum Gauge {
    /// Numbered gauge, 0 through [`MAX_AWG`]
    Awg(u8),
    /// Aught size given by its count of zeros: `Aught(3)` is "000" or "3/0"
    Aught(u8),
}

impl Gauge {
    /// Numbered gauge, rejecting values past [`MAX_AWG`]
    pub fn awg(number: u8) -> Result<Self> {
        if number > MAX_AWG {
            return Err(ComponentError::InvalidGauge(format!(
                "{} is thinner than {} AWG",
                number, MAX_AWG
            )));
        }
        Ok(Gauge::Awg(number))
    }

    /// Aught gauge from its count of zeros; a single zero is 0 AWG
    pub fn aught(zeros: u8) -> Result<Self> {
        match zeros {
            0 => Err(ComponentError::InvalidGauge("aught size needs at least one zero".into())),
            1 => Ok(Gauge::Awg(0)),
            z => Ok(Gauge::Aught(z)),
        }
    }

    /// Exponent `n` of the AWG diameter progression
    pub fn ratio(&self) -> f64 {
        match self {
            Gauge::Awg(n) => *n as f64,
            Gauge::Aught(zeros) => 1.0 - *zeros as f64,
        }
    }

    /// Conductor diameter in inches
    pub fn diameter(&self) -> f64 {
        0.005 * 92f64.powf((36.0 - self.ratio()) / 39.0)
    }
}

impl Default for Gauge {
    fn default() -> Self {
        DEFAULT_GAUGE
    }
}

impl FromStr for Gauge {
    type Err = ComponentError;

    fn from_str(s: &str) -> Result<Self> {
        let spec = s.trim();
        let invalid = || ComponentError::InvalidGauge(format!("'{}'", s));

        if let Some((zeros, denominator)) = spec.split_once('/') {
            if denominator.trim() != "0" {
                return Err(invalid());
            }
            let zeros: u8 = zeros.trim().parse().map_err(|_| invalid())?;
            return Gauge::aught(zeros);
        }

        if !spec.is_empty() && spec.chars().all(|c| c == '0') {
            let zeros = u8::try_from(spec.len()).map_err(|_| invalid())?;
            return Gauge::aught(zeros);
        }

        let number: u8 = spec.parse().map_err(|_| invalid())?;
        Gauge::awg(number)
    }
}

impl fmt::Display for Gauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gauge::Awg(n) => write!(f, "{}", n),
            Gauge::Aught(zeros) => write!(f, "{}/0", zeros),
        }
    }
}

/// Gauge as written in configuration files: `24`, `"24"`, `"000"` or `"3/0"`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum GaugeSpec {
    Number(i64),
    Text(String),
}

impl TryFrom<GaugeSpec> for Gauge {
    type Error = ComponentError;

    fn try_from(spec: GaugeSpec) -> Result<Self> {
        match spec {
            GaugeSpec::Number(n) => {
                let number = u8::try_from(n)
                    .map_err(|_| ComponentError::InvalidGauge(n.to_string()))?;
                Gauge::awg(number)
            }
            GaugeSpec::Text(s) => s.parse(),
        }
    }
}

impl From<Gauge> for GaugeSpec {
    fn from(gauge: Gauge) -> Self {
        match gauge {
            Gauge::Awg(n) => GaugeSpec::Number(n as i64),
            aught => GaugeSpec::Text(aught.to_string()),
        }
    }
}

/// Copper lead connecting a break-sensor resistor
#[derive(Debug, Clone)]
pub struct Wire {
    length: f64,
    gauge: Gauge,
    diameter: f64,
    cross_section: f64,
    nominal_resistance: f64,
    /// Resistance drawn at construction, restored when the wire is repaired
    intact_resistance: f64,
    resistance: f64,
    max_current: f64,
    broken: bool,
}

impl Wire {
    /// Build an intact lead of `length` inches
    pub fn new<R: Rng + ?Sized>(length: f64, gauge: Gauge, rng: &mut R) -> Result<Self> {
        if !(length.is_finite() && length >= 0.0) {
            return Err(ComponentError::InvalidConfiguration(format!(
                "wire length must be non-negative and finite, got {}",
                length
            )));
        }

        let diameter = gauge.diameter();
        let cross_section = std::f64::consts::PI * (diameter / 2.0).powi(2);
        let nominal_resistance = RESISTIVITY * length / cross_section;
        let intact_resistance =
            Resistor::sample(nominal_resistance, WIRE_TOLERANCE, rng)?.resistance();

        let mut wire = Self {
            length,
            gauge,
            diameter,
            cross_section,
            nominal_resistance,
            intact_resistance,
            resistance: 0.0,
            max_current: 0.0,
            broken: false,
        };
        wire.set_broken(false);
        Ok(wire)
    }

    /// Open or repair the lead, recomputing resistance and ampacity
    pub fn set_broken(&mut self, broken: bool) {
        self.broken = broken;
        if broken {
            self.resistance = f64::INFINITY;
            self.max_current = 0.0;
        } else {
            self.resistance = self.intact_resistance;
            self.max_current = self.circular_mils() / CIRCULAR_MILS_PER_AMP;
        }
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Cross-section in circular mils
    pub fn circular_mils(&self) -> f64 {
        4e6 * self.cross_section / std::f64::consts::PI
    }

    /// Maximum current in amperes; zero once broken
    pub fn max_current(&self) -> f64 {
        self.max_current
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn gauge(&self) -> Gauge {
        self.gauge
    }

    /// Diameter in inches
    pub fn diameter(&self) -> f64 {
        self.diameter
    }

    /// Cross-sectional area in square inches
    pub fn cross_section(&self) -> f64 {
        self.cross_section
    }

    /// Geometric resistance before manufacturing tolerance
    ///
    /// Depends only on length and gauge, so it stays finite on a broken wire; use
    /// [`HasResistance::resistance`] for the electrical state.
    pub fn nominal_resistance(&self) -> f64 {
        self.nominal_resistance
    }
}

impl HasResistance for Wire {
    fn resistance(&self) -> f64 {
        self.resistance
    }
}
