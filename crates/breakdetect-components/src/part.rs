//! Instrumented parts: a failing part carrying a resistive break sensor

use crate::error::{ComponentError, Result};
use crate::failure::{FailureModel, DEFAULT_SCALE, DEFAULT_SHAPE};
use crate::resistor::{series_resistance, HasResistance, Resistor};
use crate::wire::{Gauge, Wire, DEFAULT_LENGTH};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Parameters for one instrumented part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartConfig {
    /// Mean time to failure in cycles
    pub mttf: f64,

    /// Nominal sensor resistance in ohms
    pub resistance: f64,

    /// Lead length in inches (default 6)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,

    /// Lead gauge (default 24 AWG)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gauge: Option<Gauge>,

    /// Weibull shape (default 3, wear-out)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<f64>,

    /// Weibull scale (default 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,

    /// Display name; defaults to the nominal resistance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PartConfig {
    pub fn new(mttf: f64, resistance: f64) -> Self {
        Self {
            mttf,
            resistance,
            length: None,
            gauge: None,
            shape: None,
            scale: None,
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_lead(mut self, length: f64, gauge: Gauge) -> Self {
        self.length = Some(length);
        self.gauge = Some(gauge);
        self
    }

    pub fn with_weibull(mut self, shape: f64, scale: f64) -> Self {
        self.shape = Some(shape);
        self.scale = Some(scale);
        self
    }

    /// Name the part will carry once built
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.resistance.to_string())
    }
}

/// Check that `name` survives a round trip through a results row
///
/// Names are written as comma-separated fields and trimmed when read back, so a name
/// may not be empty, carry surrounding whitespace, or contain a comma or line break.
pub fn validate_name(name: &str) -> Result<()> {
    let problem = if name.trim().is_empty() {
        Some("is empty")
    } else if name.trim() != name {
        Some("has leading or trailing whitespace")
    } else if name.contains(',') {
        Some("contains a comma")
    } else if name.contains(['\n', '\r']) {
        Some("contains a line break")
    } else {
        None
    };

    match problem {
        Some(problem) => Err(ComponentError::InvalidConfiguration(format!(
            "part name {:?} {}",
            name, problem
        ))),
        None => Ok(()),
    }
}

/// Resistor strapped to a part, in series with the lead that breaks with it
#[derive(Debug, Clone)]
pub struct BreakSensor {
    resistor: Resistor,
    wire: Wire,
}

impl BreakSensor {
    pub fn new<R: Rng + ?Sized>(
        resistance: f64,
        length: f64,
        gauge: Gauge,
        rng: &mut R,
    ) -> Result<Self> {
        let resistor = Resistor::with_default_tolerance(resistance, rng)?;
        let wire = Wire::new(length, gauge, rng)?;
        Ok(Self { resistor, wire })
    }

    pub fn is_broken(&self) -> bool {
        self.wire.is_broken()
    }

    pub fn set_broken(&mut self, broken: bool) {
        self.wire.set_broken(broken);
    }

    pub fn resistor(&self) -> &Resistor {
        &self.resistor
    }

    pub fn wire(&self) -> &Wire {
        &self.wire
    }
}

impl HasResistance for BreakSensor {
    fn resistance(&self) -> f64 {
        let elements: [&dyn HasResistance; 2] = [&self.resistor, &self.wire];
        series_resistance(elements)
    }
}

/// A part under test whose break sensor opens when the part fails
#[derive(Debug, Clone)]
pub struct InstrumentedPart {
    name: String,
    failure: FailureModel,
    sensor: BreakSensor,
}

impl InstrumentedPart {
    /// Build a part, sampling its lifetime and sensor values from `rng`
    pub fn from_config<R: Rng + ?Sized>(config: &PartConfig, rng: &mut R) -> Result<Self> {
        let name = config.display_name();
        validate_name(&name)?;

        let failure = FailureModel::sample(
            config.mttf,
            config.shape.unwrap_or(DEFAULT_SHAPE),
            config.scale.unwrap_or(DEFAULT_SCALE),
            rng,
        )?;
        let sensor = BreakSensor::new(
            config.resistance,
            config.length.unwrap_or(DEFAULT_LENGTH),
            config.gauge.unwrap_or_default(),
            rng,
        )?;

        Ok(Self {
            name,
            failure,
            sensor,
        })
    }

    /// Whether the part has failed by `cycle`
    ///
    /// A failed part breaks its sensor lead, after which the part reads as an open
    /// circuit. The lead is never repaired here.
    pub fn failed(&mut self, cycle: f64) -> bool {
        let failed = self.failure.failed(cycle);
        if failed && !self.sensor.is_broken() {
            self.sensor.set_broken(true);
        }
        failed
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn lifetime(&self) -> f64 {
        self.failure.lifetime()
    }

    pub fn is_broken(&self) -> bool {
        self.sensor.is_broken()
    }

    pub fn failure_model(&self) -> &FailureModel {
        &self.failure
    }

    pub fn sensor(&self) -> &BreakSensor {
        &self.sensor
    }
}

impl HasResistance for InstrumentedPart {
    fn resistance(&self) -> f64 {
        self.sensor.resistance()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const MTTF: f64 = 15.0;
    const RESISTANCE: f64 = 1e3;
    const LENGTH: f64 = 9.0;

    fn config() -> PartConfig {
        PartConfig::new(MTTF, RESISTANCE).with_lead(LENGTH, Gauge::Awg(24))
    }

    #[test]
    fn test_sensor_matches_series_of_parts() {
        let mut rng = StdRng::seed_from_u64(1);
        let resistor = Resistor::with_default_tolerance(RESISTANCE, &mut rng).unwrap();
        let wire = Wire::new(LENGTH, Gauge::Awg(24), &mut rng).unwrap();
        let elements: [&dyn HasResistance; 2] = [&resistor, &wire];
        let expected = series_resistance(elements);

        let sensor = BreakSensor::new(RESISTANCE, LENGTH, Gauge::Awg(24), &mut rng).unwrap();
        assert!((sensor.resistance() - expected).abs() < expected / 10.0);
        assert!(
            (sensor.resistance() - sensor.resistor().resistance() - sensor.wire().resistance())
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn test_part_resistance_near_nominal() {
        let mut rng = StdRng::seed_from_u64(2);
        let part = InstrumentedPart::from_config(&config(), &mut rng).unwrap();
        assert!((part.resistance() - RESISTANCE).abs() < RESISTANCE / 10.0);
        assert!(!part.is_broken());
    }

    #[test]
    fn test_part_break_opens_circuit() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut part = InstrumentedPart::from_config(&config(), &mut rng).unwrap();

        let first_failure = (0..(MTTF as u64 * 1000))
            .find(|&cycle| part.failed(cycle as f64))
            .expect("part should fail well within 1000 MTTFs");

        assert!(part.is_broken());
        assert!(part.resistance().is_infinite());
        assert!(first_failure as f64 >= part.lifetime());
    }

    #[test]
    fn test_failed_is_monotonic() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut part = InstrumentedPart::from_config(&config(), &mut rng).unwrap();
        let lifetime = part.lifetime();

        assert!(!part.failed(lifetime * 0.5));
        assert!(part.resistance().is_finite());
        assert!(part.failed(lifetime));
        assert!(part.failed(lifetime + 10.0));
        // An earlier query after failure never un-breaks the sensor
        part.failed(0.0);
        assert!(part.is_broken());
        assert!(part.resistance().is_infinite());
    }

    #[test]
    fn test_default_name_is_resistance() {
        assert_eq!(PartConfig::new(MTTF, 1000.0).display_name(), "1000");
        assert_eq!(PartConfig::new(MTTF, 4.7).display_name(), "4.7");
        assert_eq!(
            PartConfig::new(MTTF, 1000.0)
                .with_name("Kevlar Strand 33")
                .display_name(),
            "Kevlar Strand 33"
        );
    }

    #[test]
    fn test_names_that_would_split_a_row_are_rejected() {
        for bad in ["a,b", "", "   ", " padded", "line\nbreak", "carriage\rreturn"] {
            assert!(
                matches!(validate_name(bad), Err(ComponentError::InvalidConfiguration(_))),
                "{:?} should be rejected",
                bad
            );

            let mut rng = StdRng::seed_from_u64(6);
            let config = PartConfig::new(MTTF, RESISTANCE).with_name(bad);
            assert!(InstrumentedPart::from_config(&config, &mut rng).is_err());
        }

        for good in ["1000", "Kevlar Strand 33", "#7", "strand-a"] {
            assert!(validate_name(good).is_ok(), "{:?} should be accepted", good);
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut rng = StdRng::seed_from_u64(5);
        let bad = PartConfig::new(-1.0, RESISTANCE);
        assert!(InstrumentedPart::from_config(&bad, &mut rng).is_err());
    }
}
