//! Resistor sampling and two-terminal combination rules

use crate::error::{ComponentError, Result};
use rand::Rng;

/// Default resistor tolerance (5%)
pub const DEFAULT_TOLERANCE: f64 = 0.05;

/// Anything that presents a resistance in ohms across two terminals
pub trait HasResistance {
    fn resistance(&self) -> f64;
}

impl HasResistance for f64 {
    fn resistance(&self) -> f64 {
        *self
    }
}

impl<T: HasResistance + ?Sized> HasResistance for &T {
    fn resistance(&self) -> f64 {
        (**self).resistance()
    }
}

/// Resistor whose actual value is drawn uniformly within its tolerance band
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resistor {
    nominal: f64,
    tolerance: f64,
    value: f64,
}

impl Resistor {
    /// Sample a value uniformly from `[nominal * (1 - tolerance), nominal * (1 + tolerance)]`
    pub fn sample<R: Rng + ?Sized>(nominal: f64, tolerance: f64, rng: &mut R) -> Result<Self> {
        if !nominal.is_finite() {
            return Err(ComponentError::InvalidConfiguration(format!(
                "nominal resistance must be finite, got {}",
                nominal
            )));
        }
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(ComponentError::InvalidConfiguration(format!(
                "tolerance must be a non-negative fraction, got {}",
                tolerance
            )));
        }

        let lower = nominal * (1.0 - tolerance);
        let upper = nominal * (1.0 + tolerance);
        let value = if lower < upper {
            rng.gen_range(lower..=upper)
        } else {
            nominal
        };

        Ok(Self {
            nominal,
            tolerance,
            value,
        })
    }

    /// Sample with the default 5% tolerance
    pub fn with_default_tolerance<R: Rng + ?Sized>(nominal: f64, rng: &mut R) -> Result<Self> {
        Self::sample(nominal, DEFAULT_TOLERANCE, rng)
    }

    pub fn nominal(&self) -> f64 {
        self.nominal
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl HasResistance for Resistor {
    fn resistance(&self) -> f64 {
        self.value
    }
}

/// Equivalent resistance of elements in series
pub fn series_resistance<I>(elements: I) -> f64
where
    I: IntoIterator,
    I::Item: HasResistance,
{
    elements.into_iter().map(|e| e.resistance()).sum()
}

/// Equivalent resistance of elements in parallel
///
/// A zero-ohm branch shorts the whole combination. Infinite branches are open and
/// contribute nothing; if every branch is open (or there are none) the result is
/// infinite.
pub fn parallel_resistance<I>(elements: I) -> f64
where
    I: IntoIterator,
    I::Item: HasResistance,
{
    let mut conductance = 0.0;
    for element in elements {
        let r = element.resistance();
        if r == 0.0 {
            return 0.0;
        }
        if r > 0.0 {
            conductance += 1.0 / r;
        }
    }

    if conductance == 0.0 {
        f64::INFINITY
    } else {
        1.0 / conductance
    }
}
