//! Lifetime model for a single part
//!
//! Lifetimes are drawn once from a Weibull distribution and scaled by the part's
//! mean time to failure. The shape parameter selects the failure regime:
//!
//! - `0 < shape < 1`: infant mortality, failures concentrated early
//! - `shape == 1`: constant hazard
//! - `shape > 1`: wear-out, failures concentrated late

use crate::error::{ComponentError, Result};
use rand::Rng;
use rand_distr::{Distribution, Weibull};

/// Default Weibull shape (wear-out)
pub const DEFAULT_SHAPE: f64 = 3.0;

/// Default Weibull scale
pub const DEFAULT_SCALE: f64 = 1.0;

/// A part with a pre-sampled, immutable lifetime in cycles
#[derive(Debug, Clone)]
pub struct FailureModel {
    mttf: f64,
    shape: f64,
    scale: f64,
    lifetime: f64,
}

impl FailureModel {
    /// Sample a lifetime of `mttf * Weibull(scale, shape)`
    pub fn sample<R: Rng + ?Sized>(mttf: f64, shape: f64, scale: f64, rng: &mut R) -> Result<Self> {
        check_positive("mttf", mttf)?;
        check_positive("shape", shape)?;
        check_positive("scale", scale)?;

        let weibull = Weibull::new(scale, shape)
            .map_err(|e| ComponentError::InvalidConfiguration(format!("weibull: {}", e)))?;
        let lifetime = mttf * weibull.sample(rng);

        Ok(Self {
            mttf,
            shape,
            scale,
            lifetime,
        })
    }

    /// Sample with the default wear-out shape and unit scale
    pub fn with_defaults<R: Rng + ?Sized>(mttf: f64, rng: &mut R) -> Result<Self> {
        Self::sample(mttf, DEFAULT_SHAPE, DEFAULT_SCALE, rng)
    }

    /// True once `cycle` has reached the sampled lifetime
    pub fn failed(&self, cycle: f64) -> bool {
        cycle >= self.lifetime
    }

    pub fn lifetime(&self) -> f64 {
        self.lifetime
    }

    pub fn mttf(&self) -> f64 {
        self.mttf
    }

    pub fn shape(&self) -> f64 {
        self.shape
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

fn check_positive(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ComponentError::InvalidConfiguration(format!(
            "{} must be positive and finite, got {}",
            field, value
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_parts(n: usize, shape: f64) -> Vec<FailureModel> {
        let mut rng = StdRng::seed_from_u64(42);
        (0..n)
            .map(|_| FailureModel::sample(15.0, shape, 1.0, &mut rng).unwrap())
            .collect()
    }

    #[test]
    fn test_no_failures_at_t0() {
        for part in sample_parts(20, 3.0) {
            assert!(!part.failed(0.0));
        }
    }

    #[test]
    fn test_all_failed_far_past_mttf() {
        for part in sample_parts(20, 3.0) {
            assert!(part.failed(117.3));
        }
    }

    #[test]
    fn test_failed_is_threshold_on_lifetime() {
        for part in sample_parts(50, 1.5) {
            let t = part.lifetime();
            assert!(!part.failed(t * 0.999));
            assert!(part.failed(t));
            assert!(part.failed(t + 1.0));
            // Repeated queries never re-sample
            assert!(part.failed(t));
            assert_eq!(part.lifetime(), t);
        }
    }

    #[test]
    fn test_wear_out_mean_near_gamma_scaled_mttf() {
        // E[Weibull(1, 3)] = Gamma(4/3) ~= 0.893
        let parts = sample_parts(10_000, 3.0);
        let mean = parts.iter().map(|p| p.lifetime()).sum::<f64>() / parts.len() as f64;
        assert!((mean - 15.0 * 0.893).abs() < 0.5, "mean lifetime {}", mean);
    }

    #[test]
    fn test_infant_mortality_front_loads_failures() {
        let early = |shape: f64| {
            sample_parts(5_000, shape)
                .iter()
                .filter(|p| p.failed(15.0 * 0.1))
                .count()
        };
        assert!(early(0.5) > early(3.0));
    }

    #[test]
    fn test_rejects_non_positive_parameters() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(FailureModel::sample(0.0, 3.0, 1.0, &mut rng).is_err());
        assert!(FailureModel::sample(15.0, -1.0, 1.0, &mut rng).is_err());
        assert!(FailureModel::sample(15.0, 3.0, f64::NAN, &mut rng).is_err());
    }
}
