//! Sampler
//!
//! Instance weights for online bagging. Instead of materialising a bootstrap
//! sample, every ensemble member draws how many times it trains on each
//! arriving instance.
use crate::errors::StreamwiseError;
use crate::utils::validate_positive_float_parameter;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

// A sampler decides how often a member sees the current instance.
pub trait WeightSampler {
    /// Draw the number of repetitions for the next instance, `0` means skip it.
    fn sample(&mut self, rng: &mut StdRng) -> usize;
}

/// Poisson distributed repetitions, `Poisson(1)` approximates drawing with
/// replacement from a bootstrap of infinite size.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PoissonSampler {
    lambda: f64,
    limit: f64,
}

impl PoissonSampler {
    pub fn new(lambda: f64) -> Result<Self, StreamwiseError> {
        validate_positive_float_parameter(lambda, "lambda")?;
        if lambda == 0.0 {
            return Err(StreamwiseError::InvalidParameter(
                "lambda".to_string(),
                "a positive rate".to_string(),
                lambda.to_string(),
            ));
        }
        Ok(PoissonSampler {
            lambda,
            limit: (-lambda).exp(),
        })
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

impl WeightSampler for PoissonSampler {
    // Knuth's multiplication method, fine for the small rates used in bagging.
    fn sample(&mut self, rng: &mut StdRng) -> usize {
        let mut k = 0;
        let mut p = rng.random::<f64>();
        while p > self.limit {
            k += 1;
            p *= rng.random::<f64>();
        }
        k
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_poisson_sampler_mean() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut sampler = PoissonSampler::new(1.0).unwrap();
        let n = 20_000;
        let draws: Vec<usize> = (0..n).map(|_| sampler.sample(&mut rng)).collect();
        let mean = draws.iter().sum::<usize>() as f64 / n as f64;
        assert!((mean - 1.0).abs() < 0.05);

        // With rate 1 about 36.8% of the instances are skipped.
        let zeros = draws.iter().filter(|k| **k == 0).count() as f64 / n as f64;
        assert!((zeros - (-1.0_f64).exp()).abs() < 0.02);
    }

    #[test]
    fn test_poisson_sampler_seeded() {
        let mut sampler = PoissonSampler::new(1.0).unwrap();
        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        let a: Vec<usize> = (0..100).map(|_| sampler.sample(&mut rng1)).collect();
        let b: Vec<usize> = (0..100).map(|_| sampler.sample(&mut rng2)).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_poisson_sampler_invalid() {
        assert!(PoissonSampler::new(0.0).is_err());
        assert!(PoissonSampler::new(-1.0).is_err());
        assert!(PoissonSampler::new(f64::NAN).is_err());
    }
}
