//! SEA Generator
//!
//! The streaming ensemble algorithm benchmark of Street and Kim. Three features
//! are drawn uniformly from `[0, 10)`, only the first two are relevant: an
//! instance is of class `1` when their sum exceeds the threshold of the active
//! classification function, `0` otherwise. Switching the function switches the
//! concept abruptly.
use crate::data::{Batch, TaskType};
use crate::ensemble::config::ConfigIO;
use crate::errors::StreamwiseError;
use crate::stream::DataStream;
use crate::utils::validate_float_parameter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Thresholds of the four classification functions.
pub const SEA_THRESHOLDS: [f64; 4] = [8.0, 9.0, 7.0, 9.5];
const N_FEATURES: usize = 3;

fn default_seed() -> u64 {
    42
}

/// Configuration for [`SeaGenerator`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeaConfig {
    /// Index of the classification function, 0 to 3.
    #[serde(default)]
    pub classification_function: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Alternate the classes so that their distribution is uniform.
    #[serde(default)]
    pub balance_classes: bool,
    /// Probability of flipping the label of an instance.
    #[serde(default)]
    pub noise_percentage: f64,
}

impl Default for SeaConfig {
    fn default() -> Self {
        SeaConfig {
            classification_function: 0,
            seed: 42,
            balance_classes: false,
            noise_percentage: 0.0,
        }
    }
}

impl SeaConfig {
    pub fn validate(&self) -> Result<(), StreamwiseError> {
        if self.classification_function >= SEA_THRESHOLDS.len() {
            return Err(StreamwiseError::InvalidParameter(
                "classification_function".to_string(),
                "an integer from 0 to 3".to_string(),
                self.classification_function.to_string(),
            ));
        }
        validate_float_parameter(self.noise_percentage, 0.0, 1.0, "noise_percentage")
    }

    pub fn set_classification_function(mut self, classification_function: usize) -> Self {
        self.classification_function = classification_function;
        self
    }

    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn set_balance_classes(mut self, balance_classes: bool) -> Self {
        self.balance_classes = balance_classes;
        self
    }

    pub fn set_noise_percentage(mut self, noise_percentage: f64) -> Self {
        self.noise_percentage = noise_percentage;
        self
    }
}

impl ConfigIO for SeaConfig {}

#[derive(Debug, Clone)]
pub struct SeaGenerator {
    cfg: SeaConfig,
    function: usize,
    rng: StdRng,
    next_class_should_be_zero: bool,
    n_generated: usize,
}

impl SeaGenerator {
    pub fn new(cfg: SeaConfig) -> Result<Self, StreamwiseError> {
        cfg.validate()?;
        Ok(SeaGenerator {
            function: cfg.classification_function,
            rng: StdRng::seed_from_u64(cfg.seed),
            cfg,
            next_class_should_be_zero: false,
            n_generated: 0,
        })
    }

    pub fn config(&self) -> &SeaConfig {
        &self.cfg
    }

    /// Index of the active classification function.
    pub fn classification_function(&self) -> usize {
        self.function
    }

    pub fn set_classification_function(&mut self, function: usize) -> Result<(), StreamwiseError> {
        self.cfg.set_classification_function(function).validate()?;
        self.function = function;
        Ok(())
    }

    /// Switch to a different, randomly chosen classification function.
    pub fn generate_drift(&mut self) {
        let mut function = self.rng.random_range(0..SEA_THRESHOLDS.len());
        while function == self.function {
            function = self.rng.random_range(0..SEA_THRESHOLDS.len());
        }
        self.function = function;
    }

    pub fn n_generated(&self) -> usize {
        self.n_generated
    }

    fn classify(&self, att1: f64, att2: f64) -> f64 {
        if att1 + att2 <= SEA_THRESHOLDS[self.function] {
            0.0
        } else {
            1.0
        }
    }

    fn sample(&mut self) -> ([f64; N_FEATURES], f64) {
        loop {
            let x = [
                10.0 * self.rng.random::<f64>(),
                10.0 * self.rng.random::<f64>(),
                10.0 * self.rng.random::<f64>(),
            ];
            let group = self.classify(x[0], x[1]);
            if !self.cfg.balance_classes {
                return (x, group);
            }
            let wanted = if self.next_class_should_be_zero { 0.0 } else { 1.0 };
            if group == wanted {
                self.next_class_should_be_zero = !self.next_class_should_be_zero;
                return (x, group);
            }
        }
    }
}

impl DataStream for SeaGenerator {
    fn prepare_for_use(&mut self) {
        // Infallible for a generator.
        let _ = self.restart();
    }

    fn next_instance(&mut self, batch_size: usize) -> Batch {
        let mut batch = Batch::empty(N_FEATURES);
        batch.data.reserve(batch_size * N_FEATURES);
        batch.y.reserve(batch_size);
        for _ in 0..batch_size {
            let (x, mut group) = self.sample();
            if 0.01 + self.rng.random::<f64>() <= self.cfg.noise_percentage {
                group = 1.0 - group;
            }
            batch.data.extend_from_slice(&x);
            batch.y.push(group);
        }
        self.n_generated += batch_size;
        batch
    }

    fn has_more_instances(&self) -> bool {
        true
    }

    fn estimated_remaining_instances(&self) -> Option<usize> {
        None
    }

    fn is_restartable(&self) -> bool {
        true
    }

    fn restart(&mut self) -> Result<(), StreamwiseError> {
        self.rng = StdRng::seed_from_u64(self.cfg.seed);
        self.function = self.cfg.classification_function;
        self.next_class_should_be_zero = false;
        self.n_generated = 0;
        Ok(())
    }

    fn classes(&self) -> Option<Vec<f64>> {
        Some(vec![0.0, 1.0])
    }

    fn n_features(&self) -> usize {
        N_FEATURES
    }

    fn task(&self) -> TaskType {
        TaskType::Classification
    }

    fn info(&self) -> String {
        format!(
            "SeaGenerator: classification_function: {} - seed: {} - balance_classes: {} - noise_percentage: {}",
            self.function, self.cfg.seed, self.cfg.balance_classes, self.cfg.noise_percentage
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sea_labels_follow_threshold() {
        let mut stream = SeaGenerator::new(SeaConfig::default().set_classification_function(2)).unwrap();
        stream.prepare_for_use();
        let batch = stream.next_instance(500);
        assert_eq!(batch.len(), 500);
        assert_eq!(batch.cols, 3);
        for (x, y) in batch.iter() {
            assert!(x.iter().all(|v| (0.0..10.0).contains(v)));
            assert_eq!(y, if x[0] + x[1] <= 7.0 { 0.0 } else { 1.0 });
        }
    }

    #[test]
    fn test_sea_restart_is_deterministic() {
        let mut stream = SeaGenerator::new(SeaConfig::default().set_seed(112)).unwrap();
        stream.prepare_for_use();
        let first = stream.next_instance(20);
        stream.generate_drift();
        assert_ne!(stream.classification_function(), 0);
        stream.restart().unwrap();
        assert_eq!(stream.classification_function(), 0);
        assert_eq!(stream.next_instance(20), first);
        assert_eq!(stream.estimated_remaining_instances(), None);
        assert!(stream.has_more_instances());
    }

    #[test]
    fn test_sea_balance_and_noise() {
        let cfg = SeaConfig::default().set_balance_classes(true);
        let mut stream = SeaGenerator::new(cfg).unwrap();
        let batch = stream.next_instance(100);
        assert_eq!(batch.y.iter().filter(|y| **y == 1.0).count(), 50);

        let cfg = SeaConfig::default().set_noise_percentage(0.5);
        let mut stream = SeaGenerator::new(cfg).unwrap();
        let batch = stream.next_instance(2000);
        let flipped = batch
            .iter()
            .filter(|(x, y)| *y != if x[0] + x[1] <= 8.0 { 0.0 } else { 1.0 })
            .count();
        assert!(flipped > 800 && flipped < 1200);
    }

    #[test]
    fn test_sea_invalid_config() {
        assert!(SeaGenerator::new(SeaConfig::default().set_classification_function(4)).is_err());
        assert!(SeaGenerator::new(SeaConfig::default().set_noise_percentage(1.5)).is_err());
        let mut stream = SeaGenerator::new(SeaConfig::default()).unwrap();
        assert!(stream.set_classification_function(7).is_err());
        stream.set_classification_function(3).unwrap();
        assert!(stream.info().contains("classification_function: 3"));
    }
}
