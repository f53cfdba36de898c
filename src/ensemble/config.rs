//! Ensemble Configuration
//!
//! Defines the configuration of [`AdaptiveBagging`](crate::ensemble::AdaptiveBagging)
//! and the JSON IO used for every configuration struct of the crate.
use crate::constants::{N_ESTIMATORS, POISSON_LAMBDA};
use crate::drift::adwin::AdwinConfig;
use crate::errors::StreamwiseError;
use crate::neighbors::knn::KnnConfig;
use crate::utils::validate_positive_usize_parameter;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_n_estimators() -> usize {
    N_ESTIMATORS
}
fn default_drift_detection() -> bool {
    true
}
fn default_lambda() -> f64 {
    POISSON_LAMBDA
}

/// Configuration for the `AdaptiveBagging` ensemble.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnsembleConfig {
    /// Number of members.
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    /// Detector settings used for every member.
    #[serde(default)]
    pub adwin: AdwinConfig,
    /// Track member errors with ADWIN and reset members on drift.
    #[serde(default = "default_drift_detection")]
    pub drift_detection: bool,
    /// Rate of the Poisson distribution of the bagging weights.
    #[serde(default = "default_lambda")]
    pub lambda: f64,
    /// Seed for random number generation, member `i` uses `seed + i`.
    #[serde(default)]
    pub seed: u64,
    /// Process the members of the ensemble in parallel.
    #[serde(default)]
    pub parallel: bool,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        EnsembleConfig {
            n_estimators: N_ESTIMATORS,
            adwin: AdwinConfig::default(),
            drift_detection: true,
            lambda: POISSON_LAMBDA,
            seed: 0,
            parallel: false,
        }
    }
}

impl EnsembleConfig {
    pub fn validate(&self) -> Result<(), StreamwiseError> {
        validate_positive_usize_parameter(self.n_estimators, "n_estimators")?;
        self.adwin.validate()?;
        if self.lambda.is_nan() || self.lambda <= 0.0 {
            return Err(StreamwiseError::InvalidParameter(
                "lambda".to_string(),
                "a positive rate".to_string(),
                self.lambda.to_string(),
            ));
        }
        Ok(())
    }

    pub fn set_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    pub fn set_delta(mut self, delta: f64) -> Self {
        self.adwin.delta = delta;
        self
    }

    pub fn set_drift_detection(mut self, drift_detection: bool) -> Self {
        self.drift_detection = drift_detection;
        self
    }

    pub fn set_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn set_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// IO
pub trait ConfigIO: Serialize + DeserializeOwned + Sized {
    /// Save a config as a json object to a file.
    ///
    /// * `path` - Path to save the config.
    fn save_config<P: AsRef<Path>>(&self, path: P) -> Result<(), StreamwiseError> {
        fs::write(path, self.json_dump()?).map_err(|e| StreamwiseError::UnableToWrite(e.to_string()))
    }

    /// Dump a config as a json object
    fn json_dump(&self) -> Result<String, StreamwiseError> {
        serde_json::to_string(self).map_err(|e| StreamwiseError::UnableToWrite(e.to_string()))
    }

    /// Load a config from Json string
    ///
    /// * `json_str` - String object, which can be serialized to json.
    fn from_json(json_str: &str) -> Result<Self, StreamwiseError> {
        serde_json::from_str::<Self>(json_str).map_err(|e| StreamwiseError::UnableToRead(e.to_string()))
    }

    /// Load a config from a path to a json object.
    ///
    /// * `path` - Path to load the config from.
    fn load_config<P: AsRef<Path>>(path: P) -> Result<Self, StreamwiseError> {
        let json_str = fs::read_to_string(path).map_err(|e| StreamwiseError::UnableToRead(e.to_string()))?;
        Self::from_json(&json_str)
    }
}

impl ConfigIO for EnsembleConfig {}
impl ConfigIO for AdwinConfig {}
impl ConfigIO for KnnConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_ensemble_config_default() {
        let config = EnsembleConfig::default();
        assert_eq!(config.n_estimators, 10);
        assert_eq!(config.lambda, 1.0);
        assert!(config.drift_detection);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ensemble_config_validation() {
        assert!(EnsembleConfig::default().set_n_estimators(0).validate().is_err());
        assert!(EnsembleConfig::default().set_delta(0.0).validate().is_err());
        assert!(EnsembleConfig::default().set_lambda(-1.0).validate().is_err());
    }

    #[test]
    fn test_config_io_json() {
        let config = EnsembleConfig::default().set_n_estimators(3).set_seed(11);
        let json = config.json_dump().unwrap();
        let config2 = EnsembleConfig::from_json(&json).unwrap();
        assert_eq!(config, config2);
    }

    #[test]
    fn test_config_io_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("knn.json");
        let config = KnnConfig::default().set_n_neighbors(8).set_max_window_size(2000);
        config.save_config(&file_path).unwrap();
        let config2 = KnnConfig::load_config(&file_path).unwrap();
        assert_eq!(config, config2);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let json = r#"{"n_estimators": 3, "ensemble_length": 2}"#;
        assert!(matches!(
            EnsembleConfig::from_json(json),
            Err(StreamwiseError::UnableToRead(_))
        ));
        let partial = EnsembleConfig::from_json(r#"{"n_estimators": 3, "adwin": {"delta": 0.01}}"#).unwrap();
        assert_eq!(partial.n_estimators, 3);
        assert_eq!(partial.adwin.delta, 0.01);
        assert_eq!(partial.lambda, 1.0);
    }
}
