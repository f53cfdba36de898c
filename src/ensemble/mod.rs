//! Ensemble
//!
//! Online bagging of incremental learners with per-member drift detection.
//!
//! # Submodules
//!
//! * `config`: Ensemble configuration and JSON IO shared by every config struct.
//! * `bagging`: ADWIN driven online bagging.

pub mod bagging;
pub mod config;

pub use bagging::AdaptiveBagging;
pub use config::{ConfigIO, EnsembleConfig};
