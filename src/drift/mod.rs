//! Drift
//!
//! Change detectors that watch a scalar signal, usually the 0/1 error of a
//! learner, and report when its distribution changes.
//!
//! # Submodules
//!
//! * `adwin`: Adaptive Windowing with logarithmic bucket compression.

pub mod adwin;

pub use adwin::{Adwin, AdwinConfig};
