// ADWIN
pub const ADWIN_DELTA: f64 = 0.002;
pub const ADWIN_MAX_BUCKETS: usize = 5;
pub const ADWIN_CLOCK: usize = 32;
pub const ADWIN_MIN_WINDOW_LENGTH: usize = 5;
pub const ADWIN_MIN_WINDOW_LONGITUDE: usize = 10;
pub const ADWIN_RANGE: f64 = 1.0;

// Nearest neighbors
pub const KNN_N_NEIGHBORS: usize = 5;
pub const KNN_MAX_WINDOW_SIZE: usize = 1000;

// Ensemble
pub const N_ESTIMATORS: usize = 10;
pub const POISSON_LAMBDA: f64 = 1.0;

// Evaluation
pub const PRETRAIN_SIZE: usize = 200;
pub const BATCH_SIZE: usize = 1;
pub const MAX_INSTANCES: usize = 100_000;
pub const N_WAIT: usize = 200;
pub const PROGRESS_STEPS: usize = 20;
