//! Neighbors
//!
//! Lazy learners that keep a bounded window of the most recent instances and
//! predict from the nearest ones.
//!
//! # Submodules
//!
//! * `window`: Fixed capacity FIFO buffer of labelled instances.
//! * `knn`: Windowed k-nearest-neighbors classifier and regressor.
//! * `knn_adwin`: Windowed KNN that shrinks its window when its own error drifts.

pub mod knn;
pub mod knn_adwin;
pub mod window;

pub use knn::{DistanceMetric, KnnConfig, WindowedKnn};
pub use knn_adwin::KnnAdwin;
pub use window::InstanceWindow;
