//! Learner
//!
//! Capability traits for incremental learners. [`OnlineLearner`] works one
//! instance at a time and is what ensembles are built from, [`StreamModel`]
//! works on whole batches and is what the evaluators drive.
use crate::data::{Batch, TaskType};
use crate::errors::StreamwiseError;

/// A learner whose state is updated one observation at a time.
pub trait OnlineLearner: Send + Sync {
    /// Update the learner with a single labelled instance.
    fn fit_one(&mut self, x: &[f64], y: f64) -> Result<(), StreamwiseError>;

    /// Predict the target of a single instance.
    ///
    /// Returns `Ok(None)` when the learner has nothing to predict from yet.
    fn predict_one(&self, x: &[f64]) -> Result<Option<f64>, StreamwiseError>;

    /// Drop all learned state, keeping the configuration.
    fn reset(&mut self);

    /// A cold learner abstains from predicting.
    fn is_cold(&self) -> bool;

    fn task(&self) -> TaskType;
}

/// A model that can be evaluated prequentially on batches.
pub trait StreamModel {
    /// Update the model with a batch.
    ///
    /// * `batch` - The instances to learn from.
    /// * `classes` - All labels of a classification task, required the first time.
    fn partial_fit(&mut self, batch: &Batch, classes: Option<&[f64]>) -> Result<(), StreamwiseError>;

    /// Predict every instance of a batch, `None` where no prediction is available.
    fn predict(&self, batch: &Batch) -> Result<Vec<Option<f64>>, StreamwiseError>;

    fn task(&self) -> TaskType;
}

/// The loss fed to drift detectors: 0/1 for classification, absolute error
/// capped at 1 for regression.
#[inline]
pub fn error_signal(task: TaskType, prediction: f64, y: f64) -> f64 {
    match task {
        TaskType::Classification => {
            if prediction == y {
                0.0
            } else {
                1.0
            }
        }
        TaskType::Regression => (prediction - y).abs().min(1.0),
    }
}

/// Batch fit for a single learner, instance by instance.
pub(crate) fn fit_rows<L: OnlineLearner + ?Sized>(learner: &mut L, batch: &Batch) -> Result<(), StreamwiseError> {
    for (x, y) in batch.iter() {
        learner.fit_one(x, y)?;
    }
    Ok(())
}

pub(crate) fn predict_rows<L: OnlineLearner + ?Sized>(
    learner: &L,
    batch: &Batch,
) -> Result<Vec<Option<f64>>, StreamwiseError> {
    batch.iter().map(|(x, _)| learner.predict_one(x)).collect()
}

/// Implement [`StreamModel`] for a learner type by fitting and predicting row by row.
macro_rules! impl_stream_model {
    ($learner:ty) => {
        impl $crate::learner::StreamModel for $learner {
            fn partial_fit(
                &mut self,
                batch: &$crate::data::Batch,
                _classes: Option<&[f64]>,
            ) -> Result<(), $crate::errors::StreamwiseError> {
                $crate::learner::fit_rows(self, batch)
            }

            fn predict(
                &self,
                batch: &$crate::data::Batch,
            ) -> Result<Vec<Option<f64>>, $crate::errors::StreamwiseError> {
                $crate::learner::predict_rows(self, batch)
            }

            fn task(&self) -> $crate::data::TaskType {
                $crate::learner::OnlineLearner::task(self)
            }
        }
    };
}

pub(crate) use impl_stream_model;
