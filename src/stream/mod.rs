//! Stream
//!
//! Sources of labelled instances. A stream hands out ordered batches and says
//! whether more data is coming, evaluators pull from it until it runs dry or a
//! budget is spent.
//!
//! # Submodules
//!
//! * `sea`: The SEA generator with abrupt concepts decided by a threshold.
//! * `array`: A finite stream over instances held in memory.
//! * `concept_drift`: Switches from one stream to another at a given position.

pub mod array;
pub mod concept_drift;
pub mod sea;

pub use array::ArrayStream;
pub use concept_drift::ConceptDriftStream;
pub use sea::{SeaConfig, SeaGenerator};

use crate::data::{Batch, TaskType};
use crate::errors::StreamwiseError;

/// A restartable source of labelled instances.
pub trait DataStream {
    /// Initialise the stream, or bring it back to its first instance. Idempotent.
    fn prepare_for_use(&mut self);

    /// Pull up to `batch_size` instances. Fewer are returned only when the
    /// stream runs out.
    fn next_instance(&mut self, batch_size: usize) -> Batch;

    fn has_more_instances(&self) -> bool;

    /// Number of instances left, `None` for unbounded streams.
    fn estimated_remaining_instances(&self) -> Option<usize>;

    fn is_restartable(&self) -> bool;

    /// Go back to the first instance.
    fn restart(&mut self) -> Result<(), StreamwiseError>;

    /// The class labels of a classification stream.
    fn classes(&self) -> Option<Vec<f64>>;

    fn n_features(&self) -> usize;

    fn task(&self) -> TaskType;

    /// Short description of the stream and its settings.
    fn info(&self) -> String;
}

impl<S: DataStream + ?Sized> DataStream for Box<S> {
    fn prepare_for_use(&mut self) {
        (**self).prepare_for_use()
    }
    fn next_instance(&mut self, batch_size: usize) -> Batch {
        (**self).next_instance(batch_size)
    }
    fn has_more_instances(&self) -> bool {
        (**self).has_more_instances()
    }
    fn estimated_remaining_instances(&self) -> Option<usize> {
        (**self).estimated_remaining_instances()
    }
    fn is_restartable(&self) -> bool {
        (**self).is_restartable()
    }
    fn restart(&mut self) -> Result<(), StreamwiseError> {
        (**self).restart()
    }
    fn classes(&self) -> Option<Vec<f64>> {
        (**self).classes()
    }
    fn n_features(&self) -> usize {
        (**self).n_features()
    }
    fn task(&self) -> TaskType {
        (**self).task()
    }
    fn info(&self) -> String {
        (**self).info()
    }
}
