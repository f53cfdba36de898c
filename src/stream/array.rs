use crate::data::{Batch, TaskType};
use crate::errors::StreamwiseError;
use crate::stream::DataStream;

/// A finite stream over instances held in memory.
#[derive(Debug, Clone)]
pub struct ArrayStream {
    data: Batch,
    task: TaskType,
    classes: Option<Vec<f64>>,
    position: usize,
}

impl ArrayStream {
    /// Create a stream that replays `data` in order.
    ///
    /// For classification the classes are the distinct targets, sorted.
    pub fn new(data: Batch, task: TaskType) -> Self {
        let classes = match task {
            TaskType::Classification => {
                let mut classes = data.y.clone();
                classes.sort_by(|a, b| a.total_cmp(b));
                classes.dedup();
                Some(classes)
            }
            TaskType::Regression => None,
        };
        ArrayStream {
            data,
            task,
            classes,
            position: 0,
        }
    }

    /// Declare the classes instead of inferring them from the targets.
    pub fn with_classes(mut self, classes: Vec<f64>) -> Self {
        self.classes = Some(classes);
        self
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

impl DataStream for ArrayStream {
    fn prepare_for_use(&mut self) {
        self.position = 0;
    }

    fn next_instance(&mut self, batch_size: usize) -> Batch {
        let end = (self.position + batch_size).min(self.data.len());
        let cols = self.data.cols;
        let batch = Batch {
            data: self.data.data[self.position * cols..end * cols].to_vec(),
            y: self.data.y[self.position..end].to_vec(),
            cols,
        };
        self.position = end;
        batch
    }

    fn has_more_instances(&self) -> bool {
        self.position < self.data.len()
    }

    fn estimated_remaining_instances(&self) -> Option<usize> {
        Some(self.data.len() - self.position)
    }

    fn is_restartable(&self) -> bool {
        true
    }

    fn restart(&mut self) -> Result<(), StreamwiseError> {
        self.position = 0;
        Ok(())
    }

    fn classes(&self) -> Option<Vec<f64>> {
        self.classes.clone()
    }

    fn n_features(&self) -> usize {
        self.data.cols
    }

    fn task(&self) -> TaskType {
        self.task
    }

    fn info(&self) -> String {
        format!(
            "ArrayStream: n_samples: {} - n_features: {} - task: {:?}",
            self.data.len(),
            self.data.cols,
            self.task
        )
    }
}
