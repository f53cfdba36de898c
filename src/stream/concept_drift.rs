use crate::data::{Batch, TaskType};
use crate::errors::StreamwiseError;
use crate::stream::DataStream;

/// Abrupt concept drift: instances come from `base` until `position`
/// instances have been produced (or `base` runs out), then from `drift`.
#[derive(Debug, Clone)]
pub struct ConceptDriftStream<A, B> {
    base: A,
    drift: B,
    position: usize,
    n_generated: usize,
}

impl<A: DataStream, B: DataStream> ConceptDriftStream<A, B> {
    pub fn new(base: A, drift: B, position: usize) -> Result<Self, StreamwiseError> {
        if base.n_features() != drift.n_features() {
            return Err(StreamwiseError::DimensionMismatch {
                expected: base.n_features(),
                found: drift.n_features(),
            });
        }
        if base.task() != drift.task() {
            return Err(StreamwiseError::InvalidParameter(
                "drift".to_string(),
                format!("a {:?} stream", base.task()),
                format!("a {:?} stream", drift.task()),
            ));
        }
        Ok(ConceptDriftStream {
            base,
            drift,
            position,
            n_generated: 0,
        })
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn n_generated(&self) -> usize {
        self.n_generated
    }

    fn in_base(&self) -> bool {
        self.n_generated < self.position && self.base.has_more_instances()
    }
}

impl<A: DataStream, B: DataStream> DataStream for ConceptDriftStream<A, B> {
    fn prepare_for_use(&mut self) {
        self.base.prepare_for_use();
        self.drift.prepare_for_use();
        self.n_generated = 0;
    }

    fn next_instance(&mut self, batch_size: usize) -> Batch {
        let mut batch = Batch::empty(self.n_features());
        let mut wanted = batch_size;
        if self.in_base() {
            let head = self.base.next_instance(wanted.min(self.position - self.n_generated));
            wanted -= head.len();
            batch.data.extend(head.data);
            batch.y.extend(head.y);
        }
        if wanted > 0 && self.drift.has_more_instances() {
            let tail = self.drift.next_instance(wanted);
            batch.data.extend(tail.data);
            batch.y.extend(tail.y);
        }
        self.n_generated += batch.len();
        batch
    }

    fn has_more_instances(&self) -> bool {
        self.in_base() || self.drift.has_more_instances()
    }

    fn estimated_remaining_instances(&self) -> Option<usize> {
        let drift = self.drift.estimated_remaining_instances()?;
        if self.in_base() {
            let base = self.base.estimated_remaining_instances()?;
            Some(base.min(self.position - self.n_generated) + drift)
        } else {
            Some(drift)
        }
    }

    fn is_restartable(&self) -> bool {
        self.base.is_restartable() && self.drift.is_restartable()
    }

    fn restart(&mut self) -> Result<(), StreamwiseError> {
        if !self.is_restartable() {
            return Err(StreamwiseError::StreamNotRestartable);
        }
        self.base.restart()?;
        self.drift.restart()?;
        self.n_generated = 0;
        Ok(())
    }

    fn classes(&self) -> Option<Vec<f64>> {
        let mut classes = self.base.classes()?;
        classes.extend(self.drift.classes().unwrap_or_default());
        classes.sort_by(|a, b| a.total_cmp(b));
        classes.dedup();
        Some(classes)
    }

    fn n_features(&self) -> usize {
        self.base.n_features()
    }

    fn task(&self) -> TaskType {
        self.base.task()
    }

    fn info(&self) -> String {
        format!(
            "ConceptDriftStream: position: {} - base: [{}] - drift: [{}]",
            self.position,
            self.base.info(),
            self.drift.info()
        )
    }
}
