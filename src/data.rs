//! Data
//!
//! Containers for the instances that flow from a stream into the learners.
use crate::errors::StreamwiseError;
use crate::utils::items_to_strings;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The kind of target a learner predicts.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskType {
    /// Targets are class labels, predictions are majority votes.
    #[default]
    Classification,
    /// Targets are real values, predictions are means.
    Regression,
}

impl FromStr for TaskType {
    type Err = StreamwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classification" | "Classification" => Ok(TaskType::Classification),
            "regression" | "Regression" => Ok(TaskType::Regression),
            _ => Err(StreamwiseError::ParseString(
                s.to_string(),
                "TaskType".to_string(),
                items_to_strings(vec!["classification", "regression"]),
            )),
        }
    }
}

/// Contiguous Row Major batch of instances.
///
/// Rows are the feature vectors of the instances, stored one after the other
/// in a single buffer, with a single target value per row. Class labels are
/// encoded as `f64` (`0.0`, `1.0`, ...). Once produced by a stream a batch is
/// never mutated by the learners, they only borrow rows from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Batch {
    /// The raw feature values, `rows * cols` long.
    pub data: Vec<f64>,
    /// One target per row.
    pub y: Vec<f64>,
    /// Number of features of every row.
    pub cols: usize,
}

impl Batch {
    /// Create a new Batch.
    ///
    /// * `data` - Row major feature values.
    /// * `y` - Targets, one per row.
    /// * `cols` - Number of features per row.
    pub fn new(data: Vec<f64>, y: Vec<f64>, cols: usize) -> Result<Self, StreamwiseError> {
        let rows = if cols == 0 { 0 } else { data.len() / cols };
        if cols == 0 || data.len() % cols != 0 {
            return Err(StreamwiseError::DimensionMismatch {
                expected: cols,
                found: data.len(),
            });
        }
        if rows != y.len() {
            return Err(StreamwiseError::ShapeMismatch { rows, targets: y.len() });
        }
        Ok(Batch { data, y, cols })
    }

    /// Create an empty batch for rows with `cols` features.
    pub fn empty(cols: usize) -> Self {
        Batch {
            data: Vec::new(),
            y: Vec::new(),
            cols,
        }
    }

    /// Build a batch from a list of rows.
    pub fn from_rows(rows: &[Vec<f64>], y: &[f64]) -> Result<Self, StreamwiseError> {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let mut batch = Batch::empty(cols);
        if rows.len() != y.len() {
            return Err(StreamwiseError::ShapeMismatch {
                rows: rows.len(),
                targets: y.len(),
            });
        }
        for (row, target) in rows.iter().zip(y) {
            batch.push(row, *target)?;
        }
        Ok(batch)
    }

    /// Append a single instance.
    pub fn push(&mut self, x: &[f64], y: f64) -> Result<(), StreamwiseError> {
        if x.len() != self.cols {
            return Err(StreamwiseError::DimensionMismatch {
                expected: self.cols,
                found: x.len(),
            });
        }
        self.data.extend_from_slice(x);
        self.y.push(y);
        Ok(())
    }

    /// Number of instances in the batch.
    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Get the features of the ith instance.
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterate over (features, target) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&[f64], f64)> + '_ {
        self.data.chunks_exact(self.cols.max(1)).zip(self.y.iter().copied())
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_rows() {
        let batch = Batch::new(vec![1., 2., 3., 4., 5., 6.], vec![0., 1.], 3).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.row(0), &[1., 2., 3.]);
        assert_eq!(batch.row(1), &[4., 5., 6.]);
        let rows: Vec<(&[f64], f64)> = batch.iter().collect();
        assert_eq!(rows[1], (&[4., 5., 6.][..], 1.));
    }

    #[test]
    fn test_batch_shape_errors() {
        assert!(matches!(
            Batch::new(vec![1., 2., 3.], vec![0.], 2),
            Err(StreamwiseError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            Batch::new(vec![1., 2.], vec![0., 1.], 2),
            Err(StreamwiseError::ShapeMismatch { rows: 1, targets: 2 })
        ));
        let mut batch = Batch::empty(2);
        assert!(batch.push(&[1., 2., 3.], 0.).is_err());
        assert!(batch.is_empty());
    }

    #[test]
    fn test_task_type_from_str() {
        assert_eq!("regression".parse::<TaskType>().unwrap(), TaskType::Regression);
        assert!("clustering".parse::<TaskType>().is_err());
    }
}
