//! Windowed KNN
//!
//! A k-nearest-neighbors learner whose training set is the bounded window of the
//! most recent instances. Fitting pushes into the window (evicting the oldest
//! instance once full), predicting scans the window with a brute force search.
use crate::constants::{KNN_MAX_WINDOW_SIZE, KNN_N_NEIGHBORS};
use crate::data::TaskType;
use crate::errors::StreamwiseError;
use crate::learner::{impl_stream_model, OnlineLearner};
use crate::neighbors::window::InstanceWindow;
use crate::utils::{check_dimension, items_to_strings, manhattan, squared_euclidean, validate_positive_usize_parameter};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Distance between two feature vectors.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceMetric {
    #[default]
    Euclidean,
    Manhattan,
}

impl DistanceMetric {
    /// A value that orders pairs of points the same way the metric does.
    #[inline]
    fn rank_distance(&self, a: &[f64], b: &[f64]) -> f64 {
        match self {
            // The square root does not change the order.
            DistanceMetric::Euclidean => squared_euclidean(a, b),
            DistanceMetric::Manhattan => manhattan(a, b),
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = StreamwiseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Euclidean" | "euclidean" => Ok(DistanceMetric::Euclidean),
            "Manhattan" | "manhattan" => Ok(DistanceMetric::Manhattan),
            _ => Err(StreamwiseError::ParseString(
                s.to_string(),
                "DistanceMetric".to_string(),
                items_to_strings(vec!["Euclidean", "Manhattan"]),
            )),
        }
    }
}

fn default_n_neighbors() -> usize {
    KNN_N_NEIGHBORS
}
fn default_max_window_size() -> usize {
    KNN_MAX_WINDOW_SIZE
}

/// Configuration for [`WindowedKnn`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KnnConfig {
    /// Number of neighbors consulted per prediction.
    #[serde(default = "default_n_neighbors")]
    pub n_neighbors: usize,
    /// Capacity of the instance window.
    #[serde(default = "default_max_window_size")]
    pub max_window_size: usize,
    #[serde(default)]
    pub metric: DistanceMetric,
    #[serde(default)]
    pub task: TaskType,
}

impl Default for KnnConfig {
    fn default() -> Self {
        KnnConfig {
            n_neighbors: KNN_N_NEIGHBORS,
            max_window_size: KNN_MAX_WINDOW_SIZE,
            metric: DistanceMetric::Euclidean,
            task: TaskType::Classification,
        }
    }
}

impl KnnConfig {
    pub fn validate(&self) -> Result<(), StreamwiseError> {
        validate_positive_usize_parameter(self.n_neighbors, "n_neighbors")?;
        validate_positive_usize_parameter(self.max_window_size, "max_window_size")?;
        Ok(())
    }

    pub fn set_n_neighbors(mut self, n_neighbors: usize) -> Self {
        self.n_neighbors = n_neighbors;
        self
    }

    pub fn set_max_window_size(mut self, max_window_size: usize) -> Self {
        self.max_window_size = max_window_size;
        self
    }

    pub fn set_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn set_task(mut self, task: TaskType) -> Self {
        self.task = task;
        self
    }
}

/// k-nearest-neighbors over a sliding window of recent instances.
#[derive(Debug, Clone)]
pub struct WindowedKnn {
    cfg: KnnConfig,
    window: InstanceWindow,
    n_features: Option<usize>,
}

impl WindowedKnn {
    pub fn new(cfg: KnnConfig) -> Result<Self, StreamwiseError> {
        cfg.validate()?;
        Ok(WindowedKnn {
            window: InstanceWindow::new(cfg.max_window_size),
            cfg,
            n_features: None,
        })
    }

    pub fn config(&self) -> &KnnConfig {
        &self.cfg
    }

    pub fn window(&self) -> &InstanceWindow {
        &self.window
    }

    /// Dimensionality fixed by the first fitted instance.
    pub fn n_features(&self) -> Option<usize> {
        self.n_features
    }

    /// Drop the `n` oldest instances of the window.
    pub fn shrink_window(&mut self, n: usize) {
        self.window.evict_oldest(n);
    }

    /// The `k` nearest window entries as `(distance, label)`, nearest first.
    ///
    /// Entries at the same distance are ordered most recent first. `k` is
    /// clamped to the window size.
    pub fn neighbors(&self, x: &[f64]) -> Result<Vec<(f64, f64)>, StreamwiseError> {
        check_dimension(self.n_features, x)?;
        let k = self.cfg.n_neighbors.min(self.window.len());
        if k == 0 {
            return Ok(Vec::new());
        }
        let mut candidates: Vec<(f64, u64, f64)> = self
            .window
            .iter()
            .map(|e| (self.cfg.metric.rank_distance(&e.x, x), e.seq, e.y))
            .collect();
        let cmp = |a: &(f64, u64, f64), b: &(f64, u64, f64)| a.0.total_cmp(&b.0).then(b.1.cmp(&a.1));
        if k < candidates.len() {
            candidates.select_nth_unstable_by(k - 1, cmp);
            candidates.truncate(k);
        }
        candidates.sort_unstable_by(cmp);
        Ok(candidates.into_iter().map(|(d, _, y)| (d, y)).collect())
    }
}

/// Majority label of neighbors sorted nearest first. A tie goes to the label
/// whose nearest neighbor comes first.
pub(crate) fn majority_vote(labels: impl Iterator<Item = f64>) -> Option<f64> {
    let mut tally: Vec<(f64, usize)> = Vec::new();
    for label in labels {
        match tally.iter_mut().find(|(l, _)| *l == label) {
            Some((_, c)) => *c += 1,
            None => tally.push((label, 1)),
        }
    }
    let mut best: Option<(f64, usize)> = None;
    for (label, count) in tally {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((label, count));
        }
    }
    best.map(|(l, _)| l)
}

impl OnlineLearner for WindowedKnn {
    fn fit_one(&mut self, x: &[f64], y: f64) -> Result<(), StreamwiseError> {
        check_dimension(self.n_features, x)?;
        self.n_features.get_or_insert(x.len());
        self.window.push(x, y);
        Ok(())
    }

    fn predict_one(&self, x: &[f64]) -> Result<Option<f64>, StreamwiseError> {
        let neighbors = self.neighbors(x)?;
        if neighbors.is_empty() {
            return Ok(None);
        }
        let prediction = match self.cfg.task {
            TaskType::Classification => majority_vote(neighbors.iter().map(|(_, y)| *y)),
            TaskType::Regression => Some(neighbors.iter().map(|(_, y)| y).sum::<f64>() / neighbors.len() as f64),
        };
        Ok(prediction)
    }

    fn reset(&mut self) {
        self.window.clear();
    }

    fn is_cold(&self) -> bool {
        self.window.is_empty()
    }

    fn task(&self) -> TaskType {
        self.cfg.task
    }
}

impl_stream_model!(WindowedKnn);
