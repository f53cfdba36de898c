//! Measurements
//!
//! Incremental performance statistics. Every tracker can be cumulative or
//! restricted to a sliding window of the most recent results.
use crate::constants::ADWIN_DELTA;
use crate::data::TaskType;
use crate::drift::adwin::Adwin;
use crate::errors::StreamwiseError;
use crate::metric::{chance_agreement, kappa_statistic, Metric};
use hashbrown::HashMap;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy)]
struct ClassificationRecord {
    y: usize,
    prediction: usize,
    correct: bool,
    no_change_correct: bool,
}

/// Accuracy, Cohen's kappa and kappa-t from a running confusion count.
#[derive(Debug, Clone)]
pub struct ClassificationMeasurements {
    window: Option<usize>,
    records: VecDeque<ClassificationRecord>,
    class_index: HashMap<u64, usize>,
    true_counts: Vec<f64>,
    pred_counts: Vec<f64>,
    n: usize,
    n_correct: usize,
    n_no_change_correct: usize,
    last_true: Option<f64>,
}

impl ClassificationMeasurements {
    /// * `window` - Number of most recent results to keep, `None` for all of them.
    pub fn new(window: Option<usize>) -> Self {
        ClassificationMeasurements {
            window,
            records: VecDeque::new(),
            class_index: HashMap::new(),
            true_counts: Vec::new(),
            pred_counts: Vec::new(),
            n: 0,
            n_correct: 0,
            n_no_change_correct: 0,
            last_true: None,
        }
    }

    fn index(&mut self, label: f64) -> usize {
        let next = self.class_index.len();
        let idx = *self.class_index.entry((label + 0.0).to_bits()).or_insert(next);
        if idx == self.true_counts.len() {
            self.true_counts.push(0.0);
            self.pred_counts.push(0.0);
        }
        idx
    }

    pub fn add_result(&mut self, y: f64, prediction: f64) {
        let record = ClassificationRecord {
            y: self.index(y),
            prediction: self.index(prediction),
            correct: y == prediction,
            no_change_correct: self.last_true == Some(y),
        };
        self.last_true = Some(y);

        if let Some(w) = self.window {
            if self.records.len() == w {
                if let Some(old) = self.records.pop_front() {
                    self.remove(old);
                }
            }
            self.records.push_back(record);
        }
        self.n += 1;
        self.true_counts[record.y] += 1.0;
        self.pred_counts[record.prediction] += 1.0;
        self.n_correct += record.correct as usize;
        self.n_no_change_correct += record.no_change_correct as usize;
    }

    fn remove(&mut self, record: ClassificationRecord) {
        self.n -= 1;
        self.true_counts[record.y] -= 1.0;
        self.pred_counts[record.prediction] -= 1.0;
        self.n_correct -= record.correct as usize;
        self.n_no_change_correct -= record.no_change_correct as usize;
    }

    pub fn n_samples(&self) -> usize {
        self.n
    }

    pub fn n_correct(&self) -> usize {
        self.n_correct
    }

    pub fn accuracy(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.n_correct as f64 / self.n as f64
        }
    }

    pub fn kappa(&self) -> f64 {
        let pe = chance_agreement(&self.true_counts, &self.pred_counts, self.n as f64);
        kappa_statistic(self.accuracy(), pe)
    }

    /// Kappa against a classifier that always predicts the previous true label.
    pub fn kappa_t(&self) -> f64 {
        if self.n == 0 {
            return kappa_statistic(0.0, 0.0);
        }
        kappa_statistic(self.accuracy(), self.n_no_change_correct as f64 / self.n as f64)
    }

    pub fn reset(&mut self) {
        *self = ClassificationMeasurements::new(self.window);
    }
}

/// Mean squared and mean absolute error.
#[derive(Debug, Clone)]
pub struct RegressionMeasurements {
    window: Option<usize>,
    records: VecDeque<(f64, f64)>,
    n: usize,
    sum_squared: f64,
    sum_absolute: f64,
}

impl RegressionMeasurements {
    pub fn new(window: Option<usize>) -> Self {
        RegressionMeasurements {
            window,
            records: VecDeque::new(),
            n: 0,
            sum_squared: 0.0,
            sum_absolute: 0.0,
        }
    }

    pub fn add_result(&mut self, y: f64, prediction: f64) {
        let error = y - prediction;
        let record = (error * error, error.abs());
        if let Some(w) = self.window {
            if self.records.len() == w {
                if let Some((sq, abs)) = self.records.pop_front() {
                    self.n -= 1;
                    self.sum_squared -= sq;
                    self.sum_absolute -= abs;
                }
            }
            self.records.push_back(record);
        }
        self.n += 1;
        self.sum_squared += record.0;
        self.sum_absolute += record.1;
    }

    pub fn n_samples(&self) -> usize {
        self.n
    }

    pub fn mean_squared_error(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.sum_squared / self.n as f64
        }
    }

    pub fn mean_absolute_error(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.sum_absolute / self.n as f64
        }
    }

    pub fn reset(&mut self) {
        *self = RegressionMeasurements::new(self.window);
    }
}

/// One tracker per task.
#[derive(Debug, Clone)]
pub enum Scores {
    Classification(ClassificationMeasurements),
    Regression(RegressionMeasurements),
}

impl Scores {
    pub fn new(task: TaskType, window: Option<usize>) -> Self {
        match task {
            TaskType::Classification => Scores::Classification(ClassificationMeasurements::new(window)),
            TaskType::Regression => Scores::Regression(RegressionMeasurements::new(window)),
        }
    }

    pub fn add_result(&mut self, y: f64, prediction: f64) {
        match self {
            Scores::Classification(m) => m.add_result(y, prediction),
            Scores::Regression(m) => m.add_result(y, prediction),
        }
    }

    pub fn n_samples(&self) -> usize {
        match self {
            Scores::Classification(m) => m.n_samples(),
            Scores::Regression(m) => m.n_samples(),
        }
    }

    /// Value of a metric, `None` when the metric does not apply to the task.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        match (self, metric) {
            (Scores::Classification(m), Metric::Accuracy) => Some(m.accuracy()),
            (Scores::Classification(m), Metric::Kappa) => Some(m.kappa()),
            (Scores::Classification(m), Metric::KappaT) => Some(m.kappa_t()),
            (Scores::Regression(m), Metric::MeanSquaredError) => Some(m.mean_squared_error()),
            (Scores::Regression(m), Metric::MeanAbsoluteError) => Some(m.mean_absolute_error()),
            _ => None,
        }
    }
}

/// Everything the prequential evaluator tracks about a model.
#[derive(Debug, Clone)]
pub struct Measurements {
    task: TaskType,
    cumulative: Scores,
    windowed: Scores,
    /// Drift adaptive accuracy, fed 1 for a correct prediction and 0 otherwise.
    adaptive: Adwin,
    n_unavailable: usize,
}

impl Measurements {
    /// * `task` - Selects the statistics that are kept.
    /// * `window` - Length of the sliding window of the windowed statistics.
    pub fn new(task: TaskType, window: usize) -> Result<Self, StreamwiseError> {
        Ok(Measurements {
            task,
            cumulative: Scores::new(task, None),
            windowed: Scores::new(task, Some(window)),
            adaptive: Adwin::new(ADWIN_DELTA)?,
            n_unavailable: 0,
        })
    }

    /// Score a single prediction. Unavailable predictions are counted but
    /// neither right nor wrong.
    pub fn add_result(&mut self, y: f64, prediction: Option<f64>) {
        match prediction {
            None => self.n_unavailable += 1,
            Some(p) => {
                self.cumulative.add_result(y, p);
                self.windowed.add_result(y, p);
                if self.task == TaskType::Classification {
                    self.adaptive.add_element(if p == y { 1.0 } else { 0.0 });
                }
            }
        }
    }

    /// Every sample passed to [`Measurements::add_result`].
    pub fn n_samples(&self) -> usize {
        self.n_scored() + self.n_unavailable
    }

    pub fn n_scored(&self) -> usize {
        self.cumulative.n_samples()
    }

    pub fn n_unavailable(&self) -> usize {
        self.n_unavailable
    }

    pub fn n_correct(&self) -> usize {
        match &self.cumulative {
            Scores::Classification(m) => m.n_correct(),
            Scores::Regression(_) => 0,
        }
    }

    pub fn cumulative(&self) -> &Scores {
        &self.cumulative
    }

    pub fn windowed(&self) -> &Scores {
        &self.windowed
    }

    /// ADWIN estimate of the current accuracy, `None` for regression or before any score.
    pub fn adaptive_accuracy(&self) -> Option<f64> {
        if self.task == TaskType::Classification && self.adaptive.width() > 0 {
            Some(self.adaptive.estimate())
        } else {
            None
        }
    }
}
