//! Prequential Evaluation
//!
//! Test-then-train evaluation of a [`StreamModel`] against a [`DataStream`]:
//! every batch is first predicted and scored, then used for training, so a
//! model is never scored on an instance it has already learned from.
use crate::constants::{BATCH_SIZE, MAX_INSTANCES, N_WAIT, PRETRAIN_SIZE, PROGRESS_STEPS};
use crate::data::TaskType;
use crate::ensemble::config::ConfigIO;
use crate::errors::StreamwiseError;
use crate::evaluation::measurements::Measurements;
use crate::evaluation::report::{MetricValue, Report, Reporter};
use crate::learner::StreamModel;
use crate::metric::Metric;
use crate::stream::DataStream;
use crate::utils::{fmt_vec_output, validate_positive_float_parameter, validate_positive_usize_parameter};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::time::Instant;

fn default_pretrain_size() -> usize {
    PRETRAIN_SIZE
}
fn default_batch_size() -> usize {
    BATCH_SIZE
}
fn default_max_instances() -> usize {
    MAX_INSTANCES
}
fn default_n_wait() -> usize {
    N_WAIT
}

/// Configuration for the [`PrequentialEvaluator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvaluatorConfig {
    /// Instances used to train the model before scoring starts.
    #[serde(default = "default_pretrain_size")]
    pub pretrain_size: usize,
    /// Instances pulled from the stream per iteration.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Scoring budget, pretraining excluded.
    #[serde(default = "default_max_instances")]
    pub max_instances: usize,
    /// Wall clock budget in seconds, checked once per iteration.
    #[serde(default)]
    pub max_time: Option<f64>,
    /// Reporting interval, also the length of the windowed statistics.
    #[serde(default = "default_n_wait")]
    pub n_wait: usize,
    #[serde(default)]
    pub task: TaskType,
    /// Metrics to report, the defaults of the task when `None`.
    #[serde(default)]
    pub metrics: Option<Vec<Metric>>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig {
            pretrain_size: PRETRAIN_SIZE,
            batch_size: BATCH_SIZE,
            max_instances: MAX_INSTANCES,
            max_time: None,
            n_wait: N_WAIT,
            task: TaskType::Classification,
            metrics: None,
        }
    }
}

impl EvaluatorConfig {
    pub fn validate(&self) -> Result<(), StreamwiseError> {
        validate_positive_usize_parameter(self.batch_size, "batch_size")?;
        validate_positive_usize_parameter(self.max_instances, "max_instances")?;
        validate_positive_usize_parameter(self.n_wait, "n_wait")?;
        if let Some(t) = self.max_time {
            validate_positive_float_parameter(t, "max_time")?;
        }
        if let Some(metrics) = &self.metrics {
            if metrics.is_empty() {
                return Err(StreamwiseError::InvalidParameter(
                    "metrics".to_string(),
                    "at least one metric".to_string(),
                    "[]".to_string(),
                ));
            }
            if let Some(m) = metrics.iter().find(|m| m.task() != self.task) {
                return Err(StreamwiseError::InvalidParameter(
                    "metrics".to_string(),
                    format!("a {:?} metric", self.task),
                    m.to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The metrics that are reported.
    pub fn metrics(&self) -> Vec<Metric> {
        self.metrics.clone().unwrap_or_else(|| Metric::defaults(self.task))
    }

    pub fn set_pretrain_size(mut self, pretrain_size: usize) -> Self {
        self.pretrain_size = pretrain_size;
        self
    }

    pub fn set_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn set_max_instances(mut self, max_instances: usize) -> Self {
        self.max_instances = max_instances;
        self
    }

    pub fn set_max_time(mut self, max_time: Option<f64>) -> Self {
        self.max_time = max_time;
        self
    }

    pub fn set_n_wait(mut self, n_wait: usize) -> Self {
        self.n_wait = n_wait;
        self
    }

    pub fn set_task(mut self, task: TaskType) -> Self {
        self.task = task;
        self
    }

    pub fn set_metrics(mut self, metrics: Vec<Metric>) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

impl ConfigIO for EvaluatorConfig {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluatorState {
    NotStarted,
    Running,
    Stopped,
}

/// Why the evaluation loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopReason {
    StreamExhausted,
    MaxInstances,
    MaxTime,
}

/// Final statistics of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationSummary {
    /// Instances used for pretraining.
    pub pretrained: usize,
    /// Instances processed after pretraining, scored or not.
    pub samples: usize,
    pub scored: usize,
    /// Instances the model had no prediction for.
    pub unavailable: usize,
    /// Correct predictions, classification only.
    pub correct: usize,
    pub values: Vec<MetricValue>,
    pub adaptive_accuracy: Option<f64>,
    pub elapsed: f64,
    pub stop_reason: StopReason,
}

impl EvaluationSummary {
    /// Cumulative value of a metric.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.iter().find(|v| v.metric == metric).map(|v| v.cumulative)
    }
}

/// Drives the test-then-train loop and collects the measurements.
pub struct PrequentialEvaluator {
    cfg: EvaluatorConfig,
    metrics: Vec<Metric>,
    state: EvaluatorState,
    measurements: Option<Measurements>,
    reporters: Vec<Box<dyn Reporter>>,
}

impl PrequentialEvaluator {
    pub fn new(cfg: EvaluatorConfig) -> Result<Self, StreamwiseError> {
        cfg.validate()?;
        Ok(PrequentialEvaluator {
            metrics: cfg.metrics(),
            cfg,
            state: EvaluatorState::NotStarted,
            measurements: None,
            reporters: Vec::new(),
        })
    }

    /// Add a sink for the periodic records.
    pub fn with_reporter(mut self, reporter: Box<dyn Reporter>) -> Self {
        self.reporters.push(reporter);
        self
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.cfg
    }

    pub fn state(&self) -> EvaluatorState {
        self.state
    }

    /// Measurements of the current or last evaluation.
    pub fn measurements(&self) -> Option<&Measurements> {
        self.measurements.as_ref()
    }

    /// Evaluate a model on a stream until a budget is spent or the stream runs out.
    ///
    /// The stream is used from its current position. An evaluator runs once,
    /// calling `eval` again returns `InvalidState`. Errors of the model abort
    /// the evaluation and are returned as is.
    ///
    /// * `stream` - Source of the instances.
    /// * `model` - The model to evaluate, it receives the classes of the stream
    ///   on its first `partial_fit`.
    pub fn eval<S, M>(&mut self, stream: &mut S, model: &mut M) -> Result<EvaluationSummary, StreamwiseError>
    where
        S: DataStream + ?Sized,
        M: StreamModel + ?Sized,
    {
        if self.state != EvaluatorState::NotStarted {
            return Err(StreamwiseError::InvalidState(format!(
                "evaluator is {:?}, create a new one to evaluate again",
                self.state
            )));
        }
        for task in [model.task(), stream.task()] {
            if task != self.cfg.task {
                return Err(StreamwiseError::InvalidParameter(
                    "task".to_string(),
                    format!("{:?}", self.cfg.task),
                    format!("{:?}", task),
                ));
            }
        }
        self.state = EvaluatorState::Running;
        let result = self.run(stream, model);
        self.state = EvaluatorState::Stopped;
        result
    }

    fn run<S, M>(&mut self, stream: &mut S, model: &mut M) -> Result<EvaluationSummary, StreamwiseError>
    where
        S: DataStream + ?Sized,
        M: StreamModel + ?Sized,
    {
        let start = Instant::now();
        let max_instances = self.cfg.max_instances;
        let classes = match self.cfg.task {
            TaskType::Classification => stream.classes(),
            TaskType::Regression => None,
        };
        let mut classes_sent = false;
        info!("Prequential evaluation of {}", stream.info());

        let mut pretrained = 0;
        if self.cfg.pretrain_size > 0 && stream.has_more_instances() {
            let batch = stream.next_instance(self.cfg.pretrain_size);
            info!("Pre-training on {} samples.", batch.len());
            model.partial_fit(&batch, classes.as_deref())?;
            classes_sent = true;
            pretrained = batch.len();
        }

        self.measurements = Some(Measurements::new(self.cfg.task, self.cfg.n_wait)?);
        let progress_step = (max_instances / PROGRESS_STEPS).max(1);
        let mut next_progress = progress_step;
        let mut next_report = self.cfg.n_wait;
        let mut last_reported = 0;

        let stop_reason = loop {
            let processed = self.n_processed();
            if processed >= max_instances {
                break StopReason::MaxInstances;
            }
            if !stream.has_more_instances() {
                break StopReason::StreamExhausted;
            }
            if let Some(t) = self.cfg.max_time {
                if start.elapsed().as_secs_f64() >= t {
                    warn!(
                        "Reached time limit after {} of {} samples. Try to increase max_time to evaluate the whole budget.",
                        processed, max_instances
                    );
                    break StopReason::MaxTime;
                }
            }

            let batch = stream.next_instance(self.cfg.batch_size.min(max_instances - processed));
            if batch.is_empty() {
                break StopReason::StreamExhausted;
            }
            let predictions = model.predict(&batch)?;
            if predictions.len() != batch.len() {
                return Err(StreamwiseError::ShapeMismatch {
                    rows: batch.len(),
                    targets: predictions.len(),
                });
            }
            if let Some(m) = self.measurements.as_mut() {
                for ((_, y), p) in batch.iter().zip(predictions) {
                    m.add_result(y, p);
                }
            }
            let fit_classes = if classes_sent { None } else { classes.as_deref() };
            model.partial_fit(&batch, fit_classes)?;
            classes_sent = true;

            let processed = self.n_processed();
            if processed >= next_report {
                self.emit(processed, start.elapsed().as_secs_f64())?;
                last_reported = processed;
                while next_report <= processed {
                    next_report += self.cfg.n_wait;
                }
            }
            if processed >= next_progress {
                info!(
                    "Evaluated {} of {} samples ({:.0}%).",
                    processed,
                    max_instances,
                    100.0 * processed as f64 / max_instances as f64
                );
                while next_progress <= processed {
                    next_progress += progress_step;
                }
            }
        };

        let processed = self.n_processed();
        let elapsed = start.elapsed().as_secs_f64();
        if processed > last_reported {
            self.emit(processed, elapsed)?;
        }
        let summary = self.summarize(pretrained, elapsed, stop_reason);
        let values: Vec<f64> = summary.values.iter().map(|v| v.cumulative).collect();
        let names: Vec<&str> = self.metrics.iter().map(|m| m.name()).collect();
        info!(
            "Finished evaluation of {} samples in {:.2} seconds ({:?}), {}: [{}]",
            summary.samples,
            elapsed,
            stop_reason,
            names.join(", "),
            fmt_vec_output(&values)
        );
        for r in self.reporters.iter_mut() {
            r.finish(&summary)?;
        }
        Ok(summary)
    }

    fn n_processed(&self) -> usize {
        self.measurements.as_ref().map_or(0, |m| m.n_samples())
    }

    fn metric_values(&self) -> Vec<MetricValue> {
        let m = match &self.measurements {
            Some(m) => m,
            None => return Vec::new(),
        };
        self.metrics
            .iter()
            .map(|metric| MetricValue {
                metric: *metric,
                cumulative: m.cumulative().get(*metric).unwrap_or(f64::NAN),
                windowed: m.windowed().get(*metric).unwrap_or(f64::NAN),
            })
            .collect()
    }

    fn emit(&mut self, samples: usize, elapsed: f64) -> Result<(), StreamwiseError> {
        let report = Report {
            samples,
            elapsed,
            values: self.metric_values(),
            adaptive_accuracy: self.measurements.as_ref().and_then(|m| m.adaptive_accuracy()),
        };
        for r in self.reporters.iter_mut() {
            r.report(&report)?;
        }
        Ok(())
    }

    fn summarize(&self, pretrained: usize, elapsed: f64, stop_reason: StopReason) -> EvaluationSummary {
        let m = self.measurements.as_ref();
        EvaluationSummary {
            pretrained,
            samples: m.map_or(0, |m| m.n_samples()),
            scored: m.map_or(0, |m| m.n_scored()),
            unavailable: m.map_or(0, |m| m.n_unavailable()),
            correct: m.map_or(0, |m| m.n_correct()),
            values: self.metric_values(),
            adaptive_accuracy: m.and_then(|m| m.adaptive_accuracy()),
            elapsed,
            stop_reason,
        }
    }
}
