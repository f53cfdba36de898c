use crate::data::{Batch, TaskType};
use crate::ensemble::{AdaptiveBagging, EnsembleConfig};
use crate::errors::StreamwiseError;
use crate::evaluation::prequential::{EvaluatorConfig, EvaluatorState, PrequentialEvaluator, StopReason};
use crate::evaluation::report::{CsvReporter, LogReporter, Report, Reporter};
use crate::learner::StreamModel;
use crate::metric::Metric;
use crate::neighbors::knn::{KnnConfig, WindowedKnn};
use crate::stream::{ArrayStream, ConceptDriftStream, DataStream, SeaConfig, SeaGenerator};
use std::cell::RefCell;
use std::io::Write;
use std::rc::Rc;

/// Counts the instances pulled from the wrapped stream.
struct Counting<S> {
    inner: S,
    pulled: usize,
}

/// Inverts the 0/1 labels of the wrapped stream, the concept on the other
/// side of the threshold.
struct Flipped<S> {
    inner: S,
}

macro_rules! delegate_stream {
    () => {
        fn prepare_for_use(&mut self) {
            self.inner.prepare_for_use()
        }
        fn has_more_instances(&self) -> bool {
            self.inner.has_more_instances()
        }
        fn estimated_remaining_instances(&self) -> Option<usize> {
            self.inner.estimated_remaining_instances()
        }
        fn is_restartable(&self) -> bool {
            self.inner.is_restartable()
        }
        fn restart(&mut self) -> Result<(), StreamwiseError> {
            self.inner.restart()
        }
        fn classes(&self) -> Option<Vec<f64>> {
            self.inner.classes()
        }
        fn n_features(&self) -> usize {
            self.inner.n_features()
        }
        fn task(&self) -> TaskType {
            self.inner.task()
        }
        fn info(&self) -> String {
            self.inner.info()
        }
    };
}

impl<S: DataStream> DataStream for Counting<S> {
    delegate_stream!();

    fn next_instance(&mut self, batch_size: usize) -> Batch {
        let batch = self.inner.next_instance(batch_size);
        self.pulled += batch.len();
        batch
    }
}

impl<S: DataStream> DataStream for Flipped<S> {
    delegate_stream!();

    fn next_instance(&mut self, batch_size: usize) -> Batch {
        let mut batch = self.inner.next_instance(batch_size);
        batch.y.iter_mut().for_each(|y| *y = 1.0 - *y);
        batch
    }
}

#[derive(Clone, Default)]
struct Recorder {
    reports: Rc<RefCell<Vec<Report>>>,
}

impl Reporter for Recorder {
    fn report(&mut self, report: &Report) -> Result<(), StreamwiseError> {
        self.reports.borrow_mut().push(report.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn sea(function: usize, seed: u64) -> SeaGenerator {
    SeaGenerator::new(SeaConfig::default().set_classification_function(function).set_seed(seed)).unwrap()
}

fn knn(n_neighbors: usize, max_window_size: usize) -> WindowedKnn {
    WindowedKnn::new(
        KnnConfig::default()
            .set_n_neighbors(n_neighbors)
            .set_max_window_size(max_window_size),
    )
    .unwrap()
}

fn knn_bagging(drift_detection: bool) -> AdaptiveBagging<WindowedKnn> {
    let cfg = EnsembleConfig::default()
        .set_n_estimators(3)
        .set_seed(7)
        .set_drift_detection(drift_detection);
    AdaptiveBagging::new(cfg, knn(5, 500)).unwrap()
}

/// Runs 10,000 instances with the concept flipping at 5,000, returns the
/// windowed accuracy over `[5000, 5500)` and the ensemble.
fn run_threshold_flip(drift_detection: bool) -> (f64, AdaptiveBagging<WindowedKnn>) {
    let mut stream = ConceptDriftStream::new(sea(0, 1), Flipped { inner: sea(0, 2) }, 5000).unwrap();
    stream.prepare_for_use();
    let mut model = knn_bagging(drift_detection);
    let recorder = Recorder::default();
    let cfg = EvaluatorConfig::default()
        .set_pretrain_size(0)
        .set_max_instances(10_000)
        .set_n_wait(500);
    let mut evaluator = PrequentialEvaluator::new(cfg)
        .unwrap()
        .with_reporter(Box::new(recorder.clone()));
    let summary = evaluator.eval(&mut stream, &mut model).unwrap();
    assert_eq!(summary.samples, 10_000);
    assert_eq!(summary.stop_reason, StopReason::MaxInstances);

    let reports = recorder.reports.borrow();
    assert_eq!(reports.len(), 20);
    let after_change = reports
        .iter()
        .find(|r| r.samples == 5500)
        .and_then(|r| r.get(Metric::Accuracy))
        .map(|v| v.windowed)
        .unwrap();
    (after_change, model)
}

#[test]
fn test_adaptive_bagging_recovers_from_threshold_flip() {
    let (baseline, baseline_model) = run_threshold_flip(false);
    let (adaptive, adaptive_model) = run_threshold_flip(true);

    assert_eq!(baseline_model.n_resets(), 0);
    assert!(
        adaptive > baseline + 0.05,
        "adaptive: {}, baseline: {}",
        adaptive,
        baseline
    );
    assert!(adaptive_model
        .reset_log()
        .iter()
        .any(|r| r.sample >= 5000 && r.sample < 5200));
}

#[test]
fn test_max_instances_budget() {
    let mut stream = Counting {
        inner: sea(0, 3),
        pulled: 0,
    };
    let mut model = knn(5, 100);
    let cfg = EvaluatorConfig::default()
        .set_pretrain_size(0)
        .set_batch_size(7)
        .set_max_instances(100)
        .set_max_time(Some(3600.0));
    let mut evaluator = PrequentialEvaluator::new(cfg).unwrap();
    let summary = evaluator.eval(&mut stream, &mut model).unwrap();
    assert_eq!(stream.pulled, 100);
    assert_eq!(summary.samples, 100);
    assert_eq!(summary.stop_reason, StopReason::MaxInstances);
    assert_eq!(evaluator.state(), EvaluatorState::Stopped);
}

#[test]
fn test_pretraining_is_not_scored() {
    let mut stream = Counting {
        inner: sea(1, 4),
        pulled: 0,
    };
    let mut model = knn_bagging(true);
    let cfg = EvaluatorConfig::default()
        .set_pretrain_size(50)
        .set_max_instances(100)
        .set_metrics(vec![Metric::Accuracy, Metric::KappaT]);
    let mut evaluator = PrequentialEvaluator::new(cfg).unwrap();
    let summary = evaluator.eval(&mut stream, &mut model).unwrap();
    assert_eq!(stream.pulled, 150);
    assert_eq!(summary.pretrained, 50);
    assert_eq!(summary.scored, 100);
    assert_eq!(summary.unavailable, 0);
    assert_eq!(evaluator.measurements().map(|m| m.n_scored()), Some(100));
    assert!(summary.correct <= 100);
    assert_eq!(summary.get(Metric::Accuracy), Some(summary.correct as f64 / 100.0));
    assert!(summary.get(Metric::KappaT).is_some());
    assert!(summary.get(Metric::Kappa).is_none());
}

#[test]
fn test_exhausted_stream_stops_gracefully() {
    let rows: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64, (i % 3) as f64]).collect();
    let y: Vec<f64> = (0..30).map(|i| (i % 2) as f64).collect();
    let mut stream = ArrayStream::new(Batch::from_rows(&rows, &y).unwrap(), TaskType::Classification);
    let mut model = knn(3, 10);
    let cfg = EvaluatorConfig::default()
        .set_pretrain_size(0)
        .set_batch_size(4)
        .set_max_instances(100);
    let summary = PrequentialEvaluator::new(cfg)
        .unwrap()
        .with_reporter(Box::new(LogReporter))
        .eval(&mut stream, &mut model)
        .unwrap();
    assert_eq!(summary.samples, 30);
    assert_eq!(summary.stop_reason, StopReason::StreamExhausted);
    // The whole first batch is predicted before anything is learned.
    assert_eq!(summary.unavailable, 4);
    assert_eq!(summary.scored, 26);
}

#[test]
fn test_time_budget() {
    let mut stream = sea(0, 5);
    let mut model = knn(5, 200);
    let cfg = EvaluatorConfig::default()
        .set_max_instances(1_000_000)
        .set_max_time(Some(1e-9));
    let summary = PrequentialEvaluator::new(cfg)
        .unwrap()
        .eval(&mut stream, &mut model)
        .unwrap();
    assert_eq!(summary.stop_reason, StopReason::MaxTime);
    assert!(summary.samples < 1_000_000);
}

struct FailingModel {
    fits: usize,
}

impl StreamModel for FailingModel {
    fn partial_fit(&mut self, batch: &Batch, _classes: Option<&[f64]>) -> Result<(), StreamwiseError> {
        self.fits += 1;
        if self.fits > 3 {
            return Err(StreamwiseError::DimensionMismatch {
                expected: 2,
                found: batch.cols,
            });
        }
        Ok(())
    }

    fn predict(&self, batch: &Batch) -> Result<Vec<Option<f64>>, StreamwiseError> {
        Ok(vec![Some(0.0); batch.len()])
    }

    fn task(&self) -> TaskType {
        TaskType::Classification
    }
}

#[test]
fn test_model_errors_abort_evaluation() {
    let mut stream = sea(0, 6);
    let mut model = FailingModel { fits: 0 };
    let cfg = EvaluatorConfig::default().set_pretrain_size(0).set_max_instances(50);
    let mut evaluator = PrequentialEvaluator::new(cfg).unwrap();
    assert!(matches!(
        evaluator.eval(&mut stream, &mut model),
        Err(StreamwiseError::DimensionMismatch { expected: 2, found: 3 })
    ));
    assert_eq!(model.fits, 4);
    assert_eq!(evaluator.state(), EvaluatorState::Stopped);
    assert!(matches!(
        evaluator.eval(&mut stream, &mut model),
        Err(StreamwiseError::InvalidState(_))
    ));
}

/// Answers only the first instance of every batch.
struct TruncatingModel;

impl StreamModel for TruncatingModel {
    fn partial_fit(&mut self, _batch: &Batch, _classes: Option<&[f64]>) -> Result<(), StreamwiseError> {
        Ok(())
    }

    fn predict(&self, batch: &Batch) -> Result<Vec<Option<f64>>, StreamwiseError> {
        Ok(vec![Some(0.0); batch.len().min(1)])
    }

    fn task(&self) -> TaskType {
        TaskType::Classification
    }
}

#[test]
fn test_short_predictions_abort_evaluation() {
    let mut stream = Counting {
        inner: sea(0, 9),
        pulled: 0,
    };
    let cfg = EvaluatorConfig::default()
        .set_pretrain_size(0)
        .set_batch_size(10)
        .set_max_instances(100);
    let mut evaluator = PrequentialEvaluator::new(cfg).unwrap();
    assert!(matches!(
        evaluator.eval(&mut stream, &mut TruncatingModel),
        Err(StreamwiseError::ShapeMismatch { rows: 10, targets: 1 })
    ));
    assert_eq!(stream.pulled, 10);
    assert_eq!(evaluator.state(), EvaluatorState::Stopped);
}

#[test]
fn test_task_mismatch_is_rejected() {
    let mut stream = sea(0, 7);
    let mut model = WindowedKnn::new(KnnConfig::default().set_task(TaskType::Regression)).unwrap();
    let cfg = EvaluatorConfig::default().set_task(TaskType::Regression);
    let mut evaluator = PrequentialEvaluator::new(cfg).unwrap();
    assert!(matches!(
        evaluator.eval(&mut stream, &mut model),
        Err(StreamwiseError::InvalidParameter(..))
    ));
    assert_eq!(evaluator.state(), EvaluatorState::NotStarted);
    assert!(EvaluatorConfig::default()
        .set_metrics(vec![Metric::MeanAbsoluteError])
        .validate()
        .is_err());
}

#[test]
fn test_regression_evaluation() {
    let rows: Vec<Vec<f64>> = (0..400).map(|i| vec![(i % 20) as f64]).collect();
    let y: Vec<f64> = rows.iter().map(|r| 2.0 * r[0]).collect();
    let mut stream = ArrayStream::new(Batch::from_rows(&rows, &y).unwrap(), TaskType::Regression);
    let mut model = WindowedKnn::new(
        KnnConfig::default()
            .set_n_neighbors(1)
            .set_max_window_size(100)
            .set_task(TaskType::Regression),
    )
    .unwrap();
    let cfg = EvaluatorConfig::default()
        .set_task(TaskType::Regression)
        .set_pretrain_size(20)
        .set_n_wait(50);
    let summary = PrequentialEvaluator::new(cfg)
        .unwrap()
        .eval(&mut stream, &mut model)
        .unwrap();
    assert_eq!(summary.samples, 380);
    assert_eq!(summary.correct, 0);
    assert_eq!(summary.adaptive_accuracy, None);
    // Every value has been seen during pretraining, the nearest neighbor is exact.
    assert_eq!(summary.get(Metric::MeanSquaredError), Some(0.0));
    assert_eq!(summary.get(Metric::MeanAbsoluteError), Some(0.0));
}

#[test]
fn test_csv_reports() {
    let buffer = SharedBuffer::default();
    let mut stream = sea(2, 8);
    let mut model = knn(5, 100);
    let cfg = EvaluatorConfig::default()
        .set_pretrain_size(10)
        .set_max_instances(100)
        .set_n_wait(25);
    PrequentialEvaluator::new(cfg)
        .unwrap()
        .with_reporter(Box::new(CsvReporter::new(buffer.clone())))
        .eval(&mut stream, &mut model)
        .unwrap();
    let out = String::from_utf8(buffer.0.borrow().clone()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(
        lines[0],
        "samples,elapsed,accuracy_cumulative,accuracy_windowed,kappa_cumulative,kappa_windowed"
    );
    assert!(lines[4].starts_with("100,"));
}
