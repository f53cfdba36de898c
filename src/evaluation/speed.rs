use crate::errors::StreamwiseError;
use crate::evaluation::prequential::StopReason;
use crate::stream::DataStream;
use crate::utils::{validate_positive_float_parameter, validate_positive_usize_parameter};
use log::{info, warn};
use serde::Serialize;
use std::time::Instant;

/// Throughput of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedReport {
    pub samples: usize,
    pub elapsed: f64,
    pub samples_per_second: f64,
    pub stop_reason: StopReason,
}

/// Measures how fast a stream produces instances, without any model.
#[derive(Debug, Clone, Copy)]
pub struct StreamSpeedEvaluator {
    num_samples: usize,
    max_time: Option<f64>,
    batch_size: usize,
}

impl StreamSpeedEvaluator {
    /// * `num_samples` - Instances to pull.
    /// * `max_time` - Wall clock budget in seconds.
    /// * `batch_size` - Instances pulled per call.
    pub fn new(num_samples: usize, max_time: Option<f64>, batch_size: usize) -> Result<Self, StreamwiseError> {
        validate_positive_usize_parameter(num_samples, "num_samples")?;
        validate_positive_usize_parameter(batch_size, "batch_size")?;
        if let Some(t) = max_time {
            validate_positive_float_parameter(t, "max_time")?;
        }
        Ok(StreamSpeedEvaluator {
            num_samples,
            max_time,
            batch_size,
        })
    }

    pub fn evaluate<S: DataStream + ?Sized>(&self, stream: &mut S) -> SpeedReport {
        let start = Instant::now();
        let mut samples = 0;
        let stop_reason = loop {
            if samples >= self.num_samples {
                break StopReason::MaxInstances;
            }
            if !stream.has_more_instances() {
                break StopReason::StreamExhausted;
            }
            if let Some(t) = self.max_time {
                if start.elapsed().as_secs_f64() >= t {
                    warn!("Reached time limit after {} samples.", samples);
                    break StopReason::MaxTime;
                }
            }
            let batch = stream.next_instance(self.batch_size.min(self.num_samples - samples));
            if batch.is_empty() {
                break StopReason::StreamExhausted;
            }
            samples += batch.len();
        };
        let elapsed = start.elapsed().as_secs_f64();
        let samples_per_second = if elapsed > 0.0 { samples as f64 / elapsed } else { f64::INFINITY };
        info!(
            "Generated {} samples in {:.4} seconds, {:.1} samples per second.",
            samples, elapsed, samples_per_second
        );
        SpeedReport {
            samples,
            elapsed,
            samples_per_second,
            stop_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Batch, TaskType};
    use crate::stream::array::ArrayStream;
    use crate::stream::sea::{SeaConfig, SeaGenerator};

    #[test]
    fn test_speed_on_infinite_stream() {
        let mut stream = SeaGenerator::new(SeaConfig::default()).unwrap();
        let report = StreamSpeedEvaluator::new(1000, None, 64).unwrap().evaluate(&mut stream);
        assert_eq!(report.samples, 1000);
        assert_eq!(stream.n_generated(), 1000);
        assert_eq!(report.stop_reason, StopReason::MaxInstances);
        assert!(report.samples_per_second > 0.0);
    }

    #[test]
    fn test_speed_on_finite_stream() {
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let batch = Batch::from_rows(&rows, &[0.; 10]).unwrap();
        let mut stream = ArrayStream::new(batch, TaskType::Classification);
        let report = StreamSpeedEvaluator::new(100, Some(60.0), 3).unwrap().evaluate(&mut stream);
        assert_eq!(report.samples, 10);
        assert_eq!(report.stop_reason, StopReason::StreamExhausted);
        assert!(StreamSpeedEvaluator::new(0, None, 1).is_err());
    }
}
