//! Reporting
//!
//! Sinks for the periodic records of the prequential evaluator.
use crate::errors::StreamwiseError;
use crate::evaluation::prequential::EvaluationSummary;
use crate::metric::Metric;
use crate::utils::fmt_vec_output;
use log::info;
use serde::Serialize;
use std::io::Write;

/// Value of a metric over the whole evaluation and over the recent window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricValue {
    pub metric: Metric,
    pub cumulative: f64,
    pub windowed: f64,
}

/// Periodic record, emitted every `n_wait` samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    /// Samples processed so far, pretraining excluded.
    pub samples: usize,
    /// Wall clock seconds since the evaluation started.
    pub elapsed: f64,
    pub values: Vec<MetricValue>,
    /// ADWIN estimate of the current accuracy, classification only.
    pub adaptive_accuracy: Option<f64>,
}

impl Report {
    pub fn get(&self, metric: Metric) -> Option<&MetricValue> {
        self.values.iter().find(|v| v.metric == metric)
    }
}

/// Receives the records of an evaluation.
pub trait Reporter {
    fn report(&mut self, report: &Report) -> Result<(), StreamwiseError>;

    /// Called once the evaluation has stopped.
    fn finish(&mut self, _summary: &EvaluationSummary) -> Result<(), StreamwiseError> {
        Ok(())
    }
}

/// Forwards records to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&mut self, report: &Report) -> Result<(), StreamwiseError> {
        let names: Vec<&str> = report.values.iter().map(|v| v.metric.name()).collect();
        let windowed: Vec<f64> = report.values.iter().map(|v| v.windowed).collect();
        info!(
            "samples: {}, elapsed: {:.2}s, {} (windowed): [{}]",
            report.samples,
            report.elapsed,
            names.join(", "),
            fmt_vec_output(&windowed)
        );
        Ok(())
    }
}

/// Writes one CSV row per record.
///
/// Columns are `samples`, `elapsed`, then `<metric>_cumulative` and
/// `<metric>_windowed` for every metric. The header is taken from the first record.
pub struct CsvReporter<W: Write> {
    writer: csv::Writer<W>,
    header_written: bool,
}

impl<W: Write> CsvReporter<W> {
    pub fn new(inner: W) -> Self {
        CsvReporter {
            writer: csv::Writer::from_writer(inner),
            header_written: false,
        }
    }

    /// Flush and return the underlying writer.
    pub fn into_inner(self) -> Result<W, StreamwiseError> {
        self.writer
            .into_inner()
            .map_err(|e| StreamwiseError::UnableToWrite(e.to_string()))
    }
}

impl<W: Write> Reporter for CsvReporter<W> {
    fn report(&mut self, report: &Report) -> Result<(), StreamwiseError> {
        if !self.header_written {
            let mut header = vec!["samples".to_string(), "elapsed".to_string()];
            for v in &report.values {
                header.push(format!("{}_cumulative", v.metric));
                header.push(format!("{}_windowed", v.metric));
            }
            self.writer
                .write_record(&header)
                .map_err(|e| StreamwiseError::UnableToWrite(e.to_string()))?;
            self.header_written = true;
        }
        let mut row = vec![report.samples.to_string(), format!("{:.6}", report.elapsed)];
        for v in &report.values {
            row.push(v.cumulative.to_string());
            row.push(v.windowed.to_string());
        }
        self.writer
            .write_record(&row)
            .map_err(|e| StreamwiseError::UnableToWrite(e.to_string()))
    }

    fn finish(&mut self, _summary: &EvaluationSummary) -> Result<(), StreamwiseError> {
        self.writer
            .flush()
            .map_err(|e| StreamwiseError::UnableToWrite(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(samples: usize, accuracy: f64) -> Report {
        Report {
            samples,
            elapsed: 0.5,
            values: vec![MetricValue {
                metric: Metric::Accuracy,
                cumulative: accuracy,
                windowed: 1.0,
            }],
            adaptive_accuracy: None,
        }
    }

    #[test]
    fn test_csv_reporter() {
        let mut reporter = CsvReporter::new(Vec::new());
        reporter.report(&record(200, 0.5)).unwrap();
        reporter.report(&record(400, 0.75)).unwrap();
        let out = String::from_utf8(reporter.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "samples,elapsed,accuracy_cumulative,accuracy_windowed");
        assert_eq!(lines[1], "200,0.500000,0.5,1");
        assert_eq!(lines[2], "400,0.500000,0.75,1");
    }

    #[test]
    fn test_report_lookup() {
        let r = record(10, 0.25);
        assert_eq!(r.get(Metric::Accuracy).map(|v| v.cumulative), Some(0.25));
        assert!(r.get(Metric::Kappa).is_none());
        assert!(LogReporter.report(&r).is_ok());
    }
}
