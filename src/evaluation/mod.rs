//! Evaluation
//!
//! Prequential (test-then-train) evaluation of stream models and the
//! statistics it reports.
//!
//! # Submodules
//!
//! * `measurements`: Cumulative and windowed classification and regression statistics.
//! * `report`: Periodic records and the sinks that receive them.
//! * `prequential`: The evaluation loop with its sample and time budgets.
//! * `speed`: Throughput of a stream on its own.

pub mod measurements;
pub mod prequential;
pub mod report;
pub mod speed;
#[cfg(test)]
mod tests;

pub use measurements::Measurements;
pub use prequential::{EvaluationSummary, EvaluatorConfig, EvaluatorState, PrequentialEvaluator, StopReason};
pub use report::{CsvReporter, LogReporter, Report, Reporter};
pub use speed::{SpeedReport, StreamSpeedEvaluator};
