//! Errors
//!
//! Custom error types used throughout the `streamwise` crate.
use thiserror::Error;

/// Errors that can occur while learning from a stream.
#[derive(Debug, Error)]
pub enum StreamwiseError {
    /// First value is the name of the parameter, second is expected, third is what was passed.
    #[error("Invalid parameter value passed for {0}, expected {1} but {2} provided.")]
    InvalidParameter(String, String, String),
    /// Invalid value parsing.
    #[error("Invalid value {0} passed for {1}, expected one of {2}.")]
    ParseString(String, String, String),
    /// An instance does not have the dimensionality the learner was fitted with.
    #[error("Instance has {found} features, but {expected} were expected.")]
    DimensionMismatch { expected: usize, found: usize },
    /// Feature rows and targets of a batch disagree in length.
    #[error("Batch has {rows} feature rows but {targets} targets.")]
    ShapeMismatch { rows: usize, targets: usize },
    /// Classification learners need the set of classes on the first fit.
    #[error("The classes must be passed on the first call to partial_fit.")]
    MissingClasses,
    /// A target value that is not one of the declared classes.
    #[error("Label {0} is not one of the declared classes.")]
    UnknownLabel(f64),
    /// The stream cannot be restarted.
    #[error("The stream is not restartable.")]
    StreamNotRestartable,
    /// An operation was called in a state that does not allow it.
    #[error("Invalid state: {0}")]
    InvalidState(String),
    /// Unable to write a config or report.
    #[error("Unable to write: {0}")]
    UnableToWrite(String),
    /// Unable to read a config.
    #[error("Unable to read: {0}")]
    UnableToRead(String),
}
