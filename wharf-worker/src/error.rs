//! Worker error taxonomy

use thiserror::Error;

/// Failure raised by a single task
///
/// Captured by the worker as an error-level log record; it never
/// propagates out of a run.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0}")]
    Failed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("template rendering failed: {0}")]
    Template(#[from] minijinja::Error),
}

/// Errors that escape the worker before a run settles
///
/// These are the only errors a caller sees as control flow; anything
/// after the worker reaches running is captured in the result.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// Malformed or missing job fields; no workspace was created.
    #[error("invalid input: missing required field `{0}`")]
    Input(&'static str),

    /// The target version is not a valid semantic version.
    #[error("invalid version `{0}`")]
    InvalidVersion(String),

    /// The workspace could not be materialized.
    #[error("workspace setup failed: {0}")]
    Setup(String),

    /// A lifecycle method was called out of order.
    #[error("worker is {actual}, expected {expected}")]
    InvalidState {
        actual: &'static str,
        expected: &'static str,
    },
}
