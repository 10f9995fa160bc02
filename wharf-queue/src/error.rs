//! Queue error types

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by queue operations
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("job {0} not found")]
    JobNotFound(Uuid),

    #[error("queue is closed")]
    Closed,

    #[error("a processor is already registered")]
    ProcessorAlreadyRegistered,
}
