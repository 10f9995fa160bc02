//! Queue lifecycle events

use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Lifecycle event emitted by a queue
///
/// Delivery is at-least-once per status transition, in transition
/// order for a given job. `Failed` fires only when a job fails
/// permanently; retried attempts surface as another `Active`.
#[derive(Debug, Clone)]
pub enum QueueEvent {
    /// An attempt on the job started.
    Active { job_id: Uuid },

    /// The job reported progress.
    Progress { job_id: Uuid, amount: u8 },

    /// The job failed permanently, attempts exhausted.
    Failed { job_id: Uuid, error: String },

    /// The job completed with a result.
    Completed { job_id: Uuid, result: JsonValue },
}

impl QueueEvent {
    /// Identifier of the job this event concerns.
    pub fn job_id(&self) -> Uuid {
        match self {
            QueueEvent::Active { job_id } => *job_id,
            QueueEvent::Progress { job_id, .. } => *job_id,
            QueueEvent::Failed { job_id, .. } => *job_id,
            QueueEvent::Completed { job_id, .. } => *job_id,
        }
    }
}
