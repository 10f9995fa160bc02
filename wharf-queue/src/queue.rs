//! Queue contract
//!
//! Polymorphic over one capability set so different backing transports
//! can implement it; [`crate::MemoryQueue`] is the in-process one.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::broadcast;
use uuid::Uuid;

use wharf_core::domain::job::{JobOptions, JobStatus};

use crate::error::QueueError;
use crate::event::QueueEvent;

/// Handle to a single queued job
///
/// Status transitions are owned by the queue; the handle only
/// inspects the job, reports progress, or removes it.
#[async_trait]
pub trait JobHandle: Send + Sync {
    /// Identifier assigned by the queue.
    fn id(&self) -> Uuid;

    /// Current lifecycle status.
    async fn status(&self) -> Result<JobStatus, QueueError>;

    /// Reports progress (0-100) and emits a progress event.
    async fn progress(&self, amount: u8) -> Result<(), QueueError>;

    /// Removes the job from the queue.
    async fn remove(&self) -> Result<(), QueueError>;
}

/// Function invoked once per eligible job
///
/// An `Err` marks the attempt failed and hands retry handling to the
/// queue. A run that completed but whose result carries a failure
/// must be returned as `Ok` with the failure encoded in the value;
/// the queue does not retry those.
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(&self, job: &dyn JobHandle, payload: JsonValue) -> anyhow::Result<JsonValue>;
}

/// A job queue
#[async_trait]
pub trait Queue: Send + Sync {
    /// Enqueues a payload, returning a handle to the new job.
    async fn send(
        &self,
        payload: JsonValue,
        opts: JobOptions,
    ) -> Result<Box<dyn JobHandle>, QueueError>;

    /// Registers the processor and starts dispatching eligible jobs.
    async fn process(&self, processor: std::sync::Arc<dyn Processor>) -> Result<(), QueueError>;

    /// Stops pulling new jobs. `local` limits the pause to this
    /// consumer instead of the whole cluster.
    async fn pause(&self, local: bool) -> Result<(), QueueError>;

    /// Restarts pulling new jobs.
    async fn resume(&self, local: bool) -> Result<(), QueueError>;

    /// Number of jobs, optionally filtered by status.
    async fn count(&self, status: Option<JobStatus>) -> Result<usize, QueueError>;

    /// Handles for every job currently in the given status.
    async fn jobs(&self, status: JobStatus) -> Result<Vec<Box<dyn JobHandle>>, QueueError>;

    /// Removes every job from the queue.
    async fn empty(&self) -> Result<(), QueueError>;

    /// Stops the dispatch loop; enqueued jobs are kept but no longer
    /// dispatched.
    async fn close(&self) -> Result<(), QueueError>;

    /// Subscribes to job lifecycle events.
    ///
    /// Events arrive at-least-once per status transition, in
    /// transition order per job; a lagging subscriber may drop the
    /// oldest events.
    fn subscribe(&self) -> broadcast::Receiver<QueueEvent>;
}
