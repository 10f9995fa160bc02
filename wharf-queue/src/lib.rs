//! Wharf Queue
//!
//! The job-queue contract that feeds work into the worker and reports
//! outcomes back to a caller.
//!
//! The queue owns the whole job lifecycle: priority ordering, delayed
//! eligibility, retry attempts, per-attempt timeouts, and the typed
//! event stream. A worker only ever produces a result; a thin adapter
//! translates that result into queue events.

pub mod error;
pub mod event;
pub mod memory;
pub mod queue;

pub use error::QueueError;
pub use event::QueueEvent;
pub use memory::MemoryQueue;
pub use queue::{JobHandle, Processor, Queue};
