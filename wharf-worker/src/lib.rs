//! Wharf Worker
//!
//! The orchestration engine for package builds and QA checks.
//!
//! Architecture:
//! - Tasks: discrete units of work over a shared context and a
//!   job-scoped workspace
//! - Worker: runs an ordered task list, capturing every failure as
//!   data so partial failure stays diagnosable
//! - Dispatch: bridges queue payloads to worker runs and reports
//!   outcomes back over the messaging channel
//!
//! Tasks never run concurrently within one job; concurrency exists
//! only across jobs, each with its own workspace and context.

pub mod config;
pub mod dispatch;
pub mod error;
pub mod rdnn;
pub mod task;
pub mod worker;
pub mod workspace;

pub use config::Config;
pub use error::{TaskError, WorkerError};
pub use worker::{FailurePolicy, Worker};
pub use workspace::Workspace;
