//! Queue job domain types

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle status of a queued job
///
/// Transitions are owned by the queue, never by the worker; the
/// worker only signals completion or failure through its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Waiting,
    Active,
    Completed,
    Failed,
    Delayed,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Waiting => write!(f, "waiting"),
            JobStatus::Active => write!(f, "active"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Delayed => write!(f, "delayed"),
        }
    }
}

/// Scheduling options for a queued job
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobOptions {
    /// Higher priority runs first.
    pub priority: i32,

    /// Minimum time before the job becomes eligible, also applied
    /// between retry attempts.
    pub delay: Option<Duration>,

    /// Total attempts before the job fails permanently.
    pub attempts: u32,

    /// Forced failure of an attempt once exceeded.
    pub timeout: Option<Duration>,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            priority: 0,
            delay: None,
            attempts: 1,
            timeout: None,
        }
    }
}

impl JobOptions {
    /// Sets the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the eligibility delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Sets the total attempt count.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts.max(1);
        self
    }

    /// Sets the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let opts = JobOptions::default();
        assert_eq!(opts.priority, 0);
        assert_eq!(opts.attempts, 1);
        assert!(opts.delay.is_none());
        assert!(opts.timeout.is_none());
    }

    #[test]
    fn test_attempts_never_zero() {
        let opts = JobOptions::default().with_attempts(0);
        assert_eq!(opts.attempts, 1);
    }
}
