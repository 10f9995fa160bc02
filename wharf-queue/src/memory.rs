//! In-memory queue
//!
//! Single-process queue backing the worker in tests and the CLI.
//! Jobs are dispatched by an interval-driven loop; priority, delayed
//! eligibility, retry attempts and per-attempt timeouts are all
//! handled here, never by the worker.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tokio::sync::{Semaphore, broadcast};
use tokio::time::{self, Instant};
use tracing::debug;
use uuid::Uuid;

use wharf_core::domain::job::{JobOptions, JobStatus};

use crate::error::QueueError;
use crate::event::QueueEvent;
use crate::queue::{JobHandle, Processor, Queue};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// One queued job and its scheduling bookkeeping
struct JobRecord {
    seq: u64,
    payload: JsonValue,
    opts: JobOptions,
    status: JobStatus,
    attempts_made: u32,
    #[allow(dead_code)]
    progress: u8,
    available_at: Instant,
    #[allow(dead_code)]
    error: Option<String>,
}

struct State {
    jobs: HashMap<Uuid, JobRecord>,
    next_seq: u64,
    closed: bool,
}

/// In-process [`Queue`] implementation
pub struct MemoryQueue {
    name: String,
    state: Arc<Mutex<State>>,
    events: broadcast::Sender<QueueEvent>,
    paused: Arc<AtomicBool>,
    tick: Duration,
    max_parallel_jobs: usize,
    dispatcher: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl MemoryQueue {
    /// Creates a queue with default tick interval and parallelism.
    pub fn new(name: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(State {
                jobs: HashMap::new(),
                next_seq: 0,
                closed: false,
            })),
            events,
            paused: Arc::new(AtomicBool::new(false)),
            tick: Duration::from_millis(25),
            max_parallel_jobs: 2,
            dispatcher: Mutex::new(None),
        }
    }

    /// Sets how often the dispatch loop looks for eligible jobs.
    pub fn with_tick_interval(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Sets how many jobs may process in parallel.
    pub fn with_max_parallel_jobs(mut self, max: usize) -> Self {
        self.max_parallel_jobs = max.max(1);
        self
    }

    fn handle_for(&self, id: Uuid) -> Box<dyn JobHandle> {
        Box::new(MemoryJobHandle {
            id,
            state: Arc::clone(&self.state),
            events: self.events.clone(),
        })
    }

    fn spawn_dispatcher(&self, processor: Arc<dyn Processor>) -> tokio::task::JoinHandle<()> {
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        let paused = Arc::clone(&self.paused);
        let semaphore = Arc::new(Semaphore::new(self.max_parallel_jobs));
        let tick = self.tick;
        let name = self.name.clone();

        tokio::spawn(async move {
            let mut interval = time::interval(tick);

            loop {
                interval.tick().await;

                if paused.load(Ordering::SeqCst) {
                    continue;
                }

                // Promote eligible delayed jobs and claim the best
                // waiting one under a single lock.
                let claimed = {
                    let mut state = state.lock().unwrap();
                    if state.closed {
                        debug!(queue = %name, "queue closed, stopping dispatch");
                        break;
                    }

                    let now = Instant::now();
                    for record in state.jobs.values_mut() {
                        if record.status == JobStatus::Delayed && record.available_at <= now {
                            record.status = JobStatus::Waiting;
                        }
                    }

                    let best = state
                        .jobs
                        .iter()
                        .filter(|(_, r)| r.status == JobStatus::Waiting)
                        .max_by_key(|(_, r)| (r.opts.priority, Reverse(r.seq)))
                        .map(|(id, _)| *id);

                    match best {
                        Some(id) => match Arc::clone(&semaphore).try_acquire_owned() {
                            Ok(permit) => state.jobs.get_mut(&id).map(|record| {
                                record.status = JobStatus::Active;
                                record.attempts_made += 1;
                                (id, record.payload.clone(), record.opts.clone(), permit)
                            }),
                            Err(_) => None,
                        },
                        None => None,
                    }
                };

                let Some((id, payload, opts, permit)) = claimed else {
                    continue;
                };

                let _ = events.send(QueueEvent::Active { job_id: id });

                let state = Arc::clone(&state);
                let events = events.clone();
                let processor = Arc::clone(&processor);

                tokio::spawn(async move {
                    let _permit = permit;
                    let handle = MemoryJobHandle {
                        id,
                        state: Arc::clone(&state),
                        events: events.clone(),
                    };

                    let outcome = match opts.timeout {
                        Some(limit) => {
                            match time::timeout(limit, processor.process(&handle, payload)).await {
                                Ok(result) => result,
                                Err(_) => {
                                    Err(anyhow::anyhow!("attempt timed out after {:?}", limit))
                                }
                            }
                        }
                        None => processor.process(&handle, payload).await,
                    };

                    settle_attempt(&state, &events, id, outcome);
                });
            }
        })
    }
}

/// Applies the retry policy after one processing attempt.
fn settle_attempt(
    state: &Arc<Mutex<State>>,
    events: &broadcast::Sender<QueueEvent>,
    id: Uuid,
    outcome: anyhow::Result<JsonValue>,
) {
    let mut state = state.lock().unwrap();

    // The job may have been removed mid-flight.
    let Some(record) = state.jobs.get_mut(&id) else {
        return;
    };

    match outcome {
        Ok(result) => {
            record.status = JobStatus::Completed;
            let _ = events.send(QueueEvent::Completed { job_id: id, result });
        }
        Err(err) => {
            let message = format!("{err:#}");

            if record.attempts_made < record.opts.attempts {
                debug!(
                    job = %id,
                    attempt = record.attempts_made,
                    error = %message,
                    "attempt failed, returning job to waiting"
                );
                match record.opts.delay {
                    Some(delay) if !delay.is_zero() => {
                        record.status = JobStatus::Delayed;
                        record.available_at = Instant::now() + delay;
                    }
                    _ => record.status = JobStatus::Waiting,
                }
            } else {
                record.status = JobStatus::Failed;
                record.error = Some(message.clone());
                let _ = events.send(QueueEvent::Failed {
                    job_id: id,
                    error: message,
                });
            }
        }
    }
}

#[async_trait]
impl Queue for MemoryQueue {
    async fn send(
        &self,
        payload: JsonValue,
        opts: JobOptions,
    ) -> Result<Box<dyn JobHandle>, QueueError> {
        let id = Uuid::new_v4();

        {
            let mut state = self.state.lock().unwrap();
            if state.closed {
                return Err(QueueError::Closed);
            }

            let seq = state.next_seq;
            state.next_seq += 1;

            let (status, available_at) = match opts.delay {
                Some(delay) if !delay.is_zero() => (JobStatus::Delayed, Instant::now() + delay),
                _ => (JobStatus::Waiting, Instant::now()),
            };

            state.jobs.insert(
                id,
                JobRecord {
                    seq,
                    payload,
                    opts,
                    status,
                    attempts_made: 0,
                    progress: 0,
                    available_at,
                    error: None,
                },
            );
        }

        debug!(queue = %self.name, job = %id, "job enqueued");
        Ok(self.handle_for(id))
    }

    async fn process(&self, processor: Arc<dyn Processor>) -> Result<(), QueueError> {
        if self.state.lock().unwrap().closed {
            return Err(QueueError::Closed);
        }

        let mut dispatcher = self.dispatcher.lock().unwrap();
        if dispatcher.is_some() {
            return Err(QueueError::ProcessorAlreadyRegistered);
        }

        *dispatcher = Some(self.spawn_dispatcher(processor));
        Ok(())
    }

    async fn pause(&self, local: bool) -> Result<(), QueueError> {
        // A single-process queue has no cluster; the flag is kept for
        // contract compatibility and both scopes collapse to one.
        if !local {
            debug!(queue = %self.name, "no cluster to pause, pausing locally");
        }
        self.paused.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn resume(&self, local: bool) -> Result<(), QueueError> {
        if !local {
            debug!(queue = %self.name, "no cluster to resume, resuming locally");
        }
        self.paused.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn count(&self, status: Option<JobStatus>) -> Result<usize, QueueError> {
        let state = self.state.lock().unwrap();
        let count = match status {
            Some(status) => state.jobs.values().filter(|r| r.status == status).count(),
            None => state.jobs.len(),
        };
        Ok(count)
    }

    async fn jobs(&self, status: JobStatus) -> Result<Vec<Box<dyn JobHandle>>, QueueError> {
        let ids: Vec<Uuid> = {
            let state = self.state.lock().unwrap();
            state
                .jobs
                .iter()
                .filter(|(_, r)| r.status == status)
                .map(|(id, _)| *id)
                .collect()
        };

        Ok(ids.into_iter().map(|id| self.handle_for(id)).collect())
    }

    async fn empty(&self) -> Result<(), QueueError> {
        self.state.lock().unwrap().jobs.clear();
        Ok(())
    }

    async fn close(&self) -> Result<(), QueueError> {
        self.state.lock().unwrap().closed = true;
        if let Some(handle) = self.dispatcher.lock().unwrap().take() {
            handle.abort();
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.events.subscribe()
    }
}

struct MemoryJobHandle {
    id: Uuid,
    state: Arc<Mutex<State>>,
    events: broadcast::Sender<QueueEvent>,
}

#[async_trait]
impl JobHandle for MemoryJobHandle {
    fn id(&self) -> Uuid {
        self.id
    }

    async fn status(&self) -> Result<JobStatus, QueueError> {
        let state = self.state.lock().unwrap();
        state
            .jobs
            .get(&self.id)
            .map(|r| r.status)
            .ok_or(QueueError::JobNotFound(self.id))
    }

    async fn progress(&self, amount: u8) -> Result<(), QueueError> {
        {
            let mut state = self.state.lock().unwrap();
            let record = state
                .jobs
                .get_mut(&self.id)
                .ok_or(QueueError::JobNotFound(self.id))?;
            record.progress = amount.min(100);
        }

        let _ = self.events.send(QueueEvent::Progress {
            job_id: self.id,
            amount: amount.min(100),
        });
        Ok(())
    }

    async fn remove(&self) -> Result<(), QueueError> {
        let mut state = self.state.lock().unwrap();
        state
            .jobs
            .remove(&self.id)
            .map(|_| ())
            .ok_or(QueueError::JobNotFound(self.id))
    }
}
