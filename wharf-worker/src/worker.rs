//! Build worker
//!
//! Runs an ordered task list against one context and a job-scoped
//! workspace, collecting logs and failures into a single result.
//! Task failures are captured as data, never raised out of a run, so
//! partial failure stays diagnosable for the caller.

use tokio_util::sync::CancellationToken;
use tracing::debug;

use wharf_core::domain::context::Context;
use wharf_core::domain::log::{LogLevel, LogRecord};
use wharf_core::domain::result::BuildResult;

use crate::config::Config;
use crate::error::WorkerError;
use crate::task::Task;
use crate::workspace::Workspace;

/// What the worker does with the remaining tasks after one fails
///
/// There is no universal default: build runs want fail-fast, QA check
/// runs want every informative check to keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the remaining tasks on the first failure.
    FailFast,
    /// Keep running the remaining tasks; the run still fails.
    ContinueOnFailure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WorkerState {
    Created,
    WorkspaceReady,
    Running,
    Succeeded,
    Failed,
}

impl WorkerState {
    fn as_str(self) -> &'static str {
        match self {
            WorkerState::Created => "created",
            WorkerState::WorkspaceReady => "workspace-ready",
            WorkerState::Running => "running",
            WorkerState::Succeeded => "succeeded",
            WorkerState::Failed => "failed",
        }
    }
}

/// Orchestrator for one job
///
/// Owns the context exclusively for the duration of the run and hands
/// it back as part of the result.
pub struct Worker {
    config: Config,
    job_id: String,
    context: Context,
    tasks: Vec<Box<dyn Task>>,
    policy: FailurePolicy,
    state: WorkerState,
    workspace: Option<Workspace>,
    cancel: CancellationToken,
    result: Option<BuildResult>,
}

impl Worker {
    /// Creates a worker over an ordered task list.
    ///
    /// The failure policy must be chosen explicitly per instance.
    pub fn new(
        config: Config,
        job_id: impl Into<String>,
        context: Context,
        tasks: Vec<Box<dyn Task>>,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            config,
            job_id: job_id.into(),
            context,
            tasks,
            policy,
            state: WorkerState::Created,
            workspace: None,
            cancel: CancellationToken::new(),
            result: None,
        }
    }

    /// Materializes the job workspace.
    ///
    /// A failure here is fatal for the job; the worker never reaches
    /// running and the workspace is not reused.
    pub async fn setup(&mut self) -> Result<(), WorkerError> {
        if self.state != WorkerState::Created {
            return Err(WorkerError::InvalidState {
                actual: self.state.as_str(),
                expected: WorkerState::Created.as_str(),
            });
        }

        match Workspace::create(&self.config.workspace_base, &self.job_id).await {
            Ok(workspace) => {
                debug!(job = %self.job_id, root = %workspace.root().display(), "workspace ready");
                self.workspace = Some(workspace);
                self.state = WorkerState::WorkspaceReady;
                Ok(())
            }
            Err(err) => {
                self.state = WorkerState::Failed;
                Err(WorkerError::Setup(err.to_string()))
            }
        }
    }

    /// Executes the task list in order.
    ///
    /// Every task failure is recorded as an error-level log record and
    /// aggregated into the result's failed flag; the only error this
    /// method itself returns is calling it before `setup()`.
    pub async fn run(&mut self) -> Result<(), WorkerError> {
        if self.state != WorkerState::WorkspaceReady {
            return Err(WorkerError::InvalidState {
                actual: self.state.as_str(),
                expected: WorkerState::WorkspaceReady.as_str(),
            });
        }

        self.state = WorkerState::Running;

        let Some(workspace) = &self.workspace else {
            return Err(WorkerError::InvalidState {
                actual: WorkerState::Created.as_str(),
                expected: WorkerState::WorkspaceReady.as_str(),
            });
        };

        let mut failed = false;
        let mut cancelled = false;
        let cancel = self.cancel.clone();

        for task in &self.tasks {
            if cancel.is_cancelled() {
                cancelled = true;
                self.context.log(
                    LogRecord::new(LogLevel::Warn, "run cancelled")
                        .with_body(format!("stopping before task `{}`", task.name())),
                );
                break;
            }

            debug!(job = %self.job_id, task = task.name(), "running task");

            // A cancellable task is interrupted at its next suspension
            // point; any other task finishes before the run stops.
            let outcome = if task.cancellable() {
                tokio::select! {
                    outcome = task.run(&mut self.context, workspace) => Some(outcome),
                    _ = cancel.cancelled() => None,
                }
            } else {
                Some(task.run(&mut self.context, workspace).await)
            };

            let Some(outcome) = outcome else {
                cancelled = true;
                self.context.log(
                    LogRecord::new(LogLevel::Warn, "run cancelled")
                        .with_body(format!("task `{}` interrupted", task.name())),
                );
                break;
            };

            if let Err(err) = outcome {
                failed = true;
                self.context.log(
                    LogRecord::new(LogLevel::Error, format!("task `{}` failed", task.name()))
                        .with_body(err.to_string()),
                );

                if self.policy == FailurePolicy::FailFast {
                    debug!(job = %self.job_id, task = task.name(), "aborting remaining tasks");
                    break;
                }
            }
        }

        // A cancelled run never completed its task list.
        failed = failed || cancelled;

        self.result = Some(BuildResult {
            failed,
            packages: self.context.packages.clone(),
            appcenter: if self.context.appcenter.is_empty() {
                None
            } else {
                Some(self.context.appcenter.clone())
            },
            appstream: if self.context.appstream.is_empty() {
                None
            } else {
                Some(self.context.appstream.clone())
            },
            logs: self.context.logs.clone(),
        });

        self.state = if failed {
            WorkerState::Failed
        } else {
            WorkerState::Succeeded
        };

        Ok(())
    }

    /// Requests cancellation, observed between tasks; a task that is
    /// already running finishes but nothing further is scheduled.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Token tasks may watch at their own suspension points.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The result snapshot; `None` until `run()` settles.
    pub fn result(&self) -> Option<&BuildResult> {
        self.result.as_ref()
    }

    /// Whether the run failed; meaningful only after `run()` settles.
    pub fn fails(&self) -> bool {
        self.result.as_ref().is_some_and(|result| result.failed)
    }

    /// The context in its current state.
    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Consumes the worker, yielding the result if the run settled.
    pub fn into_result(self) -> Option<BuildResult> {
        self.result
    }

    /// Disposes the workspace.
    pub async fn teardown(&mut self) -> std::io::Result<()> {
        if let Some(workspace) = self.workspace.take() {
            workspace.dispose().await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use wharf_core::domain::context::BuildType;
    use wharf_core::domain::result::{Package, PackageKind};

    use crate::error::TaskError;

    struct StubTask {
        name: &'static str,
        fail: bool,
        ran: Arc<AtomicBool>,
        declares_package: bool,
    }

    impl StubTask {
        fn ok(name: &'static str) -> (Box<dyn Task>, Arc<AtomicBool>) {
            Self::build(name, false, false)
        }

        fn failing(name: &'static str) -> (Box<dyn Task>, Arc<AtomicBool>) {
            Self::build(name, true, false)
        }

        fn packaging(name: &'static str) -> (Box<dyn Task>, Arc<AtomicBool>) {
            Self::build(name, false, true)
        }

        fn build(
            name: &'static str,
            fail: bool,
            declares_package: bool,
        ) -> (Box<dyn Task>, Arc<AtomicBool>) {
            let ran = Arc::new(AtomicBool::new(false));
            let task = Box::new(Self {
                name,
                fail,
                ran: Arc::clone(&ran),
                declares_package,
            });
            (task, ran)
        }
    }

    #[async_trait]
    impl Task for StubTask {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(
            &self,
            context: &mut Context,
            workspace: &Workspace,
        ) -> Result<(), TaskError> {
            self.ran.store(true, Ordering::SeqCst);

            if self.declares_package {
                context.packages.push(Package {
                    kind: PackageKind::Deb,
                    path: workspace.path("out.deb"),
                });
            }

            if self.fail {
                return Err(TaskError::Failed("stub failure".to_string()));
            }
            Ok(())
        }
    }

    fn config(base: &tempfile::TempDir) -> Config {
        Config::new(base.path().to_path_buf())
    }

    fn context() -> Context {
        Context::new(BuildType::App, "com.github.acme.app", "1.0.0").unwrap()
    }

    #[tokio::test]
    async fn test_fail_fast_skips_remaining_tasks() {
        let base = tempfile::tempdir().unwrap();
        let (first, first_ran) = StubTask::ok("first");
        let (second, second_ran) = StubTask::failing("second");
        let (third, third_ran) = StubTask::ok("third");

        let mut worker = Worker::new(
            config(&base),
            "job-1",
            context(),
            vec![first, second, third],
            FailurePolicy::FailFast,
        );

        worker.setup().await.unwrap();
        worker.run().await.unwrap();

        assert!(first_ran.load(Ordering::SeqCst));
        assert!(second_ran.load(Ordering::SeqCst));
        assert!(!third_ran.load(Ordering::SeqCst));
        assert!(worker.fails());

        let result = worker.result().unwrap();
        assert!(result.failed);
        assert!(
            result
                .logs
                .iter()
                .any(|log| log.level == LogLevel::Error && log.title.contains("second"))
        );
    }

    #[tokio::test]
    async fn test_continue_on_failure_runs_remaining_tasks() {
        let base = tempfile::tempdir().unwrap();
        let (first, _) = StubTask::failing("first");
        let (second, second_ran) = StubTask::ok("second");

        let mut worker = Worker::new(
            config(&base),
            "job-1",
            context(),
            vec![first, second],
            FailurePolicy::ContinueOnFailure,
        );

        worker.setup().await.unwrap();
        worker.run().await.unwrap();

        assert!(second_ran.load(Ordering::SeqCst));
        assert!(worker.fails());
    }

    #[tokio::test]
    async fn test_successful_run_reflects_declared_packages() {
        let base = tempfile::tempdir().unwrap();
        let (first, _) = StubTask::ok("first");
        let (second, _) = StubTask::packaging("second");

        let mut worker = Worker::new(
            config(&base),
            "job-1",
            context(),
            vec![first, second],
            FailurePolicy::FailFast,
        );

        worker.setup().await.unwrap();
        worker.run().await.unwrap();

        assert!(!worker.fails());
        let result = worker.into_result().unwrap();
        assert!(!result.failed);
        assert_eq!(result.packages.len(), 1);
        assert_eq!(result.packages[0].kind, PackageKind::Deb);
    }

    #[tokio::test]
    async fn test_run_before_setup_is_rejected() {
        let base = tempfile::tempdir().unwrap();
        let mut worker = Worker::new(
            config(&base),
            "job-1",
            context(),
            vec![],
            FailurePolicy::FailFast,
        );

        assert!(matches!(
            worker.run().await,
            Err(WorkerError::InvalidState { .. })
        ));
        assert!(worker.result().is_none());
    }

    #[tokio::test]
    async fn test_setup_failure_is_fatal() {
        let base = tempfile::tempdir().unwrap();
        // A file where the workspace base should be makes creation fail.
        let blocker = base.path().join("blocked");
        tokio::fs::write(&blocker, b"").await.unwrap();

        let mut worker = Worker::new(
            Config::new(blocker),
            "job-1",
            context(),
            vec![],
            FailurePolicy::FailFast,
        );

        assert!(matches!(worker.setup().await, Err(WorkerError::Setup(_))));
        assert!(matches!(
            worker.run().await,
            Err(WorkerError::InvalidState { .. })
        ));
    }

    #[tokio::test]
    async fn test_stop_prevents_further_tasks() {
        let base = tempfile::tempdir().unwrap();
        let (first, first_ran) = StubTask::ok("first");

        let mut worker = Worker::new(
            config(&base),
            "job-1",
            context(),
            vec![first],
            FailurePolicy::FailFast,
        );

        worker.setup().await.unwrap();
        worker.stop();
        worker.run().await.unwrap();

        assert!(!first_ran.load(Ordering::SeqCst));
        assert!(worker.fails());
    }

    #[tokio::test]
    async fn test_cancellable_task_is_interrupted_mid_run() {
        struct SleepingTask {
            finished: Arc<AtomicBool>,
        }

        #[async_trait]
        impl Task for SleepingTask {
            fn name(&self) -> &str {
                "sleeping"
            }

            fn cancellable(&self) -> bool {
                true
            }

            async fn run(
                &self,
                _context: &mut Context,
                _workspace: &Workspace,
            ) -> Result<(), TaskError> {
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;
                self.finished.store(true, Ordering::SeqCst);
                Ok(())
            }
        }

        let base = tempfile::tempdir().unwrap();
        let finished = Arc::new(AtomicBool::new(false));
        let (after, after_ran) = StubTask::ok("after");

        let mut worker = Worker::new(
            config(&base),
            "job-1",
            context(),
            vec![
                Box::new(SleepingTask {
                    finished: Arc::clone(&finished),
                }),
                after,
            ],
            FailurePolicy::FailFast,
        );

        let token = worker.cancellation_token();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
            token.cancel();
        });

        worker.setup().await.unwrap();
        worker.run().await.unwrap();

        assert!(!finished.load(Ordering::SeqCst));
        assert!(!after_ran.load(Ordering::SeqCst));
        assert!(worker.fails());

        let result = worker.result().unwrap();
        assert!(
            result
                .logs
                .iter()
                .any(|log| log.level == LogLevel::Warn && log.title == "run cancelled")
        );
    }

    #[tokio::test]
    async fn test_teardown_removes_workspace() {
        let base = tempfile::tempdir().unwrap();
        let mut worker = Worker::new(
            config(&base),
            "job-1",
            context(),
            vec![],
            FailurePolicy::FailFast,
        );

        worker.setup().await.unwrap();
        let root = base.path().join("job-1");
        assert!(root.is_dir());

        worker.teardown().await.unwrap();
        assert!(!root.exists());
    }
}
