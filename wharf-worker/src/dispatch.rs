//! Job dispatch
//!
//! Bridges queue payloads to worker runs: validates the inbound
//! request, builds the context, runs the task list, and sends
//! start/error/finish reports back over the messaging channel.
//!
//! Input and setup errors propagate to the caller after an error
//! report; anything later is captured inside the build result, and a
//! completed-but-failed result is returned as `Ok` so the queue does
//! not retry it.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use wharf_core::domain::context::{BuildType, ChangeEntry, Context};
use wharf_core::domain::result::BuildResult;
use wharf_core::dto::report::{ErrorReport, Report};
use wharf_core::dto::request::BuildRequest;

use wharf_queue::{JobHandle, Processor};

use crate::config::Config;
use crate::error::WorkerError;
use crate::rdnn;
use crate::task::Task;
use crate::worker::{FailurePolicy, Worker};

/// Channel carrying reports back to the caller
///
/// The transport behind it is opaque; implementations wrap whatever
/// messaging channel the deployment uses.
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn send(&self, report: Report) -> anyhow::Result<()>;
}

/// Builds the context for a validated request.
fn build_context(config: &Config, request: &BuildRequest) -> Result<Context, WorkerError> {
    let version = request.version();
    let domain = rdnn::from_repository(&request.repo);

    let mut context = Context::new(BuildType::App, &domain, version)
        .map_err(|_| WorkerError::InvalidVersion(version.to_string()))?
        .with_developer(&config.default_developer);

    context.changelog = request
        .changelog
        .iter()
        .cloned()
        .map(ChangeEntry::from)
        .collect();

    Ok(context)
}

async fn report(reporter: &dyn Reporter, message: Report) {
    if let Err(err) = reporter.send(message).await {
        warn!("failed to send report: {err:#}");
    }
}

async fn report_error(reporter: &dyn Reporter, id: &str, err: &WorkerError) {
    report(
        reporter,
        Report::Error {
            id: id.to_string(),
            error: ErrorReport::new(err.to_string()),
        },
    )
    .await;
}

/// Runs one request end to end, reporting through `reporter`.
///
/// Validation happens before any workspace is created; a missing
/// id, repository, or tag never reaches a task.
pub async fn process_request(
    config: &Config,
    request: BuildRequest,
    tasks: Vec<Box<dyn Task>>,
    policy: FailurePolicy,
    reporter: &dyn Reporter,
) -> Result<BuildResult, WorkerError> {
    if let Some(field) = request.missing_field() {
        let err = WorkerError::Input(field);
        report_error(reporter, &request.id, &err).await;
        return Err(err);
    }

    let context = match build_context(config, &request) {
        Ok(context) => context,
        Err(err) => {
            report_error(reporter, &request.id, &err).await;
            return Err(err);
        }
    };

    debug!(job = %request.id, repo = %request.repo, tag = %request.tag, "starting job");
    report(
        reporter,
        Report::Start {
            id: request.id.clone(),
            ok: true,
        },
    )
    .await;

    let mut worker = Worker::new(config.clone(), &request.id, context, tasks, policy);

    if let Err(err) = worker.setup().await {
        report_error(reporter, &request.id, &err).await;
        return Err(err);
    }

    let run_outcome = worker.run().await;

    // The workspace is job-scoped and nothing in the reports refers
    // back into it; dispose it before the result leaves.
    if let Err(err) = worker.teardown().await {
        warn!(job = %request.id, "failed to dispose workspace: {err}");
    }
    run_outcome?;

    let result = worker
        .into_result()
        .ok_or(WorkerError::InvalidState {
            actual: "running",
            expected: "settled",
        })?;

    report(
        reporter,
        Report::Finish {
            id: request.id.clone(),
            appcenter: result.appcenter.clone(),
            appstream: result.appstream.clone(),
            logs: result.logs.clone(),
        },
    )
    .await;

    Ok(result)
}

/// Queue processor running each payload through the worker
pub struct BuildProcessor {
    config: Config,
    reporter: Arc<dyn Reporter>,
    policy: FailurePolicy,
    tasks: Arc<dyn Fn() -> Vec<Box<dyn Task>> + Send + Sync>,
}

impl BuildProcessor {
    /// Creates a processor; `tasks` yields a fresh task list per job.
    pub fn new(
        config: Config,
        reporter: Arc<dyn Reporter>,
        policy: FailurePolicy,
        tasks: impl Fn() -> Vec<Box<dyn Task>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            config,
            reporter,
            policy,
            tasks: Arc::new(tasks),
        }
    }
}

#[async_trait]
impl Processor for BuildProcessor {
    async fn process(&self, _job: &dyn JobHandle, payload: JsonValue) -> anyhow::Result<JsonValue> {
        let request: BuildRequest = serde_json::from_value(payload)?;

        let result = process_request(
            &self.config,
            request,
            (self.tasks)(),
            self.policy,
            self.reporter.as_ref(),
        )
        .await?;

        Ok(serde_json::to_value(&result)?)
    }
}
