//! Build and check tasks

mod changelog;
mod markup;

pub use changelog::{CHANGELOG_PATH, DebianChangelog};
pub use markup::derive_changes;

use async_trait::async_trait;

use wharf_core::domain::context::Context;

use crate::error::TaskError;
use crate::workspace::Workspace;

/// A single unit of work run by the worker
///
/// Tasks are stateless between runs: everything persistent lives on
/// the [`Context`] or on disk under the [`Workspace`]. A failure must
/// surface as a [`TaskError`], never be swallowed; a task may append
/// log records to the context regardless of outcome.
///
/// Tasks run strictly sequentially in caller-supplied order. A later
/// task may assume all earlier tasks completed (successfully or not)
/// and inspect the context and workspace for their effects.
#[async_trait]
pub trait Task: Send + Sync {
    /// Name used in log records and failure reports.
    fn name(&self) -> &str;

    /// Whether the worker may interrupt the task at a suspension
    /// point once cancellation is requested. A task that is not
    /// cancellable runs to completion; the worker then stops
    /// scheduling further tasks.
    fn cancellable(&self) -> bool {
        false
    }

    /// Runs the task against the shared context and workspace.
    async fn run(&self, context: &mut Context, workspace: &Workspace) -> Result<(), TaskError>;
}

/// The ordered task list for a package build.
///
/// Repository cloning, package assembly and artifact publishing are
/// collaborator-supplied tasks; callers append them around this core.
pub fn build_tasks() -> Vec<Box<dyn Task>> {
    vec![Box::new(DebianChangelog)]
}
