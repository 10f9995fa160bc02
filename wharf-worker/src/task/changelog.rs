//! Debian changelog task
//!
//! Renders the accumulated change entries into `debian/changelog`
//! inside the workspace's dirty tree, newest release first. The file
//! is rewritten wholly on every run, so the task is idempotent for an
//! unchanged context.

use async_trait::async_trait;
use chrono::Utc;
use minijinja::{Environment, context as template_context};
use serde::Serialize;
use tracing::debug;

use wharf_core::domain::context::{ChangeEntry, Context};

use crate::error::TaskError;
use crate::rdnn;
use crate::task::Task;
use crate::task::markup;
use crate::workspace::Workspace;

/// Location of the rendered changelog, relative to the workspace.
pub const CHANGELOG_PATH: &str = "dirty/debian/changelog";

/// Address rendered into the maintainer line of each block.
const MAINTAINER_EMAIL: &str = "appcenter@wharf.io";

const TEMPLATE: &str = "\
{% for entry in entries %}{{ name }} ({{ entry.version }}) {{ distribution }}; urgency=low

{% for change in entry.changes %}  * {{ change }}
{% endfor %}
 -- {{ developer }} <{{ email }}>  {{ entry.date }}

{% endfor %}";

/// One rendered changelog block
#[derive(Serialize)]
struct TemplateEntry {
    version: String,
    changes: Vec<String>,
    date: String,
}

/// Task writing the Debian changelog file
pub struct DebianChangelog;

impl DebianChangelog {
    /// Renders the changelog document for a context.
    ///
    /// Entries render newest first; an empty changelog renders a
    /// single synthesized "Version Bump" block for the target version.
    /// The output carries no whitespace-only lines and no leading or
    /// trailing blank lines.
    pub fn render(context: &Context) -> Result<String, TaskError> {
        let mut entries = context.changelog.clone();
        entries.sort_by(|a, b| b.date.cmp(&a.date));

        if entries.is_empty() {
            entries.push(Self::noop_change(context));
        }

        let blocks: Vec<TemplateEntry> = entries
            .iter()
            .map(|entry| TemplateEntry {
                version: entry.version.clone(),
                changes: markup::derive_changes(&entry.changes),
                date: entry.date.to_rfc2822(),
            })
            .collect();

        let distribution = if context.distribution.is_empty() {
            "unstable"
        } else {
            &context.distribution
        };

        let env = Environment::new();
        let rendered = env.render_str(
            TEMPLATE,
            template_context! {
                name => rdnn::sanitize(&context.name_domain, '-'),
                developer => context.name_developer,
                email => MAINTAINER_EMAIL,
                distribution => distribution,
                entries => blocks,
            },
        )?;

        Ok(strip_blank_lines(&rendered))
    }

    /// The placeholder entry inserted when a submission carries no
    /// changelog at all.
    fn noop_change(context: &Context) -> ChangeEntry {
        ChangeEntry {
            version: context.version.clone(),
            author: context.name_developer.clone(),
            changes: markup::FALLBACK_CHANGE.to_string(),
            date: Utc::now(),
        }
    }
}

#[async_trait]
impl Task for DebianChangelog {
    fn name(&self) -> &str {
        "debian-changelog"
    }

    async fn run(&self, context: &mut Context, workspace: &Workspace) -> Result<(), TaskError> {
        if context.changelog.is_empty() {
            let noop = Self::noop_change(context);
            context.changelog.push(noop);
        }

        let rendered = Self::render(context)?;

        let path = workspace.path(CHANGELOG_PATH);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, rendered).await?;

        debug!(path = %path.display(), "wrote debian changelog");
        Ok(())
    }
}

/// Strips whitespace-only lines to empty and removes leading and
/// trailing blank lines.
fn strip_blank_lines(rendered: &str) -> String {
    let lines: Vec<&str> = rendered
        .lines()
        .map(|line| if line.trim().is_empty() { "" } else { line })
        .collect();

    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wharf_core::domain::context::BuildType;

    fn context() -> Context {
        Context::new(BuildType::App, "com.github.acme.app", "1.0.0").unwrap()
    }

    fn entry(version: &str, changes: &str, day: u32) -> ChangeEntry {
        ChangeEntry {
            version: version.to_string(),
            author: "Jane".to_string(),
            changes: changes.to_string(),
            date: Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_empty_changelog_renders_single_version_bump_block() {
        let rendered = DebianChangelog::render(&context()).unwrap();

        assert_eq!(rendered.matches("urgency=low").count(), 1);
        assert!(rendered.contains("com.github.acme.app (1.0.0)"));
        assert!(rendered.contains("  * Version Bump"));
    }

    #[test]
    fn test_entries_render_newest_first() {
        let mut context = context();
        context.changelog.push(entry("0.9.0", "Old release", 1));
        context.changelog.push(entry("1.0.0", "New release", 20));

        let rendered = DebianChangelog::render(&context).unwrap();

        let newer = rendered.find("(1.0.0)").unwrap();
        let older = rendered.find("(0.9.0)").unwrap();
        assert!(newer < older);
    }

    #[test]
    fn test_itemized_changes_render_one_line_each() {
        let mut context = context();
        context
            .changelog
            .push(entry("1.0.0", "- Fixed crash\n- Faster startup", 20));

        let rendered = DebianChangelog::render(&context).unwrap();

        assert!(rendered.contains("  * Fixed crash\n  * Faster startup"));
    }

    #[test]
    fn test_no_blank_only_lines_and_trimmed_edges() {
        let mut context = context();
        context.changelog.push(entry("1.0.0", "A change", 20));
        context.changelog.push(entry("0.9.0", "Another", 1));

        let rendered = DebianChangelog::render(&context).unwrap();

        assert!(!rendered.starts_with('\n'));
        assert!(!rendered.ends_with('\n'));
        for line in rendered.lines() {
            assert!(line.is_empty() || !line.trim().is_empty());
        }
    }

    #[test]
    fn test_package_name_is_sanitized() {
        let mut context = context();
        context.name_domain = "com.acme.My_App".to_string();

        let rendered = DebianChangelog::render(&context).unwrap();
        assert!(rendered.starts_with("com.acme.my-app (1.0.0)"));
    }

    #[tokio::test]
    async fn test_run_writes_file_and_is_idempotent() {
        let base = tempfile::tempdir().unwrap();
        let workspace = Workspace::create(base.path(), "job-1").await.unwrap();
        let mut context = context();

        let task = DebianChangelog;
        task.run(&mut context, &workspace).await.unwrap();

        let path = workspace.path(CHANGELOG_PATH);
        let first = tokio::fs::read_to_string(&path).await.unwrap();
        assert!(first.contains("Version Bump"));
        assert_eq!(context.changelog.len(), 1);

        task.run(&mut context, &workspace).await.unwrap();
        let second = tokio::fs::read_to_string(&path).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(context.changelog.len(), 1);
    }
}
