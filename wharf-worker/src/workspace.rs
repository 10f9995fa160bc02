//! Job-scoped workspace
//!
//! Each job gets a directory of its own under the configured base.
//! The worker creates it before the first task runs and it is never
//! reused across jobs, so tasks may treat it as exclusively theirs.

use std::path::{Path, PathBuf};

/// Filesystem area scoped to one job
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Creates the workspace directory for one job.
    pub async fn create(base: &Path, job_id: &str) -> std::io::Result<Self> {
        let root = base.join(job_id);
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    /// Root directory of the workspace.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a path inside the workspace.
    pub fn path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// Removes the workspace directory and everything under it.
    pub async fn dispose(self) -> std::io::Result<()> {
        tokio::fs::remove_dir_all(&self.root).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_dispose() {
        let base = tempfile::tempdir().unwrap();

        let workspace = Workspace::create(base.path(), "job-1").await.unwrap();
        assert!(workspace.root().is_dir());
        assert_eq!(workspace.path("a/b"), base.path().join("job-1/a/b"));

        let root = workspace.root().to_path_buf();
        workspace.dispose().await.unwrap();
        assert!(!root.exists());
    }
}
