//! Worker configuration
//!
//! Explicit configuration passed into worker construction; nothing is
//! read from process-global state during a run.

use std::path::PathBuf;

use wharf_core::domain::context::DEFAULT_DEVELOPER;

/// Configuration shared by every worker a process creates
#[derive(Debug, Clone)]
pub struct Config {
    /// Base directory under which each job gets its own workspace.
    pub workspace_base: PathBuf,

    /// Developer name used when a submission does not carry one.
    pub default_developer: String,

    /// Max jobs a queue consumer processes in parallel.
    pub max_parallel_jobs: usize,
}

impl Config {
    /// Creates a configuration with defaults for everything but the
    /// workspace base.
    pub fn new(workspace_base: PathBuf) -> Self {
        Self {
            workspace_base,
            default_developer: DEFAULT_DEVELOPER.to_string(),
            max_parallel_jobs: 2,
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Expected environment variables:
    /// - WHARF_WORKSPACE_BASE (optional, default: system temp dir)
    /// - WHARF_DEFAULT_DEVELOPER (optional)
    /// - WHARF_MAX_PARALLEL_JOBS (optional, default: 2)
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Config::default();

        if let Ok(base) = std::env::var("WHARF_WORKSPACE_BASE") {
            config.workspace_base = PathBuf::from(base);
        }

        if let Ok(developer) = std::env::var("WHARF_DEFAULT_DEVELOPER") {
            config.default_developer = developer;
        }

        if let Ok(max) = std::env::var("WHARF_MAX_PARALLEL_JOBS") {
            config.max_parallel_jobs = max
                .parse()
                .map_err(|_| anyhow::anyhow!("WHARF_MAX_PARALLEL_JOBS must be a number"))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.workspace_base.as_os_str().is_empty() {
            anyhow::bail!("workspace_base cannot be empty");
        }

        if self.default_developer.is_empty() {
            anyhow::bail!("default_developer cannot be empty");
        }

        if self.max_parallel_jobs == 0 {
            anyhow::bail!("max_parallel_jobs must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("wharf"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_developer, DEFAULT_DEVELOPER);
        assert_eq!(config.max_parallel_jobs, 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.max_parallel_jobs = 0;
        assert!(config.validate().is_err());

        config.max_parallel_jobs = 2;
        config.default_developer = String::new();
        assert!(config.validate().is_err());
    }
}
