//! Build context domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::log::LogRecord;
use crate::domain::result::Package;

/// Developer name used when a submission does not carry one.
pub const DEFAULT_DEVELOPER: &str = "Packaging Bot";

/// Human readable name used when a submission does not carry one.
pub const DEFAULT_HUMAN_NAME: &str = "Application";

/// Kind of submission being built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildType {
    App,
    SystemApp,
    Library,
}

impl std::fmt::Display for BuildType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildType::App => write!(f, "app"),
            BuildType::SystemApp => write!(f, "system-app"),
            BuildType::Library => write!(f, "library"),
        }
    }
}

/// A single changelog entry for a release
///
/// Immutable once created. Produced from submission metadata, or
/// synthesized as a "Version Bump" placeholder when none exist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEntry {
    pub version: String,
    pub author: String,
    pub changes: String,
    pub date: DateTime<Utc>,
}

/// Mutable record describing one build/check request and its
/// accumulated state
///
/// Owned exclusively by the worker for the duration of a run, then
/// handed back to the caller as part of the build result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub build_type: BuildType,

    pub name_developer: String,
    pub name_domain: String,
    pub name_human: String,

    /// Target version; always a valid semantic version string.
    pub version: String,

    pub architecture: String,
    pub distribution: String,

    /// References to pull; never empty.
    pub references: Vec<String>,

    /// Change entries, sorted newest-first wherever consumed.
    pub changelog: Vec<ChangeEntry>,

    /// Platform-specific metadata blob.
    pub appcenter: serde_json::Map<String, serde_json::Value>,

    /// Rendered metadata document (XML formatted string).
    pub appstream: String,

    /// Artifacts declared by tasks during the run.
    pub packages: Vec<Package>,

    pub logs: Vec<LogRecord>,
}

impl Context {
    /// Creates a context for a submission, filling defaults for every
    /// field the caller may omit.
    ///
    /// The references list defaults to the tag matching `version`.
    /// Fails when `version` is not a valid semantic version.
    pub fn new(
        build_type: BuildType,
        name_domain: &str,
        version: &str,
    ) -> Result<Self, semver::Error> {
        semver::Version::parse(version)?;

        Ok(Self {
            build_type,
            name_developer: DEFAULT_DEVELOPER.to_string(),
            name_domain: name_domain.to_string(),
            name_human: DEFAULT_HUMAN_NAME.to_string(),
            version: version.to_string(),
            architecture: String::new(),
            distribution: String::new(),
            references: vec![format!("refs/tags/{version}")],
            changelog: Vec::new(),
            appcenter: serde_json::Map::new(),
            appstream: String::new(),
            packages: Vec::new(),
            logs: Vec::new(),
        })
    }

    /// Sets the developer name.
    pub fn with_developer(mut self, name: impl Into<String>) -> Self {
        self.name_developer = name.into();
        self
    }

    /// Sets the human readable name.
    pub fn with_human_name(mut self, name: impl Into<String>) -> Self {
        self.name_human = name.into();
        self
    }

    /// Replaces the references to pull. An empty list keeps the
    /// default so the invariant of a non-empty list holds.
    pub fn with_references(mut self, references: Vec<String>) -> Self {
        if !references.is_empty() {
            self.references = references;
        }
        self
    }

    /// Appends a log record.
    pub fn log(&mut self, record: LogRecord) {
        self.logs.push(record);
    }
}
