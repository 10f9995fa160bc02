//! Inbound job payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::context::ChangeEntry;

/// One changelog entry as carried by the inbound payload
///
/// The free-form text travels under `changelog` on the wire and maps
/// onto [`ChangeEntry::changes`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestChange {
    pub version: String,
    pub author: String,
    pub changelog: String,
    pub date: DateTime<Utc>,
}

impl From<RequestChange> for ChangeEntry {
    fn from(change: RequestChange) -> Self {
        Self {
            version: change.version,
            author: change.author,
            changes: change.changelog,
            date: change.date,
        }
    }
}

/// Payload describing one build/check request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRequest {
    /// Identifier the caller keys reports by.
    #[serde(default)]
    pub id: String,

    /// Full repository URL.
    #[serde(default)]
    pub repo: String,

    /// Git reference to build, e.g. `refs/tags/1.0.0`.
    #[serde(default)]
    pub tag: String,

    #[serde(default)]
    pub changelog: Vec<RequestChange>,
}

impl BuildRequest {
    /// Returns the first required field the payload is missing, if any.
    ///
    /// A missing id, repository, or tag is a fatal input error: the
    /// job must fail before any task runs.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.id.is_empty() {
            return Some("id");
        }
        if self.repo.is_empty() {
            return Some("repo");
        }
        if self.tag.is_empty() {
            return Some("tag");
        }
        None
    }

    /// Version component of the tag (`refs/tags/1.0.0` -> `1.0.0`).
    pub fn version(&self) -> &str {
        self.tag.rsplit('/').next().unwrap_or(&self.tag)
    }
}
