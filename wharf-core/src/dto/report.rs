//! Outbound report messages

use serde::{Deserialize, Serialize};

use crate::domain::log::LogRecord;

/// Structured error payload carried by an error report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorReport {
    pub title: String,
    pub detail: Option<String>,
}

impl ErrorReport {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Message sent back to the caller over the reporting channel
///
/// Every message is keyed by the identifier of the job it concerns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Report {
    /// Acknowledges that processing has started.
    Start { id: String, ok: bool },

    /// Processing could not run or complete.
    Error { id: String, error: ErrorReport },

    /// Processing finished; carries metadata-tool outputs and the
    /// full ordered log list.
    Finish {
        id: String,
        appcenter: Option<serde_json::Map<String, serde_json::Value>>,
        appstream: Option<String>,
        logs: Vec<LogRecord>,
    },
}

impl Report {
    /// Identifier of the job this report concerns.
    pub fn id(&self) -> &str {
        match self {
            Report::Start { id, .. } => id,
            Report::Error { id, .. } => id,
            Report::Finish { id, .. } => id,
        }
    }
}
