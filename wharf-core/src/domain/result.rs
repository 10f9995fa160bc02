//! Build result domain types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::log::LogRecord;

/// Packaging system a produced artifact belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageKind {
    Deb,
}

impl std::fmt::Display for PackageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PackageKind::Deb => write!(f, "deb"),
        }
    }
}

/// A produced package artifact on the local filesystem
///
/// The caller is responsible for relocating and publishing the file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub kind: PackageKind,
    pub path: PathBuf,
}

/// Terminal snapshot of one build/check run
///
/// `failed` is true iff at least one task reported a failure or the
/// worker could not complete its task list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildResult {
    pub failed: bool,
    pub packages: Vec<Package>,
    pub appcenter: Option<serde_json::Map<String, serde_json::Value>>,
    pub appstream: Option<String>,
    pub logs: Vec<LogRecord>,
}
