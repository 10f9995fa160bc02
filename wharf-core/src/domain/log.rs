//! Log record domain types

use serde::{Deserialize, Serialize};

/// Severity of a log record
///
/// Ordered from least to most severe; display surfaces sort records
/// by descending severity so errors appear first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

/// A log record accumulated on the build context
///
/// Append-only: the worker and its tasks may add records but never
/// remove them, so the full set is always available to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub level: LogLevel,
    pub title: String,
    pub body: Option<String>,
}

impl LogRecord {
    /// Creates a record with a title and no body.
    pub fn new(level: LogLevel, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            body: None,
        }
    }

    /// Attaches a body to the record.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

impl std::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.level, self.title)?;
        if let Some(body) = &self.body {
            write!(f, "\n\n{}", body)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(LogLevel::Error > LogLevel::Warn);
        assert!(LogLevel::Warn > LogLevel::Info);
        assert!(LogLevel::Info > LogLevel::Debug);
    }

    #[test]
    fn test_sort_descending_puts_errors_first() {
        let mut logs = vec![
            LogRecord::new(LogLevel::Info, "info"),
            LogRecord::new(LogLevel::Error, "error"),
            LogRecord::new(LogLevel::Warn, "warn"),
        ];
        logs.sort_by(|a, b| b.level.cmp(&a.level));
        assert_eq!(logs[0].title, "error");
        assert_eq!(logs[1].title, "warn");
        assert_eq!(logs[2].title, "info");
    }

    #[test]
    fn test_display_includes_body() {
        let record = LogRecord::new(LogLevel::Error, "task failed").with_body("details");
        assert_eq!(record.to_string(), "[error] task failed\n\ndetails");
    }
}
