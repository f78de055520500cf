//! Per-case logger installed on the provider under test
//!
//! Records are forwarded to the `log` facade under [`CASE_LOG_TARGET`] and
//! captured so the case report can replay them next to its failures.

use chrono::{DateTime, Utc};
use log::{Level, LevelFilter};
use std::sync::Mutex;

/// `log` target used for every case-scoped record
pub const CASE_LOG_TARGET: &str = "fetchcheck::case";

/// A captured log entry
#[derive(Debug, Clone)]
pub struct CapturedLogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub message: String,
}

impl CapturedLogEntry {
    /// Format for display
    pub fn display(&self) -> String {
        format!(
            "{} [{}] {}",
            self.timestamp.format("%H:%M:%S%.3f"),
            self.level,
            self.message
        )
    }
}

/// Structured logger scoped to one test case
#[derive(Debug)]
pub struct CaseLogger {
    case: String,
    level: LevelFilter,
    entries: Mutex<Vec<CapturedLogEntry>>,
}

impl CaseLogger {
    /// Logger for `case` at `Info` level
    pub fn new(case: impl Into<String>) -> Self {
        Self {
            case: case.into(),
            level: LevelFilter::Info,
            entries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn case_name(&self) -> &str {
        &self.case
    }

    pub fn level(&self) -> LevelFilter {
        self.level
    }

    /// Record and forward `message` if `level` passes the filter
    pub fn log(&self, level: Level, message: impl Into<String>) {
        if level > self.level {
            return;
        }
        let message = message.into();
        log::log!(target: CASE_LOG_TARGET, level, "[{}] {}", self.case, message);
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .push(CapturedLogEntry {
                timestamp: Utc::now(),
                level,
                message,
            });
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(Level::Warn, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn debug(&self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    /// Snapshot of the captured entries
    pub fn entries(&self) -> Vec<CapturedLogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}
