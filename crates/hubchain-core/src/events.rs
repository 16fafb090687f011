//! Per-task event log
//!
//! Every resolution chain carries an append-only log of timestamped
//! events. Within one task the order is strictly chronological; when the
//! pool merges logs from concurrent tasks the aggregate order is
//! completion order, not submission order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Severity of a single log event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// One timestamped entry in a task's event trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEvent {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

impl LogEvent {
    /// Renders the event as a single human-readable log line
    ///
    /// Format: `[HH:MM:SS] message`, the shape the report envelope
    /// exposes to users.
    pub fn render(&self) -> String {
        format!("[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Append-only event log owned by a single resolution task
///
/// Pushes are mirrored to `tracing` at the matching level so the events
/// show up in structured logs as well as in the returned report.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<LogEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, severity: Severity, message: String) {
        match severity {
            Severity::Info | Severity::Success => tracing::info!("{message}"),
            Severity::Warning => tracing::warn!("{message}"),
            Severity::Error => tracing::error!("{message}"),
        }
        self.events.push(LogEvent {
            timestamp: Utc::now(),
            severity,
            message,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message.into());
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Severity::Success, message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message.into());
    }

    /// Appends another log's events after this log's own
    ///
    /// Used by the pool to merge task logs in completion order.
    pub fn extend(&mut self, events: Vec<LogEvent>) {
        self.events.extend(events);
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<LogEvent> {
        self.events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_preserves_order() {
        let mut log = EventLog::new();
        log.info("first");
        log.warning("second");
        log.error("third");

        let events = log.into_events();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].message, "first");
        assert_eq!(events[0].severity, Severity::Info);
        assert_eq!(events[1].severity, Severity::Warning);
        assert_eq!(events[2].severity, Severity::Error);
        assert!(events[0].timestamp <= events[2].timestamp);
    }

    #[test]
    fn test_event_log_extend_appends_after_own() {
        let mut own = EventLog::new();
        own.info("pool started");

        let mut task = EventLog::new();
        task.success("chain done");

        own.extend(task.into_events());
        let events = own.into_events();
        assert_eq!(events[0].message, "pool started");
        assert_eq!(events[1].message, "chain done");
    }

    #[test]
    fn test_render_contains_timestamp_and_message() {
        let mut log = EventLog::new();
        log.info("Chain started");
        let line = log.events()[0].render();
        assert!(line.starts_with('['));
        assert!(line.ends_with("] Chain started"));
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}
