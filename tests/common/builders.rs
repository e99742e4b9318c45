//! Test builders: ergonomic constructors for `LogRecord` and dashboard rows.
//!
//! These builders are designed for readability in test assertions, not for
//! production use. They panic on invalid input rather than returning `Result`.

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use logwise_core::{LogMessage, LogRecord, Project, Session, Severity};
use std::collections::BTreeMap;

/// The instant every harness measures from.
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
}

// ---------------------------------------------------------------------------
// LogRecordBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for [`LogRecord`] test fixtures.
///
/// # Example
///
/// ```rust,ignore
/// let record = LogRecordBuilder::new("timeout connecting to db")
///     .severity(Severity::Error)
///     .seconds_ago(90)
///     .label("zone", "europe-west1-b")
///     .build();
/// ```
pub struct LogRecordBuilder {
    timestamp: String,
    severity: Option<Severity>,
    message: LogMessage,
    resource_type: String,
    labels: BTreeMap<String, String>,
}

impl LogRecordBuilder {
    pub fn new(message: impl Into<LogMessage>) -> Self {
        Self {
            timestamp: fixed_now().to_rfc3339(),
            severity: Some(Severity::Info),
            message: message.into(),
            resource_type: "gce_instance".to_string(),
            labels: BTreeMap::new(),
        }
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// A level outside the eight known severities.
    pub fn unknown_severity(mut self) -> Self {
        self.severity = None;
        self
    }

    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.timestamp = at.to_rfc3339();
        self
    }

    /// Relative to [`fixed_now`].
    pub fn seconds_ago(self, secs: i64) -> Self {
        self.at(fixed_now() - TimeDelta::seconds(secs))
    }

    /// Relative to the real clock, for code paths that read `Utc::now()`.
    pub fn seconds_before_now(self, secs: i64) -> Self {
        self.at(Utc::now() - TimeDelta::seconds(secs))
    }

    pub fn raw_timestamp(mut self, raw: impl Into<String>) -> Self {
        self.timestamp = raw.into();
        self
    }

    pub fn resource(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = resource_type.into();
        self
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn build(self) -> LogRecord {
        LogRecord {
            timestamp: self.timestamp,
            severity: self.severity,
            message: self.message,
            resource_type: self.resource_type,
            labels: self.labels,
        }
    }

    /// The record as the backend would send it.
    pub fn json(self) -> serde_json::Value {
        serde_json::to_value(self.build()).unwrap()
    }
}

// ---------------------------------------------------------------------------
// Dashboard rows
// ---------------------------------------------------------------------------

pub fn project(id: &str, name: &str) -> Project {
    Project {
        id: id.to_string(),
        name: name.to_string(),
        project_id: format!("{id}-prod"),
        last_analyzed: "2026-03-13T09:00:00Z".to_string(),
        status: "active".to_string(),
    }
}

pub fn session(id: &str, project: &str, time_range: &str) -> Session {
    Session {
        id: id.to_string(),
        name: format!("{project} investigation"),
        time_range: time_range.to_string(),
        status: "open".to_string(),
        project: project.to_string(),
    }
}
