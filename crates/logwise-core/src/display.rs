//! Display-ready log records.
//!
//! A [`DisplayLogRecord`] is built once per fetch from a backend
//! [`LogRecord`] and never mutated afterwards; the next fetch replaces the
//! whole list.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::bucket::Bucketable;
use crate::normalizer::Normalizer;
use crate::types::{LogRecord, Severity};

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayLogRecord {
    /// `log-<index>-<timestamp>`. Unique within one fetch only.
    pub id: String,
    pub timestamp: String,
    pub instant: Option<DateTime<Utc>>,
    pub severity: Option<Severity>,
    pub short_message: String,
    pub full_message: String,
    pub resource_type: String,
    pub labels: BTreeMap<String, String>,
}

impl DisplayLogRecord {
    pub fn from_record(index: usize, record: &LogRecord, normalizer: &Normalizer) -> Self {
        Self {
            id: format!("log-{index}-{}", record.timestamp),
            timestamp: record.timestamp.clone(),
            instant: record.instant(),
            severity: record.severity,
            short_message: normalizer.short_message(&record.message),
            full_message: normalizer.full_message(&record.message),
            resource_type: record.resource_type.clone(),
            labels: record.labels.clone(),
        }
    }

    /// Severity name, or `-` for levels outside the known scale.
    pub fn severity_label(&self) -> &'static str {
        self.severity.map_or("-", Severity::as_str)
    }
}

impl Bucketable for DisplayLogRecord {
    fn instant(&self) -> Option<DateTime<Utc>> {
        self.instant
    }

    fn severity(&self) -> Option<Severity> {
        self.severity
    }
}

/// Normalise a fetched batch and order it newest first.
///
/// Identifiers are assigned from the batch order before sorting. Records
/// without a parseable timestamp sink to the end, keeping their relative
/// order.
pub fn prepare(records: &[LogRecord], normalizer: &Normalizer) -> Vec<DisplayLogRecord> {
    let mut out: Vec<DisplayLogRecord> = records
        .iter()
        .enumerate()
        .map(|(i, r)| DisplayLogRecord::from_record(i, r, normalizer))
        .collect();
    out.sort_by(|a, b| b.instant.cmp(&a.instant));
    out
}
