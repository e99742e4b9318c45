//! Investigation log fetches.
//!
//! The backend filters by at most one severity per request, so a
//! multi-severity view issues one request per ticked level concurrently and
//! merges the results. A [`RequestSequencer`] lets the caller drop responses
//! that arrive after a newer fetch was started.

use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::try_join_all;
use logwise_core::{LogRecord, RangeConfig, Severity};

use crate::client::{BackendClient, LogQuery};
use crate::error::Result;

/// Fetch the logs for one investigation view.
///
/// An empty `severities` slice means "every severity" and issues a single
/// unfiltered request. Any failed request fails the whole fetch. The merged
/// list is ordered newest first; records with unparseable timestamps go last.
pub async fn fetch_logs(
    client: &BackendClient,
    range: &RangeConfig,
    severities: &[Severity],
) -> Result<Vec<LogRecord>> {
    let (start, end) = range.fetch_window();

    let mut records = if severities.is_empty() {
        client.logs(LogQuery::new(start, end, None)).await?
    } else {
        let batches = try_join_all(
            severities
                .iter()
                .map(|severity| client.logs(LogQuery::new(start, end, Some(*severity)))),
        )
        .await?;
        batches.into_iter().flatten().collect()
    };

    sort_newest_first(&mut records);
    tracing::debug!(count = records.len(), levels = severities.len(), "investigation logs merged");
    Ok(records)
}

/// Stable newest-first sort; records without a parseable instant sink.
pub fn sort_newest_first(records: &mut [LogRecord]) {
    records.sort_by_cached_key(|r| Reverse(r.instant()));
}

// ---------------------------------------------------------------------------
// Sequencing
// ---------------------------------------------------------------------------

/// Monotonic tags for in-flight requests of one kind.
///
/// Each new request takes a fresh tag via [`issue`](Self::issue); a response
/// is applied only while its tag is still [`is_current`](Self::is_current).
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, seq: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == seq
    }

    /// Tag of the most recently issued request (0 if none yet).
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logwise_core::LogMessage;

    fn record(ts: &str) -> LogRecord {
        LogRecord {
            timestamp: ts.to_string(),
            severity: Some(Severity::Info),
            message: LogMessage::from(ts),
            resource_type: String::new(),
            labels: Default::default(),
        }
    }

    #[test]
    fn newest_first_with_unparseable_last() {
        let mut records = vec![
            record("2024-06-19T14:00:00Z"),
            record("garbage"),
            record("2024-06-19T15:00:00Z"),
            record("2024-06-19 14:30:00+00:00"),
        ];
        sort_newest_first(&mut records);
        let order: Vec<&str> = records.iter().map(|r| r.timestamp.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "2024-06-19T15:00:00Z",
                "2024-06-19 14:30:00+00:00",
                "2024-06-19T14:00:00Z",
                "garbage",
            ]
        );
    }

    #[test]
    fn only_latest_tag_is_current() {
        let seq = RequestSequencer::new();
        assert_eq!(seq.latest(), 0);
        let first = seq.issue();
        assert!(seq.is_current(first));
        let second = seq.issue();
        assert!(!seq.is_current(first));
        assert!(seq.is_current(second));
        assert!(second > first);
    }
}
