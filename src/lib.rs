//! logwise: terminal log investigation for a cloud logging backend.
//!
//! The binary is a thin shell over three crates:
//!
//! ```text
//! logwise-client ──► logwise-core ──► logwise-tui
//!  (HTTP backend)    (normalize,       (dashboard,
//!                     search, bucket)   investigations)
//! ```
//!
//! This crate adds the plain-text [`report`]s behind the one-shot
//! subcommands, and [`logs_report`] which chains the whole pipeline for
//! `logwise logs`.

pub mod report;

use logwise_client::{fetch_logs, BackendClient};
use logwise_core::{bucketize, prepare, search, Normalizer, RangeKey, RangeTable, Severity};

/// What `logwise logs` should fetch and show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogsRequest {
    pub range: RangeKey,
    /// Empty means every severity, in one request.
    pub severities: Vec<Severity>,
    pub search: String,
    pub full: bool,
}

/// Fetch, normalise, filter and render logs followed by the volume chart.
pub async fn logs_report(
    client: &BackendClient,
    table: &RangeTable,
    normalizer: &Normalizer,
    request: &LogsRequest,
) -> logwise_client::Result<String> {
    let raw = fetch_logs(client, table.get(request.range), &request.severities).await?;
    let records = prepare(&raw, normalizer);
    let visible = search::filter(&records, &request.search);
    tracing::info!(fetched = records.len(), shown = visible.len(), range = %request.range, "logs fetched");

    let series = bucketize(table, visible.iter().copied(), request.range);
    let mut out = report::log_listing(&visible, request.full);
    out.push('\n');
    out.push_str(&report::volume_chart(&series));
    Ok(out)
}
