//! Plain-text renderers for the one-shot CLI subcommands.
//!
//! Every function returns a `String` so the output can be snapshot-tested;
//! `main` just prints it.

use std::fmt::Write;

use logwise_client::ClientError;
use logwise_core::{BucketSeries, DisplayLogRecord, Project, Session};

/// Width of the longest bar in [`volume_chart`].
pub const CHART_WIDTH: usize = 40;

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

pub fn projects_table(projects: &[Project]) -> String {
    if projects.is_empty() {
        return "no projects\n".to_string();
    }
    let rows: Vec<[&str; 5]> = projects
        .iter()
        .map(|p| [p.id.as_str(), p.name.as_str(), p.project_id.as_str(), p.status.as_str(), p.last_analyzed.as_str()])
        .collect();
    table(&["ID", "NAME", "PROJECT", "STATUS", "LAST ANALYZED"], &rows)
}

pub fn sessions_table(sessions: &[Session]) -> String {
    if sessions.is_empty() {
        return "no sessions\n".to_string();
    }
    let rows: Vec<[&str; 5]> = sessions
        .iter()
        .map(|s| [s.id.as_str(), s.name.as_str(), s.project.as_str(), s.time_range.as_str(), s.status.as_str()])
        .collect();
    table(&["ID", "NAME", "PROJECT", "RANGE", "STATUS"], &rows)
}

/// Left-aligned columns, two spaces apart, padded to the widest cell.
fn table<const N: usize>(header: &[&str; N], rows: &[[&str; N]]) -> String {
    let mut widths = header.map(|h| h.chars().count());
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in std::iter::once(header).chain(rows) {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = writeln!(out, "{}", line.trim_end());
    }
    out
}

/// `healthy`, `unreachable` (no answer at all) or `unhealthy` (answered
/// with an error).
pub fn health_line(base_url: &str, outcome: &Result<(), ClientError>) -> String {
    match outcome {
        Ok(()) => format!("healthy: {base_url}"),
        Err(err) if err.is_unreachable() => format!("unreachable: {base_url} ({err})"),
        Err(err) => format!("unhealthy: {base_url} ({err})"),
    }
}

// ---------------------------------------------------------------------------
// Logs
// ---------------------------------------------------------------------------

/// One line per record: timestamp, severity, short message. With `full`,
/// the full message follows each line, indented, with resource and labels.
pub fn log_listing(records: &[&DisplayLogRecord], full: bool) -> String {
    if records.is_empty() {
        return "no logs\n".to_string();
    }
    let mut out = String::new();
    for record in records {
        let _ = writeln!(out, "{}  {:<9}  {}", record.timestamp, record.severity_label(), record.short_message);
        if full {
            if !record.resource_type.is_empty() {
                let _ = writeln!(out, "    resource: {}", record.resource_type);
            }
            for (key, value) in &record.labels {
                let _ = writeln!(out, "    {key}={value}");
            }
            for line in record.full_message.lines() {
                let _ = writeln!(out, "    {line}");
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Chart
// ---------------------------------------------------------------------------

/// Horizontal bar chart, one row per bucket, oldest first.
///
/// Bars are scaled to the busiest bucket; a non-empty bucket always gets at
/// least one mark.
pub fn volume_chart(series: &BucketSeries) -> String {
    let peak = series.peak();
    let label_width = series.buckets.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "{}: {} logs", series.range.title(), series.total());
    for bucket in &series.buckets {
        let len = match (bucket.total, peak) {
            (0, _) | (_, 0) => 0,
            (n, p) => ((n as usize * CHART_WIDTH) / p as usize).max(1),
        };
        let _ = writeln!(
            out,
            "{:<label_width$}  {:<CHART_WIDTH$}  {:>4}  (err {}, warn {})",
            bucket.label,
            "#".repeat(len),
            bucket.total,
            bucket.errors,
            bucket.warnings,
        );
    }
    let _ = writeln!(out, "dropped: {}", series.dropped);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone, Utc};
    use logwise_core::{bucketize_at, LogMessage, LogRecord, Normalizer, RangeKey, RangeTable, Severity};
    use pretty_assertions::assert_eq;

    fn project(id: &str, name: &str) -> Project {
        Project {
            id: id.into(),
            name: name.into(),
            project_id: format!("gcp-{id}"),
            last_analyzed: "2026-01-01".into(),
            status: "active".into(),
        }
    }

    #[test]
    fn empty_tables_say_so() {
        assert_eq!(projects_table(&[]), "no projects\n");
        assert_eq!(sessions_table(&[]), "no sessions\n");
        assert_eq!(log_listing(&[], false), "no logs\n");
    }

    #[test]
    fn projects_are_column_aligned() {
        let out = projects_table(&[project("1", "Checkout"), project("22", "Search")]);
        insta::assert_snapshot!(out, @r"
        ID  NAME      PROJECT  STATUS  LAST ANALYZED
        1   Checkout  gcp-1    active  2026-01-01
        22  Search    gcp-22   active  2026-01-01
        ");
    }

    #[test]
    fn health_line_tells_no_answer_from_bad_answer() {
        let url = "http://localhost:8000";
        assert_eq!(health_line(url, &Ok(())), "healthy: http://localhost:8000");

        let timeout = ClientError::Timeout { path: "/".into(), timeout: std::time::Duration::from_secs(2) };
        assert_eq!(
            health_line(url, &Err(timeout)),
            "unreachable: http://localhost:8000 (request to / timed out after 2s)"
        );

        let status = ClientError::Status {
            path: "/".into(),
            status: axum::http::StatusCode::SERVICE_UNAVAILABLE,
            body: "down".into(),
        };
        assert_eq!(
            health_line(url, &Err(status)),
            "unhealthy: http://localhost:8000 (/ returned 503 Service Unavailable: down)"
        );
    }

    #[test]
    fn full_listing_indents_message_and_labels() {
        let record = LogRecord {
            timestamp: "2026-10-19T10:00:00Z".into(),
            severity: Some(Severity::Error),
            message: LogMessage::from("boom\nat line 3"),
            resource_type: "gce_instance".into(),
            labels: [("zone".to_string(), "eu-west1".to_string())].into(),
        };
        let display = DisplayLogRecord::from_record(0, &record, &Normalizer::default());

        assert_eq!(log_listing(&[&display], false), "2026-10-19T10:00:00Z  ERROR      boom\n");
        insta::assert_snapshot!(log_listing(&[&display], true), @r"
        2026-10-19T10:00:00Z  ERROR      boom
            resource: gce_instance
            zone=eu-west1
            boom
            at line 3
        ");
    }

    #[test]
    fn chart_scales_to_peak_and_reports_dropped() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();
        let at = |secs: i64, severity| LogRecord {
            timestamp: (now - TimeDelta::seconds(secs)).to_rfc3339(),
            severity: Some(severity),
            message: LogMessage::from("x"),
            resource_type: String::new(),
            labels: Default::default(),
        };
        let logs = vec![
            at(30, Severity::Error),
            at(40, Severity::Error),
            at(200, Severity::Warning),
            at(700, Severity::Info),
        ];
        let series = bucketize_at(&RangeTable::standard(), &logs, RangeKey::Last5m, now);
        let out = volume_chart(&series);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 1 + 5 + 1);
        assert_eq!(lines[0], "Last 5 minutes: 3 logs");
        assert_eq!(lines[6], "dropped: 1");
        // Newest bucket holds the peak and gets the full-width bar.
        assert!(lines[5].contains(&"#".repeat(CHART_WIDTH)), "{}", lines[5]);
        assert!(lines[5].ends_with("2  (err 2, warn 0)"), "{}", lines[5]);
        let half = format!(" {}{} ", "#".repeat(CHART_WIDTH / 2), " ".repeat(CHART_WIDTH / 2));
        assert!(lines[2].contains(&half), "{}", lines[2]);
    }
}
