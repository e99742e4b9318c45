//! Bucketizer: tallies log records into fixed-width time buckets for the
//! volume chart.
//!
//! The window is `[now − buckets × interval, now)`. `now` is captured once per
//! call so every record in one invocation is measured against the same
//! boundaries. Records outside the window, or whose timestamp or severity
//! cannot be read, are dropped and counted in [`BucketSeries::dropped`].

use std::ops::Index;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::range::{RangeKey, RangeTable};
use crate::types::{LogRecord, Severity};

/// Anything that can be placed on the time axis.
pub trait Bucketable {
    fn instant(&self) -> Option<DateTime<Utc>>;
    fn severity(&self) -> Option<Severity>;
}

impl<T: Bucketable + ?Sized> Bucketable for &T {
    fn instant(&self) -> Option<DateTime<Utc>> {
        (**self).instant()
    }

    fn severity(&self) -> Option<Severity> {
        (**self).severity()
    }
}

impl Bucketable for LogRecord {
    fn instant(&self) -> Option<DateTime<Utc>> {
        LogRecord::instant(self)
    }

    fn severity(&self) -> Option<Severity> {
        self.severity
    }
}

/// Per-severity counters; every severity is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeverityCounts([u64; Severity::ALL.len()]);

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> u64 {
        self.0[severity.index()]
    }

    pub fn sum(&self) -> u64 {
        self.0.iter().sum()
    }

    /// `(severity, count)` pairs, least important first.
    pub fn iter(&self) -> impl Iterator<Item = (Severity, u64)> + '_ {
        Severity::ALL.into_iter().map(move |s| (s, self.get(s)))
    }

    fn increment(&mut self, severity: Severity) {
        self.0[severity.index()] += 1;
    }
}

impl Index<Severity> for SeverityCounts {
    type Output = u64;

    fn index(&self, severity: Severity) -> &u64 {
        &self.0[severity.index()]
    }
}

/// One fixed-width slice of the chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bucket {
    /// Inclusive start of the slice.
    pub start: DateTime<Utc>,
    /// Exclusive end of the slice.
    pub end: DateTime<Utc>,
    pub label: String,
    pub counts: SeverityCounts,
    /// ERROR + CRITICAL.
    pub errors: u64,
    /// WARNING.
    pub warnings: u64,
    pub total: u64,
}

impl Bucket {
    /// Most important severity with a non-zero count.
    pub fn worst_severity(&self) -> Option<Severity> {
        self.counts.iter().filter(|(_, n)| *n > 0).map(|(s, _)| s).last()
    }

    fn record(&mut self, severity: Severity) {
        self.counts.increment(severity);
        self.total += 1;
        match severity {
            Severity::Error | Severity::Critical => self.errors += 1,
            Severity::Warning => self.warnings += 1,
            _ => {}
        }
    }
}

/// Result of one bucketize call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketSeries {
    pub range: RangeKey,
    /// The instant the window was measured from.
    pub now: DateTime<Utc>,
    /// Oldest first; length equals the range's configured bucket count.
    pub buckets: Vec<Bucket>,
    /// Records that fell outside the window or had no usable timestamp or
    /// severity.
    pub dropped: usize,
}

impl BucketSeries {
    pub fn total(&self) -> u64 {
        self.buckets.iter().map(|b| b.total).sum()
    }

    /// Largest single-bucket total, used to scale the chart.
    pub fn peak(&self) -> u64 {
        self.buckets.iter().map(|b| b.total).max().unwrap_or(0)
    }
}

/// Bucketize `logs` over `range`, measured from the current instant.
pub fn bucketize<I>(table: &RangeTable, logs: I, range: RangeKey) -> BucketSeries
where
    I: IntoIterator,
    I::Item: Bucketable,
{
    bucketize_at(table, logs, range, Utc::now())
}

/// Bucketize `logs` over `range`, measured from `now`.
pub fn bucketize_at<I>(table: &RangeTable, logs: I, range: RangeKey, now: DateTime<Utc>) -> BucketSeries
where
    I: IntoIterator,
    I::Item: Bucketable,
{
    let cfg = table.get(range);
    let window_start = now - cfg.span();
    let interval_ms = cfg.interval.num_milliseconds();

    let mut buckets: Vec<Bucket> = (0..cfg.buckets)
        .map(|i| {
            let start = now - cfg.interval * (cfg.buckets - i) as i32;
            Bucket {
                start,
                end: start + cfg.interval,
                label: cfg.label.format(&start.with_timezone(&Local)),
                counts: SeverityCounts::default(),
                errors: 0,
                warnings: 0,
                total: 0,
            }
        })
        .collect();

    let mut dropped = 0;
    for log in logs {
        // Buckets cover exactly [window_start, now), at full precision.
        let slot = log
            .instant()
            .filter(|t| *t >= window_start && *t < now)
            .and_then(|t| {
                let idx = (t - window_start).num_milliseconds() / interval_ms;
                usize::try_from(idx).ok().filter(|&i| i < buckets.len())
            });
        match (slot, log.severity()) {
            (Some(idx), Some(severity)) => buckets[idx].record(severity),
            _ => dropped += 1,
        }
    }

    BucketSeries { range, now, buckets, dropped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    struct Point {
        at: Option<DateTime<Utc>>,
        severity: Option<Severity>,
    }

    impl Bucketable for Point {
        fn instant(&self) -> Option<DateTime<Utc>> {
            self.at
        }

        fn severity(&self) -> Option<Severity> {
            self.severity
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 19, 14, 0, 0).unwrap()
    }

    fn point(secs_ago: i64, severity: Severity) -> Point {
        Point {
            at: Some(now() - TimeDelta::seconds(secs_ago)),
            severity: Some(severity),
        }
    }

    #[test]
    fn empty_input_still_yields_every_bucket() {
        let table = RangeTable::standard();
        let series = bucketize_at(&table, Vec::<Point>::new(), RangeKey::Last1h, now());
        assert_eq!(series.buckets.len(), 12);
        assert_eq!(series.total(), 0);
        assert_eq!(series.dropped, 0);
    }

    #[test]
    fn buckets_are_contiguous_and_end_at_now() {
        let table = RangeTable::standard();
        let series = bucketize_at(&table, Vec::<Point>::new(), RangeKey::Last7d, now());
        assert_eq!(series.buckets.len(), 7);
        assert_eq!(series.buckets[0].start, now() - TimeDelta::days(7));
        for pair in series.buckets.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert_eq!(series.buckets.last().unwrap().end, now());
    }

    #[test]
    fn five_minute_scenario() {
        let table = RangeTable::standard();
        let logs = vec![
            point(90, Severity::Error),
            point(200, Severity::Warning),
            point(700, Severity::Info),
        ];
        let series = bucketize_at(&table, &logs, RangeKey::Last5m, now());

        assert_eq!(series.total(), 2);
        assert_eq!(series.dropped, 1);

        let error_at = now() - TimeDelta::seconds(90);
        let warn_at = now() - TimeDelta::seconds(200);
        let error_bucket = series
            .buckets
            .iter()
            .find(|b| b.start <= error_at && error_at < b.end)
            .unwrap();
        assert_eq!(error_bucket.errors, 1);
        assert_eq!(error_bucket.counts[Severity::Error], 1);
        let warn_bucket = series
            .buckets
            .iter()
            .find(|b| b.start <= warn_at && warn_at < b.end)
            .unwrap();
        assert_eq!(warn_bucket.warnings, 1);
        assert_eq!(series.buckets.iter().map(|b| b.counts[Severity::Info]).sum::<u64>(), 0);
    }

    #[test]
    fn window_is_half_open() {
        let table = RangeTable::standard();
        let logs = vec![
            // exactly at the window start: counted in bucket 0
            point(300, Severity::Info),
            // exactly at `now`: outside
            point(0, Severity::Info),
            // in the future: outside
            point(-30, Severity::Info),
        ];
        let series = bucketize_at(&table, &logs, RangeKey::Last5m, now());
        assert_eq!(series.buckets[0].total, 1);
        assert_eq!(series.total(), 1);
        assert_eq!(series.dropped, 2);
    }

    #[test]
    fn sub_millisecond_edges_respect_the_window() {
        let table = RangeTable::standard();
        let window_start = now() - table.get(RangeKey::Last5m).span();
        let at = |t: DateTime<Utc>| Point { at: Some(t), severity: Some(Severity::Error) };
        let logs = vec![
            at(window_start - TimeDelta::microseconds(500)),
            at(window_start - TimeDelta::nanoseconds(1)),
            at(now() + TimeDelta::microseconds(500)),
            // inside, just before `now`: last bucket
            at(now() - TimeDelta::microseconds(500)),
            // inside, just past the start: first bucket
            at(window_start + TimeDelta::microseconds(500)),
            // just before an interior boundary: previous bucket
            at(window_start + TimeDelta::minutes(1) - TimeDelta::microseconds(500)),
        ];
        let series = bucketize_at(&table, &logs, RangeKey::Last5m, now());
        assert_eq!(series.dropped, 3);
        assert_eq!(series.total(), 3);
        assert_eq!(series.buckets[0].total, 2);
        assert_eq!(series.buckets[4].total, 1);
    }

    #[test]
    fn unusable_records_are_dropped() {
        let table = RangeTable::standard();
        let logs = vec![
            Point { at: None, severity: Some(Severity::Error) },
            Point { at: Some(now() - TimeDelta::seconds(10)), severity: None },
        ];
        let series = bucketize_at(&table, &logs, RangeKey::Last5m, now());
        assert_eq!(series.total(), 0);
        assert_eq!(series.dropped, 2);
    }

    #[test]
    fn critical_counts_as_error_and_notice_as_neither() {
        let table = RangeTable::standard();
        let logs = vec![
            point(10, Severity::Critical),
            point(11, Severity::Error),
            point(12, Severity::Notice),
            point(13, Severity::Alert),
        ];
        let series = bucketize_at(&table, &logs, RangeKey::Last5m, now());
        let last = series.buckets.last().unwrap();
        assert_eq!(last.total, 4);
        assert_eq!(last.errors, 2);
        assert_eq!(last.warnings, 0);
        assert_eq!(last.worst_severity(), Some(Severity::Alert));
    }

    #[test]
    fn labels_follow_the_range_rule() {
        let table = RangeTable::standard();
        let series = bucketize_at(&table, Vec::<Point>::new(), RangeKey::Last1h, now());
        for bucket in &series.buckets {
            let expected = bucket.start.with_timezone(&Local).format("%H:%M").to_string();
            assert_eq!(bucket.label, expected);
        }
    }

    #[test]
    fn same_instant_gives_identical_series() {
        let table = RangeTable::standard();
        let logs = vec![point(30, Severity::Error), point(4000, Severity::Warning)];
        let a = bucketize_at(&table, &logs, RangeKey::Last6h, now());
        let b = bucketize_at(&table, &logs, RangeKey::Last6h, now());
        assert_eq!(a, b);
    }

    #[test]
    fn records_from_the_backend_are_bucketable() {
        let table = RangeTable::standard();
        let recent = (Utc::now() - TimeDelta::seconds(30)).to_rfc3339();
        let logs = vec![LogRecord {
            timestamp: recent,
            severity: Some(Severity::Warning),
            message: "disk almost full".into(),
            resource_type: String::new(),
            labels: Default::default(),
        }];
        let series = bucketize(&table, &logs, RangeKey::Last5m);
        assert_eq!(series.total(), 1);
        assert_eq!(series.buckets.iter().map(|b| b.warnings).sum::<u64>(), 1);
    }

    fn any_severity() -> impl Strategy<Value = Severity> {
        (0..Severity::ALL.len()).prop_map(|i| Severity::ALL[i])
    }

    fn any_range() -> impl Strategy<Value = RangeKey> {
        (0..RangeKey::ALL.len()).prop_map(|i| RangeKey::ALL[i])
    }

    proptest! {
        #[test]
        fn bucket_invariants_hold(
            range in any_range(),
            offsets in prop::collection::vec((-86_400i64..900_000, any_severity()), 0..200),
            edges in prop::collection::vec((-2_000i64..2_000, any::<bool>()), 0..20),
        ) {
            let table = RangeTable::standard();
            let cfg = table.get(range);
            let mut logs: Vec<Point> = offsets
                .iter()
                .map(|(secs, sev)| point(*secs, *sev))
                .collect();
            // Sub-millisecond offsets around both window edges.
            logs.extend(edges.iter().map(|&(micros, at_start)| {
                let edge = if at_start { now() - cfg.span() } else { now() };
                Point { at: Some(edge + TimeDelta::microseconds(micros)), severity: Some(Severity::Info) }
            }));
            let series = bucketize_at(&table, &logs, range, now());

            prop_assert_eq!(series.buckets.len(), cfg.buckets);
            prop_assert!(series.total() as usize <= logs.len());
            prop_assert_eq!(series.total() as usize + series.dropped, logs.len());

            let window_start = now() - cfg.span();
            let in_window = logs
                .iter()
                .filter(|p| p.at.is_some_and(|t| t >= window_start && t < now()))
                .count();
            prop_assert_eq!(series.total() as usize, in_window);

            for bucket in &series.buckets {
                prop_assert_eq!(bucket.total, bucket.counts.sum());
                prop_assert_eq!(
                    bucket.errors,
                    bucket.counts[Severity::Error] + bucket.counts[Severity::Critical]
                );
                prop_assert_eq!(bucket.warnings, bucket.counts[Severity::Warning]);
            }
        }
    }
}
