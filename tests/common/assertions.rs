//! Domain-specific assertion macros for logwise harnesses.
//!
//! These wrap `pretty_assertions` and add context-rich failure messages that
//! make it clear which bucketing invariant was violated.

/// Assert the per-bucket and whole-series invariants of a `BucketSeries`
/// built from `$input` records.
///
/// ```rust,ignore
/// assert_bucket_invariants!(series, logs.len());
/// ```
#[macro_export]
macro_rules! assert_bucket_invariants {
    ($series:expr, $input:expr) => {{
        let series: &logwise_core::BucketSeries = &$series;
        let input: usize = $input;
        for (i, bucket) in series.buckets.iter().enumerate() {
            assert_eq!(
                bucket.total,
                bucket.counts.sum(),
                "bucket {i} ({}): total disagrees with per-severity counts",
                bucket.label
            );
            assert_eq!(
                bucket.errors,
                bucket.counts[logwise_core::Severity::Error] + bucket.counts[logwise_core::Severity::Critical],
                "bucket {i} ({}): errors != ERROR + CRITICAL",
                bucket.label
            );
            assert_eq!(
                bucket.warnings,
                bucket.counts[logwise_core::Severity::Warning],
                "bucket {i} ({}): warnings != WARNING",
                bucket.label
            );
        }
        assert_eq!(
            series.total() as usize + series.dropped,
            input,
            "bucketed + dropped must account for every input record"
        );
    }};
}
