//! Client-side text search over display records.
//!
//! Matching is a case-insensitive substring test against both the short and
//! the full message. An empty query matches everything.

use crate::display::DisplayLogRecord;

pub fn matches(record: &DisplayLogRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    record.short_message.to_lowercase().contains(&needle)
        || record.full_message.to_lowercase().contains(&needle)
}

/// Records matching `query`, in their original order.
pub fn filter<'a>(records: &'a [DisplayLogRecord], query: &str) -> Vec<&'a DisplayLogRecord> {
    records.iter().filter(|r| matches(r, query)).collect()
}
