//! Named time ranges and the static bucket layout for each of them.
//!
//! A [`RangeTable`] is built once (usually [`RangeTable::standard`]) and
//! shared by reference with the bucketizer. It is never mutated.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, TimeZone};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A supported investigation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeKey {
    #[serde(rename = "last-5m")]
    Last5m,
    #[serde(rename = "last-15m")]
    Last15m,
    #[serde(rename = "last-30m")]
    Last30m,
    #[serde(rename = "last-1h")]
    Last1h,
    #[serde(rename = "last-6h")]
    Last6h,
    #[serde(rename = "last-24h")]
    Last24h,
    #[serde(rename = "yesterday")]
    Yesterday,
    #[serde(rename = "last-7d")]
    Last7d,
}

impl RangeKey {
    pub const ALL: [RangeKey; 8] = [
        RangeKey::Last5m,
        RangeKey::Last15m,
        RangeKey::Last30m,
        RangeKey::Last1h,
        RangeKey::Last6h,
        RangeKey::Last24h,
        RangeKey::Yesterday,
        RangeKey::Last7d,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RangeKey::Last5m => "last-5m",
            RangeKey::Last15m => "last-15m",
            RangeKey::Last30m => "last-30m",
            RangeKey::Last1h => "last-1h",
            RangeKey::Last6h => "last-6h",
            RangeKey::Last24h => "last-24h",
            RangeKey::Yesterday => "yesterday",
            RangeKey::Last7d => "last-7d",
        }
    }

    /// Human-readable title, e.g. "Last 24 hours".
    pub fn title(self) -> &'static str {
        match self {
            RangeKey::Last5m => "Last 5 minutes",
            RangeKey::Last15m => "Last 15 minutes",
            RangeKey::Last30m => "Last 30 minutes",
            RangeKey::Last1h => "Last 1 hour",
            RangeKey::Last6h => "Last 6 hours",
            RangeKey::Last24h => "Last 24 hours",
            RangeKey::Yesterday => "Yesterday",
            RangeKey::Last7d => "Last 7 days",
        }
    }

    /// The following key in [`RangeKey::ALL`], wrapping around.
    pub fn next(self) -> RangeKey {
        RangeKey::ALL[(self as usize + 1) % RangeKey::ALL.len()]
    }

    fn accepted() -> String {
        RangeKey::ALL
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for RangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RangeKey::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| Error::UnknownRange {
                key: s.to_string(),
                expected: RangeKey::accepted(),
            })
    }
}

/// How a bucket's start instant is rendered as an axis label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelRule {
    MinuteSecond,
    Minute,
    HourMinute,
    Hour,
    MonthDay,
}

impl LabelRule {
    pub fn pattern(self) -> &'static str {
        match self {
            LabelRule::MinuteSecond => "%M:%S",
            LabelRule::Minute => "%M",
            LabelRule::HourMinute => "%H:%M",
            LabelRule::Hour => "%H:00",
            LabelRule::MonthDay => "%b %-d",
        }
    }

    pub fn format<Tz>(self, at: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        at.format(self.pattern()).to_string()
    }
}

/// Bucket layout for one [`RangeKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeConfig {
    pub buckets: usize,
    pub interval: TimeDelta,
    pub label: LabelRule,
}

impl RangeConfig {
    /// Total width of the window covered by the buckets.
    pub fn span(&self) -> TimeDelta {
        self.interval * self.buckets as i32
    }

    /// `(start_minutes_ago, end_minutes_ago)` for the backend's `/logs` query.
    pub fn fetch_window(&self) -> (i64, i64) {
        (self.span().num_minutes(), 0)
    }
}

/// Immutable lookup table from [`RangeKey`] to [`RangeConfig`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeTable {
    entries: [RangeConfig; RangeKey::ALL.len()],
}

impl RangeTable {
    /// The stock layouts used by the investigation view.
    pub fn standard() -> Self {
        let minute = TimeDelta::minutes(1);
        let hour = TimeDelta::hours(1);
        let cfg = |buckets, interval, label| RangeConfig { buckets, interval, label };
        Self {
            entries: [
                cfg(5, minute, LabelRule::MinuteSecond),
                cfg(15, minute, LabelRule::MinuteSecond),
                cfg(30, minute, LabelRule::Minute),
                cfg(12, TimeDelta::minutes(5), LabelRule::HourMinute),
                cfg(12, TimeDelta::minutes(30), LabelRule::Hour),
                cfg(24, hour, LabelRule::Hour),
                cfg(24, hour, LabelRule::Hour),
                cfg(7, TimeDelta::days(1), LabelRule::MonthDay),
            ],
        }
    }

    pub fn get(&self, key: RangeKey) -> &RangeConfig {
        &self.entries[key as usize]
    }
}

impl Default for RangeTable {
    fn default() -> Self {
        Self::standard()
    }
}
