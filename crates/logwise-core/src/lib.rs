//! logwise-core: the pure core of logwise.
//!
//! Everything here is synchronous and side-effect free apart from
//! [`config::Config::load`].
//!
//! # Pipeline
//!
//! ```text
//! LogRecord ──► normalizer ──► DisplayLogRecord ──► search ──► bucket
//!  (backend)    (short/full)      (display)         (filter)   (chart)
//! ```

pub mod bucket;
pub mod config;
pub mod display;
pub mod error;
pub mod normalizer;
pub mod range;
pub mod search;
pub mod types;

pub use bucket::{bucketize, bucketize_at, Bucket, BucketSeries, Bucketable, SeverityCounts};
pub use display::{prepare, DisplayLogRecord};
pub use error::{Error, Result};
pub use normalizer::Normalizer;
pub use range::{LabelRule, RangeConfig, RangeKey, RangeTable};
pub use types::{LogMessage, LogRecord, Project, Session, Severity};
