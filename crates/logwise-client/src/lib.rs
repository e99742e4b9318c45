//! logwise-client: async access to the log-analysis backend.
//!
//! [`BackendClient`] wraps the backend's six JSON endpoints. [`fetch`] builds
//! the multi-severity investigation fetch on top of it.

pub mod client;
pub mod error;
pub mod fetch;

pub use client::{BackendClient, LogQuery};
pub use error::{ClientError, Result};
pub use fetch::{fetch_logs, sort_newest_first, RequestSequencer};
