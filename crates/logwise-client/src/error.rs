//! Error type for backend requests.

use std::time::Duration;

use hyper::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid backend url {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: hyper::http::uri::InvalidUri,
    },

    #[error("unsupported backend url {0:?} (only http:// is supported)")]
    UnsupportedScheme(String),

    #[error("building request for {path} failed: {source}")]
    Request {
        path: String,
        #[source]
        source: hyper::http::Error,
    },

    #[error("encoding request body for {path} failed: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("request to {path} timed out after {timeout:?}")]
    Timeout { path: String, timeout: Duration },

    #[error("request to {path} failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: hyper_util::client::legacy::Error,
    },

    #[error("reading response from {path} failed: {source}")]
    Body {
        path: String,
        #[source]
        source: hyper::Error,
    },

    #[error("{path} returned {status}: {body}")]
    Status {
        path: String,
        status: StatusCode,
        body: String,
    },

    #[error("unexpected response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    /// Whether the backend could not be reached at all (as opposed to
    /// answering with something unexpected).
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClientError::Timeout { .. } | ClientError::Transport { .. })
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
