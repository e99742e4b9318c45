//! Async client for the log-analysis backend's JSON-over-HTTP API.
//!
//! Every call is bounded by the configured deadline; there is no automatic
//! retry. Callers turn failures into UI state and offer a manual retry.

use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{header, Method, Request, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use logwise_core::config::BackendConfig;
use logwise_core::{LogRecord, Project, Session, Severity};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct LogsResponse {
    logs: Vec<LogRecord>,
}

#[derive(Debug, Serialize)]
struct StartSessionRequest<'a> {
    #[serde(rename = "projectId")]
    project_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct StartSessionResponse {
    #[serde(rename = "sessionId")]
    session_id: String,
}

#[derive(Debug, Serialize)]
struct ExplainRequest<'a> {
    log_message: &'a str,
    project_description: &'a str,
}

#[derive(Debug, Deserialize)]
struct ExplainResponse {
    explanation: String,
}

/// Query parameters for `GET /logs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogQuery {
    pub start_minutes_ago: i64,
    pub end_minutes_ago: i64,
    pub severity: Option<Severity>,
}

impl LogQuery {
    pub fn new(start_minutes_ago: i64, end_minutes_ago: i64, severity: Option<Severity>) -> Self {
        Self { start_minutes_ago, end_minutes_ago, severity }
    }

    pub fn path_and_query(&self) -> String {
        let mut path = format!(
            "/logs?start_minutes_ago={}&end_minutes_ago={}",
            self.start_minutes_ago, self.end_minutes_ago
        );
        if let Some(severity) = self.severity {
            path.push_str("&severity=");
            path.push_str(severity.as_str());
        }
        path
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct BackendClient {
    http: Client<HttpConnector, Full<Bytes>>,
    base_url: String,
    timeout: Duration,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl BackendClient {
    /// `base_url` must be an absolute `http://` URL; a trailing `/` is ignored.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let uri: Uri = base_url.parse().map_err(|source| ClientError::InvalidUrl {
            url: base_url.clone(),
            source,
        })?;
        if uri.scheme_str() != Some("http") || uri.authority().is_none() {
            return Err(ClientError::UnsupportedScheme(base_url));
        }

        let http = Client::builder(TokioExecutor::new()).build_http();
        Ok(Self { http, base_url, timeout })
    }

    pub fn from_config(cfg: &BackendConfig) -> Result<Self> {
        Self::new(&cfg.base_url, cfg.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `GET /`. Any success status counts as healthy.
    pub async fn health(&self) -> Result<()> {
        self.send(Method::GET, "/", None).await.map(|_| ())
    }

    pub async fn health_check(&self) -> bool {
        match self.health().await {
            Ok(()) => true,
            Err(err) => {
                tracing::debug!(error = %err, "health check failed");
                false
            }
        }
    }

    pub async fn projects(&self) -> Result<Vec<Project>> {
        self.get_json("/dashboard/projects").await
    }

    pub async fn sessions(&self) -> Result<Vec<Session>> {
        self.get_json("/dashboard/sessions").await
    }

    /// Start a new investigation session and return its id.
    pub async fn start_session(&self, project_id: &str) -> Result<String> {
        let resp: StartSessionResponse = self
            .post_json("/dashboard/start-session", &StartSessionRequest { project_id })
            .await?;
        tracing::info!(project_id, session_id = %resp.session_id, "session started");
        Ok(resp.session_id)
    }

    pub async fn logs(&self, query: LogQuery) -> Result<Vec<LogRecord>> {
        let resp: LogsResponse = self.get_json(&query.path_and_query()).await?;
        tracing::debug!(
            count = resp.logs.len(),
            severity = ?query.severity,
            start_minutes_ago = query.start_minutes_ago,
            "logs fetched"
        );
        Ok(resp.logs)
    }

    /// Ask the backend for a natural-language explanation of one log message.
    pub async fn explain(&self, log_message: &str, project_description: &str) -> Result<String> {
        let resp: ExplainResponse = self
            .post_json("/explain", &ExplainRequest { log_message, project_description })
            .await?;
        Ok(resp.explanation)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.send(Method::GET, path, None).await?;
        decode(path, &body)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, payload: &B) -> Result<T> {
        let encoded = serde_json::to_vec(payload).map_err(|source| ClientError::Encode {
            path: path.to_string(),
            source,
        })?;
        let body = self.send(Method::POST, path, Some(Bytes::from(encoded))).await?;
        decode(path, &body)
    }

    /// Issue one request and collect the response body, failing on non-2xx.
    async fn send(&self, method: Method, path: &str, body: Option<Bytes>) -> Result<Bytes> {
        let url = format!("{}{}", self.base_url, path);
        let mut builder = Request::builder()
            .method(method.clone())
            .uri(url)
            .header(header::ACCEPT, "application/json");
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        let request = builder
            .body(Full::new(body.unwrap_or_default()))
            .map_err(|source| ClientError::Request { path: path.to_string(), source })?;

        tracing::debug!(%method, path, "backend request");

        let exchange = async {
            let response = self
                .http
                .request(request)
                .await
                .map_err(|source| ClientError::Transport { path: path.to_string(), source })?;
            let status = response.status();
            let bytes = response
                .into_body()
                .collect()
                .await
                .map_err(|source| ClientError::Body { path: path.to_string(), source })?
                .to_bytes();
            Ok::<_, ClientError>((status, bytes))
        };

        let (status, bytes) = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| ClientError::Timeout {
                path: path.to_string(),
                timeout: self.timeout,
            })??;

        if !status.is_success() {
            let err = ClientError::Status {
                path: path.to_string(),
                status,
                body: String::from_utf8_lossy(&bytes).trim().to_string(),
            };
            tracing::warn!(error = %err, "backend returned an error status");
            return Err(err);
        }
        Ok(bytes)
    }
}

fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|source| ClientError::Decode {
        path: path.to_string(),
        source,
    })
}
