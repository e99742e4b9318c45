//! Fake investigation backend for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `GET /`: liveness
//! - `GET /dashboard/projects`, `GET /dashboard/sessions`
//! - `POST /dashboard/start-session`: returns `sess-<n>`
//! - `GET /logs`: configured records, filtered by `severity` when given
//! - `POST /explain`: echoes the request back as the explanation
//!
//! Every `/logs` query and every request body is recorded so tests can
//! assert on what the client sent.
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = FakeBackend::start().await.unwrap();
//! backend.add_log(LogRecordBuilder::new("boom").severity(Severity::Error).json()).await;
//! let client = BackendClient::new(&backend.base_url(), Duration::from_secs(2)).unwrap();
//! ```

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// State shared between the router and test code.
#[derive(Default)]
struct BackendState {
    projects: Vec<Value>,
    sessions: Vec<Value>,
    logs: Vec<Value>,
    /// `/logs` requests for this severity answer 500.
    failing_severity: Option<String>,
    /// Every route answers this status when set.
    outage: Option<StatusCode>,
    /// Added before every `/logs` response.
    logs_delay: Option<Duration>,
    log_queries: Vec<HashMap<String, String>>,
    started: Vec<Value>,
    explained: Vec<Value>,
}

type Shared = Arc<Mutex<BackendState>>;

/// Handle to the running fake backend.
pub struct FakeBackend {
    addr: SocketAddr,
    state: Shared,
}

impl FakeBackend {
    /// Start the fake backend on a random port. Returns once the server is
    /// listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state: Shared = Arc::default();

        let app = Router::new()
            .route("/", get(health))
            .route("/dashboard/projects", get(projects))
            .route("/dashboard/sessions", get(sessions))
            .route("/dashboard/start-session", post(start_session))
            .route("/logs", get(logs))
            .route("/explain", post(explain))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// Base URL for the API (e.g. `http://127.0.0.1:PORT`).
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn set_projects(&self, projects: Value) {
        self.state.lock().await.projects = as_array(projects);
    }

    pub async fn set_sessions(&self, sessions: Value) {
        self.state.lock().await.sessions = as_array(sessions);
    }

    pub async fn add_log(&self, record: Value) {
        self.state.lock().await.logs.push(record);
    }

    pub async fn fail_severity(&self, severity: &str) {
        self.state.lock().await.failing_severity = Some(severity.to_string());
    }

    pub async fn outage(&self, status: StatusCode) {
        self.state.lock().await.outage = Some(status);
    }

    pub async fn delay_logs(&self, delay: Duration) {
        self.state.lock().await.logs_delay = Some(delay);
    }

    /// Query strings of every `/logs` request so far, in arrival order.
    pub async fn log_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.lock().await.log_queries.clone()
    }

    pub async fn started(&self) -> Vec<Value> {
        self.state.lock().await.started.clone()
    }

    pub async fn explained(&self) -> Vec<Value> {
        self.state.lock().await.explained.clone()
    }
}

fn as_array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

fn outage_response(status: StatusCode) -> Response {
    (status, "backend unavailable").into_response()
}

async fn health(State(state): State<Shared>) -> Response {
    match state.lock().await.outage {
        Some(status) => outage_response(status),
        None => Json(json!({ "status": "ok" })).into_response(),
    }
}

async fn projects(State(state): State<Shared>) -> Response {
    let state = state.lock().await;
    match state.outage {
        Some(status) => outage_response(status),
        None => Json(state.projects.clone()).into_response(),
    }
}

async fn sessions(State(state): State<Shared>) -> Response {
    let state = state.lock().await;
    match state.outage {
        Some(status) => outage_response(status),
        None => Json(state.sessions.clone()).into_response(),
    }
}

async fn start_session(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().await;
    if let Some(status) = state.outage {
        return outage_response(status);
    }
    state.started.push(body);
    let id = format!("sess-{}", state.started.len());
    Json(json!({ "sessionId": id })).into_response()
}

async fn logs(State(state): State<Shared>, Query(query): Query<HashMap<String, String>>) -> Response {
    let delay = {
        let mut state = state.lock().await;
        state.log_queries.push(query.clone());
        state.logs_delay
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let state = state.lock().await;
    if let Some(status) = state.outage {
        return outage_response(status);
    }
    let wanted = query.get("severity");
    if wanted.is_some() && wanted == state.failing_severity.as_ref() {
        return (StatusCode::INTERNAL_SERVER_ERROR, "severity query failed").into_response();
    }
    let logs: Vec<Value> = state
        .logs
        .iter()
        .filter(|log| wanted.map_or(true, |w| log["severity"].as_str() == Some(w.as_str())))
        .cloned()
        .collect();
    Json(json!({ "logs": logs })).into_response()
}

async fn explain(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let mut state = state.lock().await;
    if let Some(status) = state.outage {
        return outage_response(status);
    }
    let explanation = format!(
        "[{}] {}",
        body["project_description"].as_str().unwrap_or(""),
        body["log_message"].as_str().unwrap_or(""),
    );
    state.explained.push(body);
    Json(json!({ "explanation": explanation })).into_response()
}
