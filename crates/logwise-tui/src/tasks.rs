//! Bridge between the synchronous event loop and async backend calls.
//!
//! Each request runs as a task on the tokio runtime and reports back over an
//! unbounded channel. The event loop drains the channel every tick; results
//! carry the sequence tag they were issued with so stale ones can be dropped.

use logwise_client::{fetch_logs, BackendClient};
use logwise_core::{LogRecord, Project, Session};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};

use crate::pages::investigation::{ExplainRequest, LogFetch};

/// A finished backend request. Errors are already rendered to text.
#[derive(Debug)]
pub enum TaskOutcome {
    Projects {
        seq: u64,
        result: Result<Vec<Project>, String>,
    },
    Sessions {
        seq: u64,
        result: Result<Vec<Session>, String>,
    },
    SessionStarted {
        project: Project,
        result: Result<String, String>,
    },
    Logs {
        tab: u64,
        seq: u64,
        result: Result<Vec<LogRecord>, String>,
    },
    Explanation {
        tab: u64,
        seq: u64,
        result: Result<String, String>,
    },
}

impl TaskOutcome {
    pub fn error(&self) -> Option<&str> {
        let err = match self {
            TaskOutcome::Projects { result, .. } => result.as_ref().err(),
            TaskOutcome::Sessions { result, .. } => result.as_ref().err(),
            TaskOutcome::SessionStarted { result, .. } => result.as_ref().err(),
            TaskOutcome::Logs { result, .. } => result.as_ref().err(),
            TaskOutcome::Explanation { result, .. } => result.as_ref().err(),
        };
        err.map(String::as_str)
    }
}

pub struct Tasks {
    runtime: Handle,
    client: BackendClient,
    tx: UnboundedSender<TaskOutcome>,
    rx: UnboundedReceiver<TaskOutcome>,
}

impl Tasks {
    pub fn new(runtime: Handle, client: BackendClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { runtime, client, tx, rx }
    }

    /// Next finished request, if any, without blocking.
    pub fn try_next(&mut self) -> Option<TaskOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => Some(outcome),
            Err(TryRecvError::Empty) => None,
            // Unreachable while `self.tx` is alive.
            Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn load_projects(&self, seq: u64) {
        let client = self.client.clone();
        self.spawn(async move {
            let result = client.projects().await.map_err(|e| e.to_string());
            TaskOutcome::Projects { seq, result }
        });
    }

    pub fn load_sessions(&self, seq: u64) {
        let client = self.client.clone();
        self.spawn(async move {
            let result = client.sessions().await.map_err(|e| e.to_string());
            TaskOutcome::Sessions { seq, result }
        });
    }

    pub fn start_session(&self, project: Project) {
        let client = self.client.clone();
        self.spawn(async move {
            let result = client.start_session(&project.id).await.map_err(|e| e.to_string());
            TaskOutcome::SessionStarted { project, result }
        });
    }

    pub fn fetch_logs(&self, tab: u64, fetch: LogFetch) {
        let client = self.client.clone();
        self.spawn(async move {
            let result = fetch_logs(&client, &fetch.range, &fetch.severities)
                .await
                .map_err(|e| e.to_string());
            TaskOutcome::Logs { tab, seq: fetch.seq, result }
        });
    }

    pub fn explain(&self, tab: u64, request: ExplainRequest, project_description: String) {
        let client = self.client.clone();
        self.spawn(async move {
            let result = client
                .explain(&request.log_message, &project_description)
                .await
                .map_err(|e| e.to_string());
            TaskOutcome::Explanation { tab, seq: request.seq, result }
        });
    }

    fn spawn<F>(&self, task: F)
    where
        F: std::future::Future<Output = TaskOutcome> + Send + 'static,
    {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            let outcome = task.await;
            if let Some(err) = outcome.error() {
                tracing::warn!(error = %err, "backend request failed");
            }
            // The receiver only goes away when the app is shutting down.
            let _ = tx.send(outcome);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn unreachable_backend_reports_failure() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        // Port 9 (discard) is closed on test machines; connect fails fast.
        let client = BackendClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let mut tasks = Tasks::new(runtime.handle().clone(), client);

        tasks.load_projects(3);

        let outcome = runtime.block_on(async {
            loop {
                if let Some(outcome) = tasks.try_next() {
                    return outcome;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        });
        match outcome {
            TaskOutcome::Projects { seq, result } => {
                assert_eq!(seq, 3);
                assert!(result.is_err());
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
