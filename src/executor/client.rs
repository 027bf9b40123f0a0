//! Executor Client
//!
//! The job core talks to the executor only through `ExecutorClient`:
//! `submit` enqueues one file's work and returns at once, `poll` reads the
//! current state and never fails from the caller's point of view.
//!
//! Two backends exist:
//! - **`LocalExecutorClient`**: the queue lives in this process, next to a `TaskExecutor` pool.
//! - **`RemoteExecutorClient`**: the queue lives on a worker node reached over HTTP.

use super::protocol::*;
use super::queue::TaskQueue;
use super::types::*;
use crate::error::ExecutorError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Connectivity and load report for the debug surface.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExecutorInfo {
    pub backend: String,
    pub connected: bool,
    pub tasks: Option<usize>,
    pub stats: Option<QueueStats>,
    pub error: Option<String>,
}

#[async_trait]
pub trait ExecutorClient: Send + Sync {
    /// Enqueues processing of `input_path` with `operation`.
    async fn submit(&self, operation: &str, input_path: &Path) -> Result<TaskId, ExecutorError>;

    /// Current state of a task. Executor failures degrade to a `Failed`
    /// snapshot carrying the error text.
    async fn poll(&self, task_id: &TaskId) -> TaskSnapshot;

    async fn inspect(&self) -> ExecutorInfo;
}

pub struct LocalExecutorClient {
    queue: Arc<TaskQueue>,
}

impl LocalExecutorClient {
    pub fn new(queue: Arc<TaskQueue>) -> Self {
        Self { queue }
    }
}

#[async_trait]
impl ExecutorClient for LocalExecutorClient {
    async fn submit(&self, operation: &str, input_path: &Path) -> Result<TaskId, ExecutorError> {
        self.queue.submit(Task::process_image(operation, input_path))
    }

    async fn poll(&self, task_id: &TaskId) -> TaskSnapshot {
        let raw = self
            .queue
            .get_task(task_id)
            .map(|entry| entry.raw_state())
            .unwrap_or_else(|| RawTaskState::named(RAW_PENDING));

        tracing::debug!("Checking task {}: state={}", task_id, raw.state);
        TaskSnapshot::from_raw(task_id.clone(), raw)
    }

    async fn inspect(&self) -> ExecutorInfo {
        ExecutorInfo {
            backend: "local".to_string(),
            connected: true,
            tasks: Some(self.queue.len()),
            stats: Some(self.queue.stats()),
            error: None,
        }
    }
}

pub struct RemoteExecutorClient {
    base_url: String,
    timeout: Duration,
    http_client: reqwest::Client,
}

impl RemoteExecutorClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            http_client: reqwest::Client::new(),
        }
    }

    async fn fetch_state(&self, task_id: &TaskId) -> anyhow::Result<RawTaskState> {
        let url = format!("{}{}/{}", self.base_url, ENDPOINT_TASK_STATUS, task_id);

        let response = self
            .http_client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }

    async fn fetch_stats(&self) -> anyhow::Result<TaskStatsResponse> {
        let url = format!("{}{}", self.base_url, ENDPOINT_TASK_STATS);

        let response = self
            .http_client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?;

        Ok(response.json().await?)
    }
}

#[async_trait]
impl ExecutorClient for RemoteExecutorClient {
    async fn submit(&self, operation: &str, input_path: &Path) -> Result<TaskId, ExecutorError> {
        let url = format!("{}{}", self.base_url, ENDPOINT_SUBMIT_TASK);
        let request = SubmitTaskRequest {
            task: Task::process_image(operation, input_path),
        };

        let response = self
            .http_client
            .post(url)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ExecutorError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<SubmitTaskError>().await {
                Ok(body) => body.error,
                Err(_) => format!("worker node answered {}", status),
            };
            return Err(ExecutorError::Unavailable(detail));
        }

        let body: SubmitTaskResponse = response
            .json()
            .await
            .map_err(|e| ExecutorError::Unavailable(e.to_string()))?;

        Ok(body.task_id)
    }

    async fn poll(&self, task_id: &TaskId) -> TaskSnapshot {
        match self.fetch_state(task_id).await {
            Ok(raw) => {
                tracing::debug!("Checking task {}: state={}", task_id, raw.state);
                TaskSnapshot::from_raw(task_id.clone(), raw)
            }
            Err(e) => {
                tracing::error!("Error getting task status for {}: {}", task_id, e);
                TaskSnapshot::unreachable(task_id.clone(), e.to_string())
            }
        }
    }

    async fn inspect(&self) -> ExecutorInfo {
        match self.fetch_stats().await {
            Ok(body) => ExecutorInfo {
                backend: self.base_url.clone(),
                connected: true,
                tasks: Some(body.tasks),
                stats: Some(body.stats),
                error: None,
            },
            Err(e) => ExecutorInfo {
                backend: self.base_url.clone(),
                connected: false,
                tasks: None,
                stats: None,
                error: Some(e.to_string()),
            },
        }
    }
}
