use crate::executor::types::{TaskId, TaskSnapshot};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Unique identifier for a job.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct JobId(pub String);

impl JobId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Aggregated job-level state.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum JobState {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "RUNNING")]
    Running,
    #[serde(rename = "SUCCESS")]
    Succeeded,
    #[serde(rename = "FAILED")]
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "PENDING",
            JobState::Running => "RUNNING",
            JobState::Succeeded => "SUCCESS",
            JobState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One uploaded file and the executor task processing it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobTask {
    pub task_id: TaskId,
    pub filename: String,
    pub file_path: PathBuf,
}

/// A job record as kept by the registry.
///
/// `tasks` is in upload order and never changes after creation. `status` is
/// only a cache of the last aggregation and is never used to answer a status
/// request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Job {
    pub job_id: JobId,
    pub owner: String,
    pub tasks: Vec<JobTask>,
    pub created_at: DateTime<Utc>,
    pub status: JobState,
}

impl Job {
    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.iter().map(|task| task.task_id.clone()).collect()
    }

    pub fn filenames(&self) -> Vec<String> {
        self.tasks.iter().map(|task| task.filename.clone()).collect()
    }
}

/// Returned by `create_job`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobReceipt {
    pub job_id: JobId,
    pub user_id: String,
    pub status: JobState,
    pub task_ids: Vec<TaskId>,
    pub created_at: DateTime<Utc>,
}

/// Computed fresh on every status request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JobStatusView {
    pub job_id: JobId,
    pub status: JobState,
    pub progress: u8,
    pub task_results: Vec<TaskSnapshot>,
    pub message: String,
}

/// A file handed to `create_job`, already read from the request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}
