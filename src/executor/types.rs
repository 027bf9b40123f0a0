use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// Name under which the image processing body is registered with the executor.
pub const PROCESS_IMAGE_HANDLER: &str = "process_image";

/// Unique identifier for a task.
///
/// Wrapper around a UUID string. The core only ever holds task ids; the task
/// state itself lives with the executor and is fetched on demand.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TaskId(pub String);

impl TaskId {
    /// Generates a new random UUID v4-based TaskId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The definition of a unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Task {
    /// A generic execution task.
    Execute {
        /// The name of the registered handler to invoke (e.g., "process_image").
        handler: String,
        /// Arbitrary JSON payload passed to the handler function.
        payload: serde_json::Value,
    },
}

impl Task {
    /// Builds the unit of work that processes one uploaded file.
    pub fn process_image(operation: &str, input_path: &Path) -> Self {
        let payload = ProcessImagePayload {
            file_path: input_path.to_string_lossy().into_owned(),
            operation: operation.to_string(),
        };

        Task::Execute {
            handler: PROCESS_IMAGE_HANDLER.to_string(),
            payload: serde_json::to_value(payload).unwrap_or(serde_json::Value::Null),
        }
    }

    pub fn handler(&self) -> &str {
        match self {
            Task::Execute { handler, .. } => handler,
        }
    }
}

/// Payload carried by a `process_image` task.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessImagePayload {
    pub file_path: String,
    pub operation: String,
}

/// What a successful task leaves behind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResultDescriptor {
    pub input_file: String,
    pub output_file: String,
    pub operation: String,
    pub message: String,
}

/// Lifecycle of a task inside the executor's own store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum TaskStatus {
    /// Submitted, not yet picked up by any worker.
    Pending,
    /// Claimed by a worker; the body has not reported a checkpoint yet.
    Started,
    /// The body reported a checkpoint.
    Progress { progress: u8, message: String },
    /// Finished successfully.
    Succeeded { result: ResultDescriptor },
    /// The body returned an error or panicked.
    Failed { error: String },
}

impl TaskStatus {
    /// Terminal states are never overwritten.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeeded { .. } | TaskStatus::Failed { .. })
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TaskStatus::Started | TaskStatus::Progress { .. })
    }
}

/// The internal representation of a task stored within the `TaskQueue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEntry {
    /// The actual work definition.
    pub task: Task,
    /// Current execution status.
    pub status: TaskStatus,
    /// The worker currently (or last) processing this task.
    pub assigned_to: Option<usize>,
    /// Timestamp (ms) when the task was submitted.
    pub created_at: u64,
    /// Submission order within the queue, used for FIFO pickup.
    pub seq: u64,
}

impl TaskEntry {
    /// Renders the entry the way a broker reports it: a state name plus
    /// whatever metadata that state carries.
    pub fn raw_state(&self) -> RawTaskState {
        match &self.status {
            TaskStatus::Pending => RawTaskState::named(RAW_PENDING),
            TaskStatus::Started => RawTaskState::named(RAW_STARTED),
            TaskStatus::Progress { progress, message } => RawTaskState {
                progress: Some(*progress),
                info: Some(message.clone()),
                ..RawTaskState::named(RAW_PROGRESS)
            },
            TaskStatus::Succeeded { result } => RawTaskState {
                result: Some(result.clone()),
                ..RawTaskState::named(RAW_SUCCESS)
            },
            TaskStatus::Failed { error } => RawTaskState {
                info: Some(error.clone()),
                ..RawTaskState::named(RAW_FAILURE)
            },
        }
    }
}

pub const RAW_PENDING: &str = "PENDING";
pub const RAW_STARTED: &str = "STARTED";
pub const RAW_PROGRESS: &str = "PROGRESS";
pub const RAW_SUCCESS: &str = "SUCCESS";
pub const RAW_FAILURE: &str = "FAILURE";

/// Executor-reported state of a task, before interpretation.
///
/// `state` is free-form: a remote executor may report names this crate does
/// not know (e.g. `RETRY`, `REVOKED`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawTaskState {
    pub state: String,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub result: Option<ResultDescriptor>,
    #[serde(default)]
    pub info: Option<String>,
}

impl RawTaskState {
    pub fn named(state: &str) -> Self {
        Self {
            state: state.to_string(),
            progress: None,
            result: None,
            info: None,
        }
    }
}

/// Task state as seen by the job core.
///
/// Serialized as the strings `PENDING`, `RUNNING`, `SUCCESS`, `FAILED`; an
/// unrecognized executor state is surfaced verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown(String),
}

impl TaskState {
    pub fn as_str(&self) -> &str {
        match self {
            TaskState::Pending => "PENDING",
            TaskState::Running => "RUNNING",
            TaskState::Succeeded => "SUCCESS",
            TaskState::Failed => "FAILED",
            TaskState::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TaskState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "PENDING" => TaskState::Pending,
            "RUNNING" => TaskState::Running,
            "SUCCESS" => TaskState::Succeeded,
            "FAILED" => TaskState::Failed,
            _ => TaskState::Unknown(raw),
        })
    }
}

/// Either the result descriptor of a finished task or an error text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum TaskOutcome {
    Result(ResultDescriptor),
    Error(String),
}

/// Point-in-time view of one task, always fetched live from the executor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub task_id: TaskId,
    pub status: TaskState,
    pub progress: u8,
    pub result: Option<TaskOutcome>,
}

impl TaskSnapshot {
    /// Interprets a broker-reported state.
    pub fn from_raw(task_id: TaskId, raw: RawTaskState) -> Self {
        let (status, progress, result) = match raw.state.as_str() {
            RAW_PENDING => (TaskState::Pending, 0, None),
            RAW_STARTED | RAW_PROGRESS => (
                TaskState::Running,
                raw.progress.unwrap_or(0).min(100),
                None,
            ),
            RAW_SUCCESS => (
                TaskState::Succeeded,
                100,
                raw.result.map(TaskOutcome::Result),
            ),
            RAW_FAILURE => (
                TaskState::Failed,
                0,
                Some(TaskOutcome::Error(
                    raw.info.unwrap_or_else(|| "Unknown error".to_string()),
                )),
            ),
            _ => {
                tracing::warn!("Unknown task state: {} (task {})", raw.state, task_id);
                (
                    TaskState::Unknown(raw.state),
                    0,
                    raw.info.map(TaskOutcome::Error),
                )
            }
        };

        Self {
            task_id,
            status,
            progress,
            result,
        }
    }

    /// Snapshot used when the executor could not be asked at all.
    pub fn unreachable(task_id: TaskId, error: impl Into<String>) -> Self {
        Self {
            task_id,
            status: TaskState::Failed,
            progress: 0,
            result: Some(TaskOutcome::Error(error.into())),
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.result {
            Some(TaskOutcome::Error(error)) => Some(error),
            _ => None,
        }
    }

    pub fn result_descriptor(&self) -> Option<&ResultDescriptor> {
        match &self.result {
            Some(TaskOutcome::Result(result)) => Some(result),
            _ => None,
        }
    }
}

/// Counts of tasks per lifecycle state, used for introspection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueueStats {
    pub pending: usize,
    pub running: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Helper to get the current system time in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or_default()
}
