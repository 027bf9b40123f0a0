//! Network Protocol Definitions
//!
//! DTOs exchanged between a front node and a worker node that hosts the task
//! queue. The front node only ever submits work and asks for raw task state.

use super::types::*;
use serde::{Deserialize, Serialize};

pub const ENDPOINT_SUBMIT_TASK: &str = "/task/submit";
pub const ENDPOINT_TASK_STATUS: &str = "/task/status";
pub const ENDPOINT_TASK_STATS: &str = "/task/stats";

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTaskRequest {
    pub task: Task,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTaskResponse {
    pub task_id: TaskId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitTaskError {
    pub error: String,
}

/// Answer to a raw state query. Unknown ids answer `PENDING`, the way a
/// result backend does for ids it has never stored.
pub type TaskStatusResponse = RawTaskState;

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskStatsResponse {
    pub tasks: usize,
    pub stats: QueueStats,
}
