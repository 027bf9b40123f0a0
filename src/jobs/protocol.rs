//! Jobs HTTP Protocol
//!
//! Endpoints and DTOs of the client-facing API.

use serde::{Deserialize, Serialize};

pub const ENDPOINT_HEALTH: &str = "/";
pub const ENDPOINT_JOBS: &str = "/jobs";
pub const ENDPOINT_TASKS: &str = "/tasks";
pub const ENDPOINT_FILES: &str = "/files";
pub const ENDPOINT_DEBUG_JOBS: &str = "/debug/jobs";
pub const ENDPOINT_DEBUG_EXECUTOR: &str = "/debug/executor";

/// Caller-supplied identity. Not authenticated.
pub const USER_HEADER: &str = "x-user-id";

/// Multipart field carrying one uploaded file; may repeat.
pub const FIELD_FILES: &str = "files";
/// Optional multipart text field naming the operation.
pub const FIELD_TASK_TYPE: &str = "task_type";
pub const DEFAULT_OPERATION: &str = "blur";

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DebugJobsResponse {
    pub total_jobs: usize,
    pub jobs: Vec<super::types::Job>,
}
