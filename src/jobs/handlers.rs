use super::orchestrator::JobOrchestrator;
use super::protocol::*;
use super::types::*;
use crate::error::{JobError, StorageError};
use crate::executor::client::ExecutorInfo;
use crate::executor::types::{TaskId, TaskSnapshot};

use axum::{
    extract::{Multipart, Path},
    http::{HeaderMap, StatusCode},
    Extension, Json,
};
use std::sync::Arc;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse::new(detail)))
}

fn job_error(e: JobError) -> ApiError {
    let status = match &e {
        JobError::NotFound => StatusCode::NOT_FOUND,
        JobError::Executor(_) => StatusCode::SERVICE_UNAVAILABLE,
        JobError::Storage(StorageError::InvalidName(_)) => StatusCode::BAD_REQUEST,
        JobError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
        JobError::Storage(StorageError::Conflict(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        JobError::Storage(StorageError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, e.to_string())
}

fn requester(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Missing {} header", USER_HEADER),
            )
        })
}

pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Radiology job service is running".to_string(),
    })
}

pub async fn handle_create_job(
    Extension(orchestrator): Extension<Arc<JobOrchestrator>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<JobReceipt>, ApiError> {
    let owner = requester(&headers)?;

    let mut files: Vec<UploadedFile> = Vec::new();
    let mut operation = DEFAULT_OPERATION.to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        let name = field.name().map(str::to_string);

        match name.as_deref() {
            Some(FIELD_FILES) => {
                let filename = field.file_name().map(str::to_string).ok_or_else(|| {
                    api_error(StatusCode::BAD_REQUEST, "Uploaded file has no filename")
                })?;
                let content = field
                    .bytes()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;

                tracing::debug!("Received file {} ({} bytes)", filename, content.len());
                files.push(UploadedFile::new(filename, content.to_vec()));
            }
            Some(FIELD_TASK_TYPE) => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
                if !value.trim().is_empty() {
                    operation = value.trim().to_string();
                }
            }
            other => {
                tracing::debug!("Ignoring multipart field {:?}", other);
            }
        }
    }

    if files.is_empty() {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "At least one file is required",
        ));
    }

    match orchestrator.create_job(&owner, files, &operation).await {
        Ok(receipt) => Ok(Json(receipt)),
        Err(e) => {
            tracing::error!("Failed to create job for user {}: {}", owner, e);
            Err(job_error(e))
        }
    }
}

pub async fn handle_get_job(
    Extension(orchestrator): Extension<Arc<JobOrchestrator>>,
    headers: HeaderMap,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusView>, ApiError> {
    let owner = requester(&headers)?;

    orchestrator
        .get_job_status(&JobId(job_id), &owner)
        .await
        .map(Json)
        .map_err(job_error)
}

pub async fn handle_get_task(
    Extension(orchestrator): Extension<Arc<JobOrchestrator>>,
    Path(task_id): Path<String>,
) -> Json<TaskSnapshot> {
    Json(orchestrator.get_task_status(&TaskId(task_id)).await)
}

pub async fn handle_get_file(
    Extension(orchestrator): Extension<Arc<JobOrchestrator>>,
    Path((user_id, job_id, filename)): Path<(String, String, String)>,
) -> Result<Vec<u8>, ApiError> {
    match orchestrator.read_file(&user_id, &job_id, &filename).await {
        Ok(bytes) => Ok(bytes),
        // Traversal attempts look the same as missing files.
        Err(JobError::Storage(StorageError::InvalidName(_)))
        | Err(JobError::Storage(StorageError::NotFound(_)))
        | Err(JobError::NotFound) => {
            Err(api_error(StatusCode::NOT_FOUND, "File not found"))
        }
        Err(e) => Err(job_error(e)),
    }
}

pub async fn handle_debug_jobs(
    Extension(orchestrator): Extension<Arc<JobOrchestrator>>,
) -> Json<DebugJobsResponse> {
    let jobs = orchestrator.list_jobs();

    Json(DebugJobsResponse {
        total_jobs: jobs.len(),
        jobs,
    })
}

pub async fn handle_debug_executor(
    Extension(orchestrator): Extension<Arc<JobOrchestrator>>,
) -> Json<ExecutorInfo> {
    Json(orchestrator.executor_info().await)
}
