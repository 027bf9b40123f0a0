use super::protocol::*;
use super::queue::TaskQueue;
use super::types::*;
use crate::error::ExecutorError;

use axum::{extract::Path, http::StatusCode, Extension, Json};
use std::sync::Arc;

pub async fn handle_submit_task(
    Extension(queue): Extension<Arc<TaskQueue>>,
    Json(req): Json<SubmitTaskRequest>,
) -> Result<Json<SubmitTaskResponse>, (StatusCode, Json<SubmitTaskError>)> {
    match queue.submit(req.task) {
        Ok(task_id) => {
            tracing::info!("Task submitted successfully: {}", task_id);
            Ok(Json(SubmitTaskResponse { task_id }))
        }
        Err(e) => {
            tracing::error!("Failed to submit task: {}", e);
            Err((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(SubmitTaskError {
                    error: match e {
                        ExecutorError::Unavailable(reason) => reason,
                    },
                }),
            ))
        }
    }
}

pub async fn handle_get_task_state(
    Extension(queue): Extension<Arc<TaskQueue>>,
    Path(task_id_str): Path<String>,
) -> Json<TaskStatusResponse> {
    let task_id = TaskId(task_id_str);

    match queue.get_task(&task_id) {
        Some(entry) => {
            tracing::debug!("Task status query: {} -> {:?}", task_id, entry.status);
            Json(entry.raw_state())
        }
        None => {
            tracing::debug!("Task not found: {}", task_id);
            Json(RawTaskState::named(RAW_PENDING))
        }
    }
}

pub async fn handle_task_stats(
    Extension(queue): Extension<Arc<TaskQueue>>,
) -> Json<TaskStatsResponse> {
    Json(TaskStatsResponse {
        tasks: queue.len(),
        stats: queue.stats(),
    })
}
