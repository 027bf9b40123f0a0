//! HTTP Router Assembly
//!
//! Every node serves the client-facing jobs API. A node that hosts its own
//! worker pool also serves the `/task/*` endpoints, so other nodes can use it
//! as a remote executor.

use crate::executor::handlers::{handle_get_task_state, handle_submit_task, handle_task_stats};
use crate::executor::protocol::*;
use crate::executor::queue::TaskQueue;
use crate::jobs::handlers::*;
use crate::jobs::orchestrator::JobOrchestrator;
use crate::jobs::protocol::*;

use axum::{
    extract::{DefaultBodyLimit, Extension},
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, CorsLayer};

/// Worker-node endpoints backed by a local queue.
pub fn executor_routes(queue: Arc<TaskQueue>) -> Router {
    Router::new()
        .route(ENDPOINT_SUBMIT_TASK, post(handle_submit_task))
        .route(
            &format!("{}/:id", ENDPOINT_TASK_STATUS),
            get(handle_get_task_state),
        )
        .route(ENDPOINT_TASK_STATS, get(handle_task_stats))
        .layer(Extension(queue))
}

/// Client endpoints. `max_upload_bytes` bounds the whole `POST /jobs` body.
pub fn job_routes(orchestrator: Arc<JobOrchestrator>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route(ENDPOINT_HEALTH, get(handle_health))
        .route(ENDPOINT_JOBS, post(handle_create_job))
        .route(&format!("{}/:job_id", ENDPOINT_JOBS), get(handle_get_job))
        .route(&format!("{}/:task_id", ENDPOINT_TASKS), get(handle_get_task))
        .route(
            &format!("{}/:user_id/:job_id/:filename", ENDPOINT_FILES),
            get(handle_get_file),
        )
        .route(ENDPOINT_DEBUG_JOBS, get(handle_debug_jobs))
        .route(ENDPOINT_DEBUG_EXECUTOR, get(handle_debug_executor))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(Extension(orchestrator))
}

pub fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin: HeaderValue = origin.parse()?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

pub fn build_router(
    orchestrator: Arc<JobOrchestrator>,
    worker_queue: Option<Arc<TaskQueue>>,
    cors: CorsLayer,
    max_upload_bytes: usize,
) -> Router {
    let mut app = job_routes(orchestrator, max_upload_bytes);

    if let Some(queue) = worker_queue {
        app = app.merge(executor_routes(queue));
    }

    app.layer(cors)
}
