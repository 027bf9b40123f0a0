use clap::Parser;
use radiology_jobs::config::Config;
use radiology_jobs::executor::client::{ExecutorClient, LocalExecutorClient, RemoteExecutorClient};
use radiology_jobs::executor::executor::TaskExecutor;
use radiology_jobs::executor::queue::TaskQueue;
use radiology_jobs::executor::registry::TaskHandlerRegistry;
use radiology_jobs::imaging;
use radiology_jobs::jobs::orchestrator::JobOrchestrator;
use radiology_jobs::jobs::registry::JobRegistry;
use radiology_jobs::server;
use radiology_jobs::storage::uploads::UploadStore;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_level)?)
        .init();

    tracing::info!("Starting node on {}", config.bind);

    // 1. Executor: in-process worker pool, or a remote worker node.
    let (executor, worker_queue): (Arc<dyn ExecutorClient>, Option<Arc<TaskQueue>>) =
        match &config.executor_url {
            Some(url) => {
                tracing::info!("Using remote executor at {}", url);
                let client: Arc<dyn ExecutorClient> = Arc::new(RemoteExecutorClient::new(
                    url.clone(),
                    config.executor_timeout(),
                ));
                (client, None)
            }
            None => {
                let queue = Arc::new(TaskQueue::new(config.queue_capacity));
                let handlers = TaskHandlerRegistry::new();
                imaging::task::register(&handlers);

                tracing::info!("Registered task handlers: {:?}", handlers.list_handlers());
                TaskExecutor::new(queue.clone(), handlers, config.workers)
                    .start()
                    .await;

                let client: Arc<dyn ExecutorClient> =
                    Arc::new(LocalExecutorClient::new(queue.clone()));
                (client, Some(queue))
            }
        };

    // 2. Job core:
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    let uploads = Arc::new(UploadStore::new(&config.upload_dir));
    let registry = Arc::new(JobRegistry::new());
    let orchestrator = JobOrchestrator::new(registry, executor, uploads);

    // 3. HTTP Router:
    let app = server::build_router(
        orchestrator,
        worker_queue.clone(),
        server::cors_layer(&config.cors_origin)?,
        config.max_upload_bytes,
    );

    // 4. Start HTTP server:
    tracing::info!("HTTP server listening on {}", config.bind);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await?;

    if let Some(queue) = worker_queue {
        queue.close();
        tracing::info!("Task queue closed with {} tasks recorded", queue.len());
    }

    Ok(())
}
