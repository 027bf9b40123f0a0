//! Worker Pool Implementation
//!
//! Manages the lifecycle of task execution. It spawns background workers that continuously
//! poll the `TaskQueue` for pending tasks.
//!
//! ## Responsibilities
//! - **Polling**: checking for `Pending` tasks in submission order.
//! - **Execution**: invoking the appropriate handler from the `TaskHandlerRegistry`,
//!   in its own tokio task so a panicking body fails only that task.
//! - **Progress**: draining the progress channel fed by running task bodies into the queue.

use super::queue::TaskQueue;
use super::registry::{ProgressReporter, ProgressUpdate, TaskHandlerRegistry, TaskResult};
use super::types::*;
use crate::error::TaskError;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

const IDLE_POLL: Duration = Duration::from_millis(100);
const CONTENDED_POLL: Duration = Duration::from_millis(50);

/// The engine that drives task execution.
pub struct TaskExecutor {
    /// Source of tasks and sink of their state.
    queue: Arc<TaskQueue>,
    /// Registry containing the actual code (closures) for tasks.
    handlers: Arc<TaskHandlerRegistry>,
    /// Number of concurrent workers.
    worker_count: usize,
    progress_tx: mpsc::UnboundedSender<ProgressUpdate>,
    progress_rx: Mutex<Option<mpsc::UnboundedReceiver<ProgressUpdate>>>,
}

impl TaskExecutor {
    /// Creates a new TaskExecutor.
    ///
    /// # Arguments
    /// * `worker_count`: Typically set to the number of CPU cores.
    pub fn new(
        queue: Arc<TaskQueue>,
        handlers: Arc<TaskHandlerRegistry>,
        worker_count: usize,
    ) -> Arc<Self> {
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();

        Arc::new(Self {
            queue,
            handlers,
            worker_count: worker_count.max(1),
            progress_tx,
            progress_rx: Mutex::new(Some(progress_rx)),
        })
    }

    /// Spawns the progress pump and the workers, then returns immediately.
    /// Each worker runs independently in an infinite loop.
    pub async fn start(self: Arc<Self>) {
        tracing::info!("Starting {} task workers", self.worker_count);

        if let Some(progress_rx) = self.progress_rx.lock().await.take() {
            let queue = self.queue.clone();
            tokio::spawn(async move {
                Self::progress_loop(queue, progress_rx).await;
            });
        } else {
            tracing::warn!("Task executor already started");
            return;
        }

        for worker_id in 0..self.worker_count {
            let executor = self.clone();
            tokio::spawn(async move {
                executor.worker_loop(worker_id).await;
            });
        }

        tracing::info!("Task executor started with {} workers", self.worker_count);
    }

    /// Applies checkpoints pushed by task bodies.
    async fn progress_loop(
        queue: Arc<TaskQueue>,
        mut progress_rx: mpsc::UnboundedReceiver<ProgressUpdate>,
    ) {
        while let Some(update) = progress_rx.recv().await {
            if let Err(e) = queue.report_progress(&update.task_id, update.progress, &update.message)
            {
                tracing::trace!("Dropped checkpoint for task {}: {}", update.task_id, e);
            }
        }
    }

    /// The main loop for a single worker.
    ///
    /// 1. Fetches pending tasks.
    /// 2. Attempts to claim one (atomic state change).
    /// 3. If claimed, runs it to completion and records the outcome.
    async fn worker_loop(&self, worker_id: usize) {
        tracing::info!("Worker {} started", worker_id);

        loop {
            let tasks = self.queue.pending_tasks();

            if tasks.is_empty() {
                // Sleep if no work to avoid busy-waiting
                tokio::time::sleep(IDLE_POLL).await;
                continue;
            }

            tracing::trace!("Worker {} found {} available tasks", worker_id, tasks.len());

            let mut claimed = false;
            for (task_id, entry) in tasks {
                if !self.queue.try_claim_task(&task_id, worker_id) {
                    tracing::trace!("Task {} already claimed by another worker", task_id);
                    continue;
                }

                tracing::info!(
                    "Worker {} claimed task {} (handler: {})",
                    worker_id,
                    task_id,
                    entry.task.handler()
                );

                let result = self.execute_task(&task_id, entry.task).await;

                if let Err(e) = self.queue.complete_task(&task_id, result) {
                    tracing::error!("Failed to complete task {}: {}", task_id, e);
                }

                claimed = true;
                break; // Move to next iteration to refresh task list
            }

            if !claimed {
                tokio::time::sleep(CONTENDED_POLL).await;
            }
        }
    }

    /// Invokes the registered closure for the task on its own tokio task.
    async fn execute_task(&self, task_id: &TaskId, task: Task) -> TaskResult {
        let handlers = self.handlers.clone();
        let progress = ProgressReporter::new(task_id.clone(), self.progress_tx.clone());
        let id = task_id.clone();

        let handle =
            tokio::spawn(async move { handlers.execute(&id, &task, progress).await });

        match handle.await {
            Ok(result) => result,
            Err(join_error) => {
                tracing::error!("Task {} panicked: {}", task_id, join_error);
                Err(TaskError::Panicked(join_error.to_string()))
            }
        }
    }
}
