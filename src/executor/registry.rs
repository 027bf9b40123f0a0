//! Task Handler Registry
//!
//! A dynamic registry that maps string-based task names (e.g., "process_image")
//! to executable Rust closures. The queue and the worker pool stay generic;
//! only the registered handlers know what a payload means.

use super::types::*;
use crate::error::TaskError;

use dashmap::DashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Outcome of a task body.
pub type TaskResult = Result<ResultDescriptor, TaskError>;

/// Type alias for a thread-safe, asynchronous task handler function.
pub type TaskHandlerFn =
    Arc<dyn Fn(TaskContext) -> Pin<Box<dyn Future<Output = TaskResult> + Send>> + Send + Sync>;

/// A checkpoint pushed from a running task body to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub task_id: TaskId,
    pub progress: u8,
    pub message: String,
}

/// Push side of the progress channel handed to every task body.
///
/// Sending never blocks and never fails the task: if the executor stopped
/// listening the checkpoint is simply lost.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    task_id: TaskId,
    tx: mpsc::UnboundedSender<ProgressUpdate>,
}

impl ProgressReporter {
    pub fn new(task_id: TaskId, tx: mpsc::UnboundedSender<ProgressUpdate>) -> Self {
        Self { task_id, tx }
    }

    /// Reporter plus the receiving end, for running a body outside the pool.
    pub fn channel(task_id: TaskId) -> (Self, mpsc::UnboundedReceiver<ProgressUpdate>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(task_id, tx), rx)
    }

    pub fn report(&self, progress: u8, message: &str) {
        tracing::debug!("Task {} checkpoint {}%: {}", self.task_id, progress, message);

        let update = ProgressUpdate {
            task_id: self.task_id.clone(),
            progress,
            message: message.to_string(),
        };
        if self.tx.send(update).is_err() {
            tracing::trace!("Progress receiver gone for task {}", self.task_id);
        }
    }
}

/// Everything a handler gets for one execution.
#[derive(Debug, Clone)]
pub struct TaskContext {
    pub task_id: TaskId,
    pub payload: serde_json::Value,
    pub progress: ProgressReporter,
}

/// Registry holding the mapping between task names and their implementation.
pub struct TaskHandlerRegistry {
    handlers: DashMap<String, TaskHandlerFn>,
}

impl TaskHandlerRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Registers a new handler function under a specific name.
    pub fn register<F, Fut>(&self, handler_name: &str, handler: F)
    where
        F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = TaskResult> + Send + 'static,
    {
        // Box::pin type-erases the concrete future so different async
        // functions share one map.
        let handler_fn: TaskHandlerFn = Arc::new(move |ctx: TaskContext| {
            Box::pin(handler(ctx)) as Pin<Box<dyn Future<Output = TaskResult> + Send>>
        });

        self.handlers.insert(handler_name.to_string(), handler_fn);

        tracing::info!("Registered task handler: {}", handler_name);
    }

    /// Looks up a handler by name and runs it against the task payload.
    pub async fn execute(
        &self,
        task_id: &TaskId,
        task: &Task,
        progress: ProgressReporter,
    ) -> TaskResult {
        match task {
            Task::Execute { handler, payload } => {
                // Clone the Arc out so the map guard is not held across the await.
                let handler_fn = match self.handlers.get(handler) {
                    Some(entry) => entry.value().clone(),
                    None => {
                        tracing::error!("Unknown task handler: {}", handler);
                        return Err(TaskError::UnknownHandler(handler.clone()));
                    }
                };

                tracing::debug!("Executing task {} with handler '{}'", task_id, handler);

                handler_fn(TaskContext {
                    task_id: task_id.clone(),
                    payload: payload.clone(),
                    progress,
                })
                .await
            }
        }
    }

    /// Returns a list of all registered handler names.
    pub fn list_handlers(&self) -> Vec<String> {
        self.handlers
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    pub fn has_handler(&self, handler_name: &str) -> bool {
        self.handlers.contains_key(handler_name)
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }
}

impl Default for TaskHandlerRegistry {
    fn default() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }
}
