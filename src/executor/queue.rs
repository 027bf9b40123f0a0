//! Task Queue
//!
//! The executor's own store of task state. Submissions land here as `Pending`,
//! workers claim them, task bodies push progress checkpoints, and the worker
//! finally records `Succeeded` or `Failed`.
//!
//! ## Responsibilities
//! - **Admission**: refusing work once closed or once the pending backlog reaches capacity.
//! - **Claiming**: an atomic `Pending -> Started` transition so a task runs on exactly one worker.
//! - **Progress**: recording checkpoints for running tasks only; terminal states are final.
//! - **Lookup**: answering state queries without blocking on task completion.

use super::types::*;
use crate::error::{ExecutorError, TaskError};

use anyhow::Result;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

/// The central component managing task state.
pub struct TaskQueue {
    /// Task id -> entry. `DashMap` gives per-key atomic updates.
    tasks: DashMap<TaskId, TaskEntry>,
    /// Maximum number of `Pending` tasks accepted at once.
    capacity: usize,
    /// Number of `Pending` tasks. A slot is reserved before the insert.
    pending: AtomicUsize,
    accepting: AtomicBool,
    next_seq: AtomicU64,
}

impl TaskQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            tasks: DashMap::new(),
            capacity,
            pending: AtomicUsize::new(0),
            accepting: AtomicBool::new(true),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Enqueues a task and returns its id without waiting for execution.
    pub fn submit(&self, task: Task) -> Result<TaskId, ExecutorError> {
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(ExecutorError::Unavailable(
                "task queue is closed".to_string(),
            ));
        }

        let reserved = self
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |pending| {
                (pending < self.capacity).then_some(pending + 1)
            });
        if let Err(pending) = reserved {
            tracing::warn!(
                "Rejecting task {:?}: {} tasks already pending",
                task.handler(),
                pending
            );
            return Err(ExecutorError::Unavailable(format!(
                "task queue is full ({} pending tasks)",
                pending
            )));
        }

        let task_id = TaskId::new();
        let entry = TaskEntry {
            task,
            status: TaskStatus::Pending,
            assigned_to: None,
            created_at: now_ms(),
            seq: self.next_seq.fetch_add(1, Ordering::SeqCst),
        };
        self.tasks.insert(task_id.clone(), entry);

        tracing::debug!("Queued task {}", task_id);
        Ok(task_id)
    }

    /// Stops admitting new work. Tasks already queued still run.
    pub fn close(&self) {
        self.accepting.store(false, Ordering::SeqCst);
        tracing::info!("Task queue closed to new submissions");
    }

    /// Pending tasks in submission order.
    pub fn pending_tasks(&self) -> Vec<(TaskId, TaskEntry)> {
        let mut tasks: Vec<(TaskId, TaskEntry)> = self
            .tasks
            .iter()
            .filter(|entry| entry.value().status == TaskStatus::Pending)
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        tasks.sort_by_key(|(_, entry)| entry.seq);
        tasks
    }

    /// Attempts to lock a pending task for execution by a worker.
    ///
    /// Returns `false` if another worker got there first.
    pub fn try_claim_task(&self, task_id: &TaskId, worker_id: usize) -> bool {
        if let Some(mut entry) = self.tasks.get_mut(task_id) {
            if entry.status != TaskStatus::Pending {
                return false;
            }

            entry.status = TaskStatus::Started;
            entry.assigned_to = Some(worker_id);
            self.pending.fetch_sub(1, Ordering::SeqCst);

            tracing::debug!("Worker {} claimed task {}", worker_id, task_id);
            return true;
        }

        false
    }

    /// Records a progress checkpoint for a running task.
    ///
    /// Checkpoints arriving after the task reached a terminal state are dropped.
    pub fn report_progress(&self, task_id: &TaskId, progress: u8, message: &str) -> Result<()> {
        let mut entry = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| anyhow::anyhow!("Task not found"))?;

        if !entry.status.is_running() {
            return Err(anyhow::anyhow!(
                "Task not running (status: {:?})",
                entry.status
            ));
        }

        entry.status = TaskStatus::Progress {
            progress: progress.min(100),
            message: message.to_string(),
        };
        tracing::trace!("Task {} at {}%: {}", task_id, progress, message);
        Ok(())
    }

    /// Marks a task as either `Succeeded` or `Failed`.
    pub fn complete_task(
        &self,
        task_id: &TaskId,
        result: Result<ResultDescriptor, TaskError>,
    ) -> Result<()> {
        let mut entry = self
            .tasks
            .get_mut(task_id)
            .ok_or_else(|| anyhow::anyhow!("Task not found"))?;

        if entry.status == TaskStatus::Pending {
            self.pending.fetch_sub(1, Ordering::SeqCst);
        }

        match result {
            Ok(result) => {
                tracing::info!("Task {} completed: {}", task_id, result.message);
                entry.status = TaskStatus::Succeeded { result };
            }
            Err(e) => {
                tracing::error!("Task {} failed: {}", task_id, e);
                entry.status = TaskStatus::Failed {
                    error: e.to_string(),
                };
            }
        }

        Ok(())
    }

    pub fn get_task(&self, task_id: &TaskId) -> Option<TaskEntry> {
        self.tasks.get(task_id).map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks waiting for a worker.
    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }

    /// Full scan, for introspection only.
    pub fn stats(&self) -> QueueStats {
        let mut stats = QueueStats::default();

        for entry in self.tasks.iter() {
            match entry.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Started | TaskStatus::Progress { .. } => stats.running += 1,
                TaskStatus::Succeeded { .. } => stats.succeeded += 1,
                TaskStatus::Failed { .. } => stats.failed += 1,
            }
        }

        stats
    }
}
