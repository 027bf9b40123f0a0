//! Status Aggregator
//!
//! Folds ordered task snapshots into one job-level state. Precedence, highest
//! first: any failed task, any running task, any task not yet succeeded, and
//! finally all succeeded. A job with no tasks is vacuously successful.

use super::types::JobState;
use crate::executor::types::{TaskSnapshot, TaskState};

pub const MESSAGE_FAILED_PREFIX: &str = "Job failed. Error: ";
pub const MESSAGE_RUNNING: &str = "Processing...";
pub const MESSAGE_PENDING: &str = "Waiting to start...";
pub const MESSAGE_SUCCEEDED: &str = "All tasks completed successfully";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub status: JobState,
    pub progress: u8,
    pub message: String,
}

pub fn aggregate(tasks: &[TaskSnapshot]) -> Aggregate {
    let progress = average_progress(tasks);

    // Only the first failure is reported.
    if let Some(failed) = tasks.iter().find(|t| t.status == TaskState::Failed) {
        let error = failed.error().unwrap_or("Unknown error");
        return Aggregate {
            status: JobState::Failed,
            progress,
            message: format!("{}{}", MESSAGE_FAILED_PREFIX, error),
        };
    }

    if tasks.iter().any(|t| t.status == TaskState::Running) {
        return Aggregate {
            status: JobState::Running,
            progress,
            message: MESSAGE_RUNNING.to_string(),
        };
    }

    // Unknown executor states are neither failed nor done.
    if tasks.iter().any(|t| t.status != TaskState::Succeeded) {
        return Aggregate {
            status: JobState::Pending,
            progress,
            message: MESSAGE_PENDING.to_string(),
        };
    }

    Aggregate {
        status: JobState::Succeeded,
        progress,
        message: MESSAGE_SUCCEEDED.to_string(),
    }
}

fn average_progress(tasks: &[TaskSnapshot]) -> u8 {
    if tasks.is_empty() {
        return 0;
    }

    let sum: usize = tasks.iter().map(|t| t.progress.min(100) as usize).sum();
    (sum / tasks.len()) as u8
}
