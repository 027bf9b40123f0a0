//! Error Taxonomy
//!
//! Typed errors shared across the crate. Each layer owns one enum:
//! - **`ExecutorError`**: the task queue refused new work.
//! - **`TaskError`**: a single task body failed; its `Display` text becomes the
//!   task's failure message as reported by the executor.
//! - **`StorageError`**: upload storage could not save or find a file.
//! - **`JobError`**: what the orchestrator surfaces to its callers.

use std::path::PathBuf;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ExecutorError {
    #[error("Executor unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("File not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed to open image: {0}")]
    ImageDecode(String),

    #[error("Failed to save image: {0}")]
    ImageSave(String),

    #[error("Failed to copy volume: {0}")]
    Copy(String),

    #[error("Invalid task payload: {0}")]
    InvalidPayload(String),

    #[error("Unknown task handler: {0}")]
    UnknownHandler(String),

    #[error("Task panicked: {0}")]
    Panicked(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid path component: {0:?}")]
    InvalidName(String),

    #[error("File not found: {0}")]
    NotFound(String),

    /// Two files of one job would share an input or output path.
    #[error("Conflicting file name in upload: {0}")]
    Conflict(String),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    /// Raised both for unknown job ids and for jobs owned by someone else.
    #[error("Job not found")]
    NotFound,

    #[error(transparent)]
    Executor(#[from] ExecutorError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
