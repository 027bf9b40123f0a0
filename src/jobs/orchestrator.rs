//! Job Orchestrator
//!
//! Maps a multi-file upload to one executor task per file and answers job
//! status requests by polling every task live.
//!
//! ## Ownership
//! A job is only visible to the owner that created it. A request from any
//! other identity fails exactly like a request for a job that never existed.
//!
//! ## Partial submission
//! Tasks are submitted in input order. If submission N fails, tasks 1..N-1
//! are already queued and keep running; they are logged and left orphaned.
//! No job record is written for a failed creation. File names are checked
//! before anything is stored or submitted, so a bad name never orphans work.

use super::aggregator::aggregate;
use super::registry::JobRegistry;
use super::types::*;
use crate::error::{JobError, StorageError};
use crate::executor::client::{ExecutorClient, ExecutorInfo};
use crate::executor::types::{TaskId, TaskSnapshot, TaskState};
use crate::imaging::format::InputFile;
use crate::storage::uploads::UploadStore;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

pub struct JobOrchestrator {
    registry: Arc<JobRegistry>,
    executor: Arc<dyn ExecutorClient>,
    uploads: Arc<UploadStore>,
}

impl JobOrchestrator {
    pub fn new(
        registry: Arc<JobRegistry>,
        executor: Arc<dyn ExecutorClient>,
        uploads: Arc<UploadStore>,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            executor,
            uploads,
        })
    }

    pub async fn create_job(
        &self,
        owner: &str,
        files: Vec<UploadedFile>,
        operation: &str,
    ) -> Result<JobReceipt, JobError> {
        let job_id = JobId::new();
        tracing::info!(
            "Creating job {} for user {} with {} files (operation={})",
            job_id,
            owner,
            files.len(),
            operation
        );

        self.check_file_names(owner, &job_id, &files)?;

        let mut tasks: Vec<JobTask> = Vec::with_capacity(files.len());

        for file in files {
            let submitted = self.submit_file(owner, &job_id, &file, operation).await;

            match submitted {
                Ok(task) => tasks.push(task),
                Err(e) => {
                    if !tasks.is_empty() {
                        let orphaned: Vec<String> =
                            tasks.iter().map(|t| t.task_id.to_string()).collect();
                        tracing::warn!(
                            "Job {} creation failed at {}; orphaned tasks: {:?}",
                            job_id,
                            file.filename,
                            orphaned
                        );
                    }
                    return Err(e);
                }
            }
        }

        let job = Job {
            job_id: job_id.clone(),
            owner: owner.to_string(),
            tasks,
            created_at: chrono::Utc::now(),
            status: JobState::Pending,
        };

        let receipt = JobReceipt {
            job_id,
            user_id: job.owner.clone(),
            status: JobState::Pending,
            task_ids: job.task_ids(),
            created_at: job.created_at,
        };

        self.registry.put(job);
        tracing::info!("Job {} created with {} tasks", receipt.job_id, receipt.task_ids.len());

        Ok(receipt)
    }

    /// Rejects unsafe names and any two files that would share an input or
    /// an output path inside the job directory.
    fn check_file_names(
        &self,
        owner: &str,
        job_id: &JobId,
        files: &[UploadedFile],
    ) -> Result<(), JobError> {
        let mut claimed: HashSet<PathBuf> = HashSet::with_capacity(files.len() * 2);

        for file in files {
            let input = self.uploads.file_path(owner, job_id.as_str(), &file.filename)?;
            let output = InputFile::resolve(&input).output_path();

            if !claimed.insert(input) || !claimed.insert(output) {
                tracing::warn!("Job {}: conflicting file name {}", job_id, file.filename);
                return Err(StorageError::Conflict(file.filename.clone()).into());
            }
        }

        Ok(())
    }

    async fn submit_file(
        &self,
        owner: &str,
        job_id: &JobId,
        file: &UploadedFile,
        operation: &str,
    ) -> Result<JobTask, JobError> {
        let file_path = self
            .uploads
            .save(owner, job_id.as_str(), &file.filename, &file.content)
            .await?;

        let task_id = self.executor.submit(operation, &file_path).await?;
        tracing::info!("Task {} created for file {}", task_id, file.filename);

        Ok(JobTask {
            task_id,
            filename: file.filename.clone(),
            file_path,
        })
    }

    pub async fn get_job_status(
        &self,
        job_id: &JobId,
        requester: &str,
    ) -> Result<JobStatusView, JobError> {
        let job = self.registry.get(job_id)?;

        if job.owner != requester {
            tracing::debug!("Job {} requested by non-owner", job_id);
            return Err(JobError::NotFound);
        }

        let polls = job.tasks.iter().map(|task| self.executor.poll(&task.task_id));
        let task_results: Vec<TaskSnapshot> = futures::future::join_all(polls).await;

        for snapshot in &task_results {
            if snapshot.status == TaskState::Failed {
                tracing::error!(
                    "Task {} failed: {}",
                    snapshot.task_id,
                    snapshot.error().unwrap_or("Unknown error")
                );
            }
        }

        let summary = aggregate(&task_results);

        if let Err(e) = self.registry.update_status(job_id, summary.status) {
            tracing::debug!("Could not cache status of job {}: {}", job_id, e);
        }

        Ok(JobStatusView {
            job_id: job.job_id,
            status: summary.status,
            progress: summary.progress,
            task_results,
            message: summary.message,
        })
    }

    /// Status of one task, independent of any job.
    pub async fn get_task_status(&self, task_id: &TaskId) -> TaskSnapshot {
        self.executor.poll(task_id).await
    }

    pub async fn read_file(
        &self,
        owner: &str,
        job_id: &str,
        filename: &str,
    ) -> Result<Vec<u8>, JobError> {
        Ok(self.uploads.read(owner, job_id, filename).await?)
    }

    pub fn list_jobs(&self) -> Vec<Job> {
        self.registry.list()
    }

    pub async fn executor_info(&self) -> ExecutorInfo {
        self.executor.inspect().await
    }
}
