use super::types::{Job, JobId, JobState};
use crate::error::JobError;

use dashmap::DashMap;

/// Process-lifetime store of job records.
///
/// Every mutation goes through a single `DashMap` shard lock, so concurrent
/// status polls of the same job cannot lose each other's update.
pub struct JobRegistry {
    jobs: DashMap<JobId, Job>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self {
            jobs: DashMap::new(),
        }
    }

    pub fn put(&self, job: Job) {
        tracing::debug!("Storing job {} for owner {}", job.job_id, job.owner);
        self.jobs.insert(job.job_id.clone(), job);
    }

    pub fn get(&self, job_id: &JobId) -> Result<Job, JobError> {
        self.jobs
            .get(job_id)
            .map(|entry| entry.value().clone())
            .ok_or(JobError::NotFound)
    }

    pub fn update_status(&self, job_id: &JobId, status: JobState) -> Result<(), JobError> {
        let mut entry = self.jobs.get_mut(job_id).ok_or(JobError::NotFound)?;
        entry.status = status;
        Ok(())
    }

    /// Snapshot of every record, oldest first.
    pub fn list(&self) -> Vec<Job> {
        let mut jobs: Vec<Job> = self.jobs.iter().map(|entry| entry.value().clone()).collect();
        jobs.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
