use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::job::{Job, JobStatus};
use crate::models::record::ExtractionResult;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("job {0} already exists")]
    DuplicateJob(Uuid),

    #[error("job {0} does not exist")]
    UnknownJob(Uuid),

    #[error("job {0} is already in a terminal state")]
    AlreadyTerminal(Uuid),

    #[error("job {0} not found")]
    NotFound(Uuid),
}

/// Per-status job counts, reported by the health endpoint.
#[derive(Debug, Default, Serialize)]
pub struct JobCounts {
    pub submitted: usize,
    pub completed: usize,
    pub failed: usize,
}

/// In-memory job status store.
///
/// Status and result/error are written under a single lock acquisition, so
/// concurrent readers never observe a half-applied transition.
#[derive(Default)]
pub struct JobStatusStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
}

impl JobStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job in the `submitted` state.
    pub async fn create(&self, job_id: Uuid) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(&job_id) {
            return Err(StoreError::DuplicateJob(job_id));
        }
        jobs.insert(job_id, Job::new(job_id));
        Ok(())
    }

    /// Transition a submitted job to `completed` with its result.
    pub async fn complete(
        &self,
        job_id: Uuid,
        result: ExtractionResult,
    ) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&job_id).ok_or(StoreError::UnknownJob(job_id))?;
        if job.status.is_terminal() {
            return Err(StoreError::AlreadyTerminal(job_id));
        }
        job.status = JobStatus::Completed;
        job.result = Some(result);
        job.updated_at = Utc::now();
        Ok(())
    }

    /// Transition a submitted job to `failed` with an error message.
    pub async fn fail(&self, job_id: Uuid, error: impl Into<String>) -> Result<(), StoreError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs.get_mut(&job_id).ok_or(StoreError::UnknownJob(job_id))?;
        if job.status.is_terminal() {
            return Err(StoreError::AlreadyTerminal(job_id));
        }
        job.status = JobStatus::Failed;
        job.error = Some(error.into());
        job.updated_at = Utc::now();
        Ok(())
    }

    /// Look up a job by id.
    pub async fn get(&self, job_id: Uuid) -> Result<Job, StoreError> {
        self.jobs
            .read()
            .await
            .get(&job_id)
            .cloned()
            .ok_or(StoreError::NotFound(job_id))
    }

    pub async fn status_counts(&self) -> JobCounts {
        let jobs = self.jobs.read().await;
        let mut counts = JobCounts::default();
        for job in jobs.values() {
            match job.status {
                JobStatus::Submitted => counts.submitted += 1,
                JobStatus::Completed => counts.completed += 1,
                JobStatus::Failed => counts.failed += 1,
            }
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_result() -> ExtractionResult {
        ExtractionResult::new(Vec::new())
    }

    #[tokio::test]
    async fn created_job_is_submitted_with_no_outcome() {
        let store = JobStatusStore::new();
        let id = Uuid::new_v4();
        store.create(id).await.unwrap();

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Submitted);
        assert!(job.result.is_none());
        assert!(job.error.is_none());
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let store = JobStatusStore::new();
        let id = Uuid::new_v4();
        store.create(id).await.unwrap();

        let err = store.create(id).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateJob(_)));
    }

    #[tokio::test]
    async fn complete_records_result_and_is_stable() {
        let store = JobStatusStore::new();
        let id = Uuid::new_v4();
        store.create(id).await.unwrap();
        store.complete(id, empty_result()).await.unwrap();

        for _ in 0..3 {
            let job = store.get(id).await.unwrap();
            assert_eq!(job.status, JobStatus::Completed);
            assert!(job.result.is_some());
            assert!(job.error.is_none());
        }
    }

    #[tokio::test]
    async fn fail_records_error() {
        let store = JobStatusStore::new();
        let id = Uuid::new_v4();
        store.create(id).await.unwrap();
        store.fail(id, "image download timed out").await.unwrap();

        let job = store.get(id).await.unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("image download timed out"));
        assert!(job.result.is_none());
    }

    #[tokio::test]
    async fn terminal_jobs_reject_further_transitions() {
        let store = JobStatusStore::new();
        let id = Uuid::new_v4();
        store.create(id).await.unwrap();
        store.complete(id, empty_result()).await.unwrap();

        let err = store.fail(id, "too late").await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyTerminal(_)));
        let err = store.complete(id, empty_result()).await.unwrap_err();
        assert!(matches!(err, StoreError::AlreadyTerminal(_)));
    }

    #[tokio::test]
    async fn transitions_on_absent_job_are_rejected() {
        let store = JobStatusStore::new();
        let id = Uuid::new_v4();

        assert!(matches!(
            store.complete(id, empty_result()).await.unwrap_err(),
            StoreError::UnknownJob(_)
        ));
        assert!(matches!(
            store.fail(id, "whoops").await.unwrap_err(),
            StoreError::UnknownJob(_)
        ));
        assert!(matches!(
            store.get(id).await.unwrap_err(),
            StoreError::NotFound(_)
        ));
    }
}
