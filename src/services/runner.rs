use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use uuid::Uuid;

use crate::models::job::JobInput;
use crate::models::record::ExtractionResult;
use crate::pipeline::reader::{PipelineError, PriceTagReader};
use crate::services::fetch::{FetchError, ImageFetcher};
use crate::services::queue::WorkQueue;
use crate::services::status::{JobStatusStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Runs submitted images as detached jobs and records their outcomes in the
/// job status store. Cheap to clone; all fields are shared handles.
#[derive(Clone)]
pub struct JobRunner {
    store: Arc<JobStatusStore>,
    reader: Arc<PriceTagReader>,
    fetcher: ImageFetcher,
}

impl JobRunner {
    pub fn new(store: Arc<JobStatusStore>, reader: Arc<PriceTagReader>, fetcher: ImageFetcher) -> Self {
        Self {
            store,
            reader,
            fetcher,
        }
    }

    /// Create a job for `input` and schedule it without blocking the caller.
    /// Returns the job id immediately.
    pub async fn submit(&self, input: JobInput) -> Result<Uuid, StoreError> {
        let job_id = Uuid::new_v4();
        self.store.create(job_id).await?;
        metrics::counter!("jobs_submitted_total").increment(1);

        let runner = self.clone();
        tokio::spawn(async move {
            runner.run_job(job_id, input).await;
        });

        Ok(job_id)
    }

    /// Execute one job to a terminal state.
    ///
    /// Every path through this function ends in exactly one `complete` or
    /// `fail` write; the unwind boundary covers a panicking capability
    /// implementation.
    pub async fn run_job(&self, job_id: Uuid, input: JobInput) {
        tracing::info!(job_id = %job_id, "running job");
        let start = Instant::now();

        let outcome = AssertUnwindSafe(self.execute(input)).catch_unwind().await;
        metrics::histogram!("job_processing_seconds").record(start.elapsed().as_secs_f64());

        let write = match outcome {
            Ok(Ok(result)) => {
                tracing::info!(job_id = %job_id, count = result.count, "job completed");
                metrics::counter!("jobs_completed_total").increment(1);
                self.store.complete(job_id, result).await
            }
            Ok(Err(e)) => {
                tracing::error!(job_id = %job_id, error = %e, "job failed");
                metrics::counter!("jobs_failed_total").increment(1);
                self.store.fail(job_id, e.to_string()).await
            }
            Err(_) => {
                tracing::error!(job_id = %job_id, "job aborted by panic");
                metrics::counter!("jobs_failed_total").increment(1);
                self.store.fail(job_id, "job aborted unexpectedly").await
            }
        };

        if let Err(e) = write {
            tracing::error!(job_id = %job_id, error = %e, "failed to record job outcome");
        }
    }

    async fn execute(&self, input: JobInput) -> Result<ExtractionResult, JobError> {
        let bytes = match input {
            JobInput::Url(url) => {
                tracing::debug!(url = %url, "downloading image");
                self.fetcher.fetch(&url).await?
            }
            JobInput::Bytes(bytes) => bytes,
        };
        Ok(self.reader.process_bytes(&bytes).await?)
    }

    /// Drain-mode worker loop: process queued items until the queue is
    /// observed empty, then return.
    pub async fn drain(&self, queue: &WorkQueue) {
        while let Some(item) = queue.try_get().await {
            self.run_job(item.job_id, item.input).await;
        }
        tracing::debug!("work queue drained");
    }
}
