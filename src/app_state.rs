use std::sync::Arc;

use crate::pipeline::reader::PriceTagReader;
use crate::services::{
    fetch::ImageFetcher, queue::WorkQueue, runner::JobRunner, status::JobStatusStore,
};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub reader: Arc<PriceTagReader>,
    pub store: Arc<JobStatusStore>,
    pub queue: Arc<WorkQueue>,
    pub runner: Arc<JobRunner>,
    pub fetcher: ImageFetcher,
    pub queue_workers: usize,
}

impl AppState {
    pub fn new(
        reader: Arc<PriceTagReader>,
        store: Arc<JobStatusStore>,
        queue: Arc<WorkQueue>,
        runner: Arc<JobRunner>,
        fetcher: ImageFetcher,
        queue_workers: usize,
    ) -> Self {
        Self {
            reader,
            store,
            queue,
            runner,
            fetcher,
            queue_workers,
        }
    }
}
