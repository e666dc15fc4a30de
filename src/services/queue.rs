use std::collections::VecDeque;

use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

use crate::models::job::JobInput;

/// Unit of pending work: a job id paired with its image input.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub job_id: Uuid,
    pub input: JobInput,
}

/// In-process work queue shared between submitters and drain workers.
///
/// Each enqueued item is delivered to exactly one consumer. FIFO order is
/// provided but nothing downstream depends on it.
#[derive(Default)]
pub struct WorkQueue {
    items: Mutex<VecDeque<WorkItem>>,
    notify: Notify,
}

impl WorkQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, item: WorkItem) {
        self.items.lock().await.push_back(item);
        metrics::gauge!("work_queue_depth").increment(1.0);
        self.notify.notify_one();
    }

    /// Non-blocking pop; `None` when the queue is observed empty. Drain-mode
    /// worker loops use this to terminate instead of parking forever.
    pub async fn try_get(&self) -> Option<WorkItem> {
        let item = self.items.lock().await.pop_front();
        if item.is_some() {
            metrics::gauge!("work_queue_depth").decrement(1.0);
        }
        item
    }

    /// Blocking pop: waits until an item is available.
    ///
    /// The `Notified` future is created before the deque is re-checked, so a
    /// `put` landing between the check and the await still wakes this
    /// consumer instead of coalescing into a single stored permit.
    pub async fn get(&self) -> WorkItem {
        loop {
            let notified = self.notify.notified();
            if let Some(item) = self.try_get().await {
                return item;
            }
            notified.await;
        }
    }

    pub async fn is_empty(&self) -> bool {
        self.items.lock().await.is_empty()
    }

    pub async fn depth(&self) -> usize {
        self.items.lock().await.len()
    }
}
