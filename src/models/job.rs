use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::record::ExtractionResult;

/// Status of an async extraction job. A job starts `submitted` and moves
/// exactly once to `completed` or `failed`; there are no other transitions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Submitted,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Submitted)
    }
}

/// An asynchronously executed extraction job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub result: Option<ExtractionResult>,
    pub error: Option<String>,
}

impl Job {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id,
            status: JobStatus::Submitted,
            created_at: now,
            updated_at: now,
            result: None,
            error: None,
        }
    }
}

/// Input accepted by the job runner: a remote image URL or raw bytes from an
/// upload.
#[derive(Debug, Clone)]
pub enum JobInput {
    Url(String),
    Bytes(Vec<u8>),
}
