use std::sync::Arc;

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::job::{JobInput, JobStatus};
use crate::models::record::ExtractionResult;
use crate::pipeline::reader::PipelineError;
use crate::services::queue::WorkItem;
use crate::services::status::StoreError;

#[derive(Debug, Deserialize)]
pub struct SubmitUrlRequest {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub result: Option<ExtractionResult>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub job_ids: Vec<Uuid>,
}

/// POST /api/v1/process — run the pipeline inline and return the result.
pub async fn process_sync(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ExtractionResult>, (StatusCode, String)> {
    let image_data = read_image_field(multipart).await?;

    match state.reader.process_bytes(&image_data).await {
        Ok(result) => Ok(Json(result)),
        Err(e @ PipelineError::InvalidInput(_)) => Err((StatusCode::BAD_REQUEST, e.to_string())),
        Err(e) => Err((StatusCode::BAD_GATEWAY, e.to_string())),
    }
}

/// POST /api/v1/process/url — download a remote image and run the pipeline
/// inline. A failed or timed-out download is the caller's problem (400); a
/// capability failure is not (502).
pub async fn process_url(
    State(state): State<AppState>,
    Json(request): Json<SubmitUrlRequest>,
) -> Result<Json<ExtractionResult>, (StatusCode, String)> {
    if request.url.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "url must not be empty".to_string()));
    }

    let image_data = state
        .fetcher
        .fetch(&request.url)
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    match state.reader.process_bytes(&image_data).await {
        Ok(result) => Ok(Json(result)),
        Err(e @ PipelineError::InvalidInput(_)) => Err((StatusCode::BAD_REQUEST, e.to_string())),
        Err(e) => Err((StatusCode::BAD_GATEWAY, e.to_string())),
    }
}

/// POST /api/v1/jobs — submit an image URL as an async job.
pub async fn submit_url(
    State(state): State<AppState>,
    Json(request): Json<SubmitUrlRequest>,
) -> Result<Json<SubmitResponse>, (StatusCode, String)> {
    if request.url.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "url must not be empty".to_string()));
    }

    let job_id = state
        .runner
        .submit(JobInput::Url(request.url))
        .await
        .map_err(store_error)?;

    Ok(Json(SubmitResponse {
        job_id,
        status: JobStatus::Submitted,
    }))
}

/// POST /api/v1/jobs/upload — submit uploaded image bytes as an async job.
pub async fn submit_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SubmitResponse>, (StatusCode, String)> {
    let image_data = read_image_field(multipart).await?;

    let job_id = state
        .runner
        .submit(JobInput::Bytes(image_data))
        .await
        .map_err(store_error)?;

    Ok(Json(SubmitResponse {
        job_id,
        status: JobStatus::Submitted,
    }))
}

/// GET /api/v1/jobs/{job_id} — poll an async job.
pub async fn get_job_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobStatusResponse>, (StatusCode, String)> {
    match state.store.get(job_id).await {
        Ok(job) => Ok(Json(JobStatusResponse {
            job_id: job.id,
            status: job.status,
            result: job.result,
            error: job.error,
        })),
        Err(e @ StoreError::NotFound(_)) => Err((StatusCode::NOT_FOUND, e.to_string())),
        Err(e) => Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string())),
    }
}

/// POST /api/v1/batch — enqueue a list of image URLs and spawn drain workers.
/// Each URL gets its own pollable job.
pub async fn submit_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, (StatusCode, String)> {
    if request.urls.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "urls must not be empty".to_string()));
    }

    let mut job_ids = Vec::with_capacity(request.urls.len());
    for url in request.urls {
        let job_id = Uuid::new_v4();
        state.store.create(job_id).await.map_err(store_error)?;
        metrics::counter!("jobs_submitted_total").increment(1);
        state
            .queue
            .put(WorkItem {
                job_id,
                input: JobInput::Url(url),
            })
            .await;
        job_ids.push(job_id);
    }

    tracing::info!(jobs = job_ids.len(), workers = state.queue_workers, "batch enqueued");

    for _ in 0..state.queue_workers {
        let runner = Arc::clone(&state.runner);
        let queue = Arc::clone(&state.queue);
        tokio::spawn(async move {
            runner.drain(&queue).await;
        });
    }

    Ok(Json(BatchResponse { job_ids }))
}

/// Pull the `image` field out of a multipart upload and sanity-check that it
/// looks like a supported image format.
async fn read_image_field(mut multipart: Multipart) -> Result<Vec<u8>, (StatusCode, String)> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() == Some("image") {
            let data = field
                .bytes()
                .await
                .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

            image::guess_format(&data)
                .map_err(|e| (StatusCode::UNSUPPORTED_MEDIA_TYPE, e.to_string()))?;

            return Ok(data.to_vec());
        }
    }

    Err((StatusCode::BAD_REQUEST, "missing image field".to_string()))
}

fn store_error(e: StoreError) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}
