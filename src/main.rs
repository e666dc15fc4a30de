mod app_state;
mod config;
mod models;
mod pipeline;
mod routes;
mod services;

use axum::{routing::get, routing::post, Router};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use app_state::AppState;
use config::AppConfig;
use pipeline::reader::{PipelineConfig, PriceTagReader};
use services::{
    detector::{Detector, HttpDetector},
    extractor::{HttpTextExtractor, TextExtractor},
    fetch::ImageFetcher,
    queue::WorkQueue,
    runner::JobRunner,
    status::JobStatusStore,
};

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    // Load configuration from environment
    let config = AppConfig::from_env().expect("Failed to load configuration from environment");

    tracing::info!("Initializing price-tag-ocr server");

    // Initialize Prometheus metrics recorder
    let prometheus_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    let prometheus_handle = Arc::new(prometheus_handle);

    // Register application metrics
    metrics::describe_counter!("jobs_submitted_total", "Total extraction jobs submitted");
    metrics::describe_counter!("jobs_completed_total", "Total extraction jobs completed");
    metrics::describe_counter!("jobs_failed_total", "Total extraction jobs that failed");
    metrics::describe_histogram!(
        "job_processing_seconds",
        "Time to run one extraction job to a terminal state"
    );
    metrics::describe_gauge!(
        "work_queue_depth",
        "Current number of pending items in the work queue"
    );
    metrics::describe_counter!(
        "detections_skipped_total",
        "Detections dropped because their box was degenerate after clamping"
    );
    metrics::describe_counter!(
        "extraction_failures_total",
        "Crops for which text extraction failed"
    );
    metrics::describe_counter!(
        "price_tags_extracted_total",
        "Price tag records produced across all images"
    );

    // Capability clients for the model serving endpoints
    tracing::info!(detector_url = %config.detector_url, "Initializing detector client");
    let detector: Arc<dyn Detector> = Arc::new(HttpDetector::new(&config.detector_url));

    tracing::info!(extractor_url = %config.extractor_url, "Initializing extractor client");
    let extractor: Arc<dyn TextExtractor> = Arc::new(HttpTextExtractor::new(&config.extractor_url));

    let reader = Arc::new(PriceTagReader::new(
        detector,
        extractor,
        PipelineConfig {
            confidence_threshold: config.detection_confidence_threshold,
            max_crop_dimension: config.max_crop_dimension,
        },
    ));

    // Job bookkeeping and work distribution
    let store = Arc::new(JobStatusStore::new());
    let queue = Arc::new(WorkQueue::new());

    let fetcher = ImageFetcher::new(Duration::from_secs(config.fetch_timeout_secs))
        .expect("Failed to build HTTP client for image fetching");

    let runner = Arc::new(JobRunner::new(
        Arc::clone(&store),
        Arc::clone(&reader),
        fetcher.clone(),
    ));

    // Create shared application state
    let state = AppState::new(reader, store, queue, runner, fetcher, config.queue_workers);

    // Build API routes
    let app = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/v1/process", post(routes::jobs::process_sync))
        .route("/api/v1/process/url", post(routes::jobs::process_url))
        .route("/api/v1/jobs", post(routes::jobs::submit_url))
        .route("/api/v1/jobs/upload", post(routes::jobs::submit_upload))
        .route("/api/v1/jobs/{job_id}", get(routes::jobs::get_job_status))
        .route("/api/v1/batch", post(routes::jobs::submit_batch))
        .with_state(state)
        // Prometheus metrics endpoint (separate state)
        .route(
            "/metrics",
            get(routes::metrics::prometheus_metrics).with_state(prometheus_handle),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(RequestBodyLimitLayer::new(10 * 1024 * 1024)); // 10 MB limit

    tracing::info!("Starting price-tag-ocr on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await.expect("Server error");
}
