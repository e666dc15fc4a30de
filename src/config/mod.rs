use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "0.0.0.0:8000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// URL of the detection model serving endpoint
    pub detector_url: String,

    /// URL of the text extraction (OCR) model serving endpoint
    pub extractor_url: String,

    /// Minimum detector confidence for a box to be considered.
    /// Deployments have run with 0.1 and 0.25; this is policy, not structure.
    #[serde(default = "default_confidence_threshold")]
    pub detection_confidence_threshold: f32,

    /// Maximum side length (px) of a crop handed to the extractor
    #[serde(default = "default_max_crop_dimension")]
    pub max_crop_dimension: u32,

    /// Timeout for downloading remote images, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Number of drain workers spawned per batch submission
    #[serde(default = "default_queue_workers")]
    pub queue_workers: usize,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_confidence_threshold() -> f32 {
    0.25
}

fn default_max_crop_dimension() -> u32 {
    1024
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_queue_workers() -> usize {
    2
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }
}
