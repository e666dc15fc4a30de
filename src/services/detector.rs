use async_trait::async_trait;
use image::RgbImage;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::models::detection::{BoundingBox, Detection};
use crate::services::encode_image_base64;

/// Capability interface for the price tag detection model.
///
/// Implementations must return boxes in absolute pixel coordinates and
/// confidences in [0, 1], in the order the model reports them.
#[async_trait]
pub trait Detector: Send + Sync {
    async fn detect(
        &self,
        image: &RgbImage,
        confidence_threshold: f32,
    ) -> Result<Vec<Detection>, DetectorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("failed to encode image for detector request: {0}")]
    Encode(#[from] image::ImageError),

    #[error("detector request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Client for an HTTP model serving endpoint wrapping the detection model.
pub struct HttpDetector {
    http: Client,
    endpoint: String,
}

#[derive(Serialize)]
struct DetectRequest<'a> {
    image: &'a str,
    confidence_threshold: f32,
}

#[derive(Deserialize)]
struct DetectResponse {
    detections: Vec<WireDetection>,
}

#[derive(Deserialize)]
struct WireDetection {
    bbox: [i64; 4],
    confidence: f32,
    class: String,
}

impl HttpDetector {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl Detector for HttpDetector {
    async fn detect(
        &self,
        image: &RgbImage,
        confidence_threshold: f32,
    ) -> Result<Vec<Detection>, DetectorError> {
        let encoded = encode_image_base64(image)?;
        let request = DetectRequest {
            image: &encoded,
            confidence_threshold,
        };

        let response: DetectResponse = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .detections
            .into_iter()
            .map(|d| Detection {
                bbox: BoundingBox::from(d.bbox),
                confidence: d.confidence,
                class_name: d.class,
            })
            .collect())
    }
}
