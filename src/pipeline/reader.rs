use std::sync::Arc;

use image::{imageops, RgbImage};

use crate::models::detection::Detection;
use crate::models::record::{ExtractionResult, PriceTagRecord};
use crate::pipeline::geometry;
use crate::services::detector::{Detector, DetectorError};
use crate::services::extractor::TextExtractor;

/// Pipeline tunables.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Minimum detector confidence for a box to be considered.
    pub confidence_threshold: f32,
    /// Maximum side length of a crop handed to the extractor.
    pub max_crop_dimension: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            max_crop_dimension: 1024,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("input is not a decodable image: {0}")]
    InvalidInput(#[from] image::ImageError),

    #[error("detector call failed: {0}")]
    Detector(#[from] DetectorError),
}

/// Detects price tags in an image and extracts the text of each region.
///
/// Failures are isolated per detection: a degenerate box is skipped, a failed
/// extraction produces a degraded record. Only an undecodable input or a
/// detector failure fails the whole call.
pub struct PriceTagReader {
    detector: Arc<dyn Detector>,
    extractor: Arc<dyn TextExtractor>,
    config: PipelineConfig,
}

impl PriceTagReader {
    pub fn new(
        detector: Arc<dyn Detector>,
        extractor: Arc<dyn TextExtractor>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            detector,
            extractor,
            config,
        }
    }

    /// Decode raw image bytes and run the pipeline.
    pub async fn process_bytes(&self, bytes: &[u8]) -> Result<ExtractionResult, PipelineError> {
        let image = image::load_from_memory(bytes)?.to_rgb8();
        self.process_image(&image).await
    }

    /// Run detection and per-region text extraction over an RGB image.
    pub async fn process_image(&self, image: &RgbImage) -> Result<ExtractionResult, PipelineError> {
        let (width, height) = image.dimensions();
        tracing::info!(width, height, "processing image");

        let detections = self
            .detector
            .detect(image, self.config.confidence_threshold)
            .await?;
        tracing::info!(detections = detections.len(), "detector returned regions");

        let mut price_tags = Vec::with_capacity(detections.len());
        for (index, detection) in detections.iter().enumerate() {
            if let Some(record) = self.process_detection(image, detection, index).await {
                price_tags.push(record);
            }
        }

        tracing::info!(count = price_tags.len(), "image processed");
        metrics::counter!("price_tags_extracted_total").increment(price_tags.len() as u64);

        Ok(ExtractionResult::new(price_tags))
    }

    /// Handle one detection. Returns `None` only when the clamped box is
    /// degenerate; extraction failures still yield a record.
    async fn process_detection(
        &self,
        image: &RgbImage,
        detection: &Detection,
        index: usize,
    ) -> Option<PriceTagRecord> {
        let (width, height) = image.dimensions();

        let bbox = match geometry::clamp_box(detection.bbox, width, height) {
            Ok(bbox) => bbox,
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping detection with invalid box");
                metrics::counter!("detections_skipped_total").increment(1);
                return None;
            }
        };

        let crop = imageops::crop_imm(
            image,
            bbox.x1 as u32,
            bbox.y1 as u32,
            (bbox.x2 - bbox.x1) as u32,
            (bbox.y2 - bbox.y1) as u32,
        )
        .to_image();
        let crop = geometry::pad_to_square(crop, geometry::WHITE);
        let crop = geometry::constrain_max_dimension(crop, self.config.max_crop_dimension);

        tracing::debug!(
            index,
            class = %detection.class_name,
            confidence = detection.confidence,
            "extracting text from region"
        );

        let (text, error) = match self.extractor.extract_text(&crop).await {
            Ok(text) => (text, None),
            Err(e) => {
                tracing::error!(index, error = %e, "text extraction failed for region");
                metrics::counter!("extraction_failures_total").increment(1);
                (String::new(), Some(e.to_string()))
            }
        };

        Some(PriceTagRecord {
            bbox,
            text,
            confidence: round_confidence(detection.confidence),
            class_name: detection.class_name.clone(),
            error,
        })
    }
}

/// Round a confidence score to three decimals for the wire format.
fn round_confidence(confidence: f32) -> f32 {
    (confidence * 1000.0).round() / 1000.0
}
