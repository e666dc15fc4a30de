//! Test doubles for the detector and extractor capabilities, plus small
//! image fixtures. No model is loaded anywhere in the test suite.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use image::{Rgb, RgbImage};

use price_tag_ocr::models::detection::{BoundingBox, Detection};
use price_tag_ocr::pipeline::reader::{PipelineConfig, PriceTagReader};
use price_tag_ocr::services::detector::{Detector, DetectorError};
use price_tag_ocr::services::extractor::{ExtractionError, TextExtractor};

/// Detector double returning a canned list of detections.
pub struct CannedDetector {
    pub detections: Vec<Detection>,
}

#[async_trait]
impl Detector for CannedDetector {
    async fn detect(
        &self,
        _image: &RgbImage,
        _confidence_threshold: f32,
    ) -> Result<Vec<Detection>, DetectorError> {
        Ok(self.detections.clone())
    }
}

/// Extractor double that numbers its calls; calls listed in `fail_on` return
/// an extraction error, the rest return "price N".
pub struct ScriptedExtractor {
    calls: AtomicUsize,
    fail_on: Vec<usize>,
}

impl ScriptedExtractor {
    pub fn succeeding() -> Self {
        Self::failing_on(Vec::new())
    }

    pub fn failing_on(fail_on: Vec<usize>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on,
        }
    }
}

#[async_trait]
impl TextExtractor for ScriptedExtractor {
    async fn extract_text(&self, _image: &RgbImage) -> Result<String, ExtractionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on.contains(&call) {
            Err(ExtractionError::Api("model rejected the crop".to_string()))
        } else {
            Ok(format!("price {call}"))
        }
    }
}

pub fn detection(x1: i64, y1: i64, x2: i64, y2: i64, confidence: f32) -> Detection {
    Detection {
        bbox: BoundingBox::new(x1, y1, x2, y2),
        confidence,
        class_name: "price_tag".to_string(),
    }
}

pub fn reader_with(
    detections: Vec<Detection>,
    extractor: ScriptedExtractor,
) -> PriceTagReader {
    PriceTagReader::new(
        Arc::new(CannedDetector { detections }),
        Arc::new(extractor),
        PipelineConfig::default(),
    )
}

/// A plain gray image of the given size.
pub fn test_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb([180, 180, 180]))
}

/// PNG bytes of a plain gray image, for byte-input paths.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = test_image(width, height);
    let mut buf = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("failed to encode test image");
    buf
}
