use async_trait::async_trait;
use image::RgbImage;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::services::encode_image_base64;

/// Prompt sent with every crop. The OCR model is instruction-tuned, so the
/// prompt is part of the extraction contract.
const OCR_PROMPT: &str = "Extract all text from this price tag image, including prices, \
     product names, weights, and any other relevant information. \
     Format prices with currency symbols if present.";

const MAX_TOKENS: u32 = 256;

/// Capability interface for the OCR model.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, image: &RgbImage) -> Result<String, ExtractionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("failed to encode crop for extractor request: {0}")]
    Encode(#[from] image::ImageError),

    #[error("extractor request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("extractor returned an error: {0}")]
    Api(String),
}

/// Client for an HTTP model serving endpoint wrapping the OCR model.
pub struct HttpTextExtractor {
    http: Client,
    endpoint: String,
}

#[derive(Serialize)]
struct ExtractRequest<'a> {
    image: &'a str,
    prompt: &'static str,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ExtractResponse {
    text: Option<String>,
    error: Option<String>,
}

impl HttpTextExtractor {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl TextExtractor for HttpTextExtractor {
    async fn extract_text(&self, image: &RgbImage) -> Result<String, ExtractionError> {
        let encoded = encode_image_base64(image)?;
        let request = ExtractRequest {
            image: &encoded,
            prompt: OCR_PROMPT,
            max_tokens: MAX_TOKENS,
        };

        let response: ExtractResponse = self
            .http
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if let Some(error) = response.error {
            return Err(ExtractionError::Api(error));
        }

        Ok(response.text.unwrap_or_default().trim().to_string())
    }
}
