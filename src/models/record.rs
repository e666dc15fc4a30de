use serde::{Deserialize, Serialize};

use crate::models::detection::BoundingBox;

/// One extracted price tag. The box is post-clamping; `text` is empty when
/// extraction failed, with the failure detail in `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceTagRecord {
    pub bbox: BoundingBox,
    pub text: String,
    pub confidence: f32,
    #[serde(rename = "class")]
    pub class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of running the pipeline over one image. Records follow detection
/// order; `count` always equals `price_tags.len()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub count: usize,
    pub price_tags: Vec<PriceTagRecord>,
}

impl ExtractionResult {
    pub fn new(price_tags: Vec<PriceTagRecord>) -> Self {
        Self {
            count: price_tags.len(),
            price_tags,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::detection::BoundingBox;

    #[test]
    fn record_serializes_to_wire_shape() {
        let result = ExtractionResult::new(vec![PriceTagRecord {
            bbox: BoundingBox::new(4, 8, 120, 96),
            text: "$2.49".to_string(),
            confidence: 0.912,
            class_name: "price_tag".to_string(),
            error: None,
        }]);

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["count"], 1);
        let record = &json["price_tags"][0];
        assert_eq!(record["bbox"], serde_json::json!([4, 8, 120, 96]));
        assert_eq!(record["text"], "$2.49");
        assert_eq!(record["class"], "price_tag");
        // The error field is omitted entirely for healthy records.
        assert!(record.get("error").is_none());
    }

    #[test]
    fn degraded_record_carries_its_error() {
        let record = PriceTagRecord {
            bbox: BoundingBox::new(0, 0, 10, 10),
            text: String::new(),
            confidence: 0.3,
            class_name: "price_tag".to_string(),
            error: Some("extractor returned an error: timeout".to_string()),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["text"], "");
        assert!(json["error"].as_str().unwrap().contains("timeout"));
    }
}
