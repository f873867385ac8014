//! Cloud vision OCR client
//!
//! Text extraction is delegated entirely to a hosted vision API; this module
//! only marshals the request (base64 image content, TEXT_DETECTION feature)
//! and pulls the first annotation out of the response.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::{LprError, Result};

const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";
const USER_AGENT: &str = "tvr-lpr/0.1.0";

/// Text recognition seam
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Extract text from an encoded image; empty string when nothing is found
    async fn recognize(&self, image_bytes: &[u8]) -> Result<String>;
}

// ========================================
// Request/Response Types
// ========================================

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateRequestItem>,
}

#[derive(Debug, Serialize)]
struct AnnotateRequestItem {
    image: ImageContent,
    features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
struct ImageContent {
    /// Base64-encoded image bytes
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    feature_type: String,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    responses: Vec<AnnotateResponseItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResponseItem {
    text_annotations: Option<Vec<TextAnnotation>>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    /// Full detected text; the first annotation covers the whole region
    description: String,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    code: Option<i32>,
    message: Option<String>,
}

// ========================================
// Client
// ========================================

/// Hosted vision API client
pub struct VisionOcrClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl VisionOcrClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(DEFAULT_ENDPOINT, api_key)
    }

    /// Point the client at a different annotate endpoint (test servers)
    pub fn with_endpoint(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| LprError::Ocr(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl TextRecognizer for VisionOcrClient {
    async fn recognize(&self, image_bytes: &[u8]) -> Result<String> {
        let content = base64::engine::general_purpose::STANDARD.encode(image_bytes);

        let request = AnnotateRequest {
            requests: vec![AnnotateRequestItem {
                image: ImageContent { content },
                features: vec![Feature {
                    feature_type: "TEXT_DETECTION".to_string(),
                }],
            }],
        };

        let url = format!("{}?key={}", self.endpoint, self.api_key);
        debug!("Sending {} byte image to vision API", image_bytes.len());

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| LprError::Ocr(format!("Network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LprError::OcrApi(status.as_u16(), body));
        }

        let annotate: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| LprError::Ocr(format!("Invalid response body: {}", e)))?;

        let Some(item) = annotate.responses.into_iter().next() else {
            return Ok(String::new());
        };

        if let Some(error) = item.error {
            if let Some(message) = error.message.filter(|m| !m.is_empty()) {
                return Err(LprError::OcrApi(
                    error.code.unwrap_or(0) as u16,
                    message,
                ));
            }
        }

        // First annotation spans the whole region; the rest are per-word
        let text = item
            .text_annotations
            .and_then(|annotations| annotations.into_iter().next())
            .map(|annotation| annotation.description.trim().to_string())
            .unwrap_or_default();

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = AnnotateRequest {
            requests: vec![AnnotateRequestItem {
                image: ImageContent {
                    content: "aGVsbG8=".to_string(),
                },
                features: vec![Feature {
                    feature_type: "TEXT_DETECTION".to_string(),
                }],
            }],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["requests"][0]["image"]["content"], "aGVsbG8=");
        assert_eq!(json["requests"][0]["features"][0]["type"], "TEXT_DETECTION");
    }

    #[test]
    fn test_response_first_annotation_wins() {
        let body = r#"{
            "responses": [{
                "textAnnotations": [
                    {"description": "ABC-123\n"},
                    {"description": "ABC"},
                    {"description": "123"}
                ]
            }]
        }"#;

        let parsed: AnnotateResponse = serde_json::from_str(body).unwrap();
        let item = parsed.responses.into_iter().next().unwrap();
        let first = item.text_annotations.unwrap().into_iter().next().unwrap();
        assert_eq!(first.description.trim(), "ABC-123");
    }

    #[test]
    fn test_response_without_annotations_parses() {
        let body = r#"{ "responses": [{}] }"#;
        let parsed: AnnotateResponse = serde_json::from_str(body).unwrap();
        assert!(parsed.responses[0].text_annotations.is_none());
        assert!(parsed.responses[0].error.is_none());
    }
}
