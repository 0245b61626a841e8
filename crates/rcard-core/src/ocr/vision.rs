//! Google Cloud Vision text detection client.

use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::OcrConfig;

use super::{OcrProvider, OcrText};

/// Vision API client authenticated with an API key.
#[derive(Debug, Clone)]
pub struct VisionClient {
    endpoint: String,
    api_key: String,
    language_hints: Vec<String>,
    client: reqwest::Client,
}

impl VisionClient {
    /// Create a client from configuration.
    ///
    /// Fails when no API key is configured or exported.
    pub fn new(config: &OcrConfig) -> Result<Self, OcrError> {
        let api_key = config
            .resolve_api_key()
            .ok_or_else(|| OcrError::MissingApiKey(config.api_key_env.clone()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OcrError::Request(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key,
            language_hints: config.language_hints.clone(),
            client,
        })
    }

    fn build_request(&self, image: &[u8]) -> AnnotateRequest {
        AnnotateRequest {
            requests: vec![AnnotateImageRequest {
                image: VisionImage {
                    content: general_purpose::STANDARD.encode(image),
                },
                features: vec![Feature {
                    kind: "TEXT_DETECTION".to_string(),
                }],
                image_context: ImageContext {
                    language_hints: self.language_hints.clone(),
                },
            }],
        }
    }
}

impl OcrProvider for VisionClient {
    async fn recognize(&self, image: &[u8]) -> Result<OcrText, OcrError> {
        info!("Sending {} bytes to Vision text detection", image.len());

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.build_request(image))
            .send()
            .await
            .map_err(|e| OcrError::Request(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OcrError::Request(e.to_string()))?;

        if !status.is_success() {
            // The body usually carries a JSON error with a readable message.
            return Err(match parse_error_message(&body) {
                Some(message) => OcrError::Api(format!("{} ({})", message, status)),
                None => OcrError::Api(format!("HTTP {}: {}", status, body.trim())),
            });
        }

        let text = parse_response(&body)?;
        debug!("Vision returned {} characters", text.len());
        Ok(OcrText::new(text))
    }
}

/// Extract the recognized text from an `images:annotate` response body.
///
/// Prefers the full-text annotation and falls back to the first text
/// annotation. A response without text yields an empty string.
pub fn parse_response(body: &str) -> Result<String, OcrError> {
    let response: AnnotateResponse =
        serde_json::from_str(body).map_err(|e| OcrError::InvalidResponse(e.to_string()))?;

    let Some(first) = response.responses.into_iter().next() else {
        return Ok(String::new());
    };

    // An error object with an empty message is not a failure.
    if let Some(error) = first.error.filter(|e| !e.message.is_empty()) {
        return Err(OcrError::Api(error.message));
    }

    if let Some(full) = first.full_text_annotation {
        return Ok(full.text);
    }

    Ok(first
        .text_annotations
        .into_iter()
        .next()
        .map(|a| a.description)
        .unwrap_or_default())
}

fn parse_error_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct Envelope {
        error: VisionStatus,
    }

    serde_json::from_str::<Envelope>(body)
        .ok()
        .map(|e| e.error.message)
        .filter(|m| !m.is_empty())
}

#[derive(Debug, Serialize)]
struct AnnotateRequest {
    requests: Vec<AnnotateImageRequest>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageRequest {
    image: VisionImage,
    features: Vec<Feature>,
    image_context: ImageContext,
}

#[derive(Debug, Serialize)]
struct VisionImage {
    content: String,
}

#[derive(Debug, Serialize)]
struct Feature {
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageContext {
    language_hints: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateImageResponse {
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    full_text_annotation: Option<TextAnnotation>,
    error: Option<VisionStatus>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TextAnnotation {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct VisionStatus {
    #[serde(default)]
    message: String,
}
