pub mod completion;
pub mod diffusion;

use async_trait::async_trait;
use thiserror::Error;

pub use completion::HttpTextCompleter;
pub use diffusion::HttpImageSynthesizer;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("inference service returned status {status}: {detail}")]
    Status { status: u16, detail: String },
    #[error("inference response was missing the expected payload: {0}")]
    MalformedResponse(String),
}

/// Text completion over an opaque pretrained model. Sampling-based and
/// non-deterministic; a failed call is permanent for the request.
#[async_trait]
pub trait TextCompleter: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError>;
}

#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub prompt: String,
    pub negative_prompt: String,
    pub steps: u32,
    pub guidance: f32,
    pub width: u32,
    pub height: u32,
}

/// Image diffusion over an opaque pretrained model: one request, one bitmap.
#[async_trait]
pub trait ImageSynthesizer: Send + Sync {
    async fn synthesize(&self, request: &RenderRequest) -> Result<Vec<u8>, InferenceError>;
}

fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

/// Pulls a human-readable error message out of a JSON error body when the
/// service provides one, otherwise returns a truncated raw body.
pub(crate) fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "empty response body".to_string();
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(message) = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .or_else(|| value.get("detail").and_then(|v| v.as_str()))
            .or_else(|| value.get("message").and_then(|v| v.as_str()))
        {
            return message.to_string();
        }
        return truncate_for_log(&value.to_string(), 800);
    }

    truncate_for_log(trimmed, 800)
}
