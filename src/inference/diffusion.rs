use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::inference::{summarize_error_body, ImageSynthesizer, InferenceError, RenderRequest};
use crate::utils::http::get_http_client;

/// Image synthesis against a Stable-Diffusion-WebUI-compatible txt2img
/// endpoint. The service returns base64-encoded bitmaps.
pub struct HttpImageSynthesizer {
    base_url: String,
    api_key: String,
}

impl HttpImageSynthesizer {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        HttpImageSynthesizer {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ImageSynthesizer for HttpImageSynthesizer {
    async fn synthesize(&self, request: &RenderRequest) -> Result<Vec<u8>, InferenceError> {
        let payload = json!({
            "prompt": request.prompt,
            "negative_prompt": request.negative_prompt,
            "steps": request.steps,
            "cfg_scale": request.guidance,
            "width": request.width,
            "height": request.height,
        });
        debug!(
            "Diffusion request: steps={}, guidance={}, {}x{}",
            request.steps, request.guidance, request.width, request.height
        );

        let client = get_http_client();
        let mut builder = client
            .post(format!(
                "{}/sdapi/v1/txt2img",
                self.base_url.trim_end_matches('/')
            ))
            .json(&payload);
        if !self.api_key.trim().is_empty() {
            builder = builder.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let response = builder.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = summarize_error_body(&body);
            warn!("Diffusion API error: status={}, body={}", status, detail);
            return Err(InferenceError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let value = response.json::<Value>().await?;
        let encoded = value
            .get("images")
            .and_then(|v| v.get(0))
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                InferenceError::MalformedResponse("no images in diffusion response".to_string())
            })?;

        general_purpose::STANDARD.decode(encoded).map_err(|err| {
            InferenceError::MalformedResponse(format!("image payload is not valid base64: {err}"))
        })
    }
}
