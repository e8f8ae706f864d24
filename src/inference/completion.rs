use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::inference::{summarize_error_body, InferenceError, TextCompleter};
use crate::utils::http::get_http_client;

/// Text completion against an OpenAI-compatible chat-completions endpoint.
pub struct HttpTextCompleter {
    base_url: String,
    api_key: String,
    model: String,
    system_prompt: String,
    temperature: f32,
    max_tokens: u32,
}

impl HttpTextCompleter {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        system_prompt: impl Into<String>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        HttpTextCompleter {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
            system_prompt: system_prompt.into(),
            temperature,
            max_tokens,
        }
    }
}

#[async_trait]
impl TextCompleter for HttpTextCompleter {
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError> {
        let payload = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": self.system_prompt },
                { "role": "user", "content": prompt },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });
        debug!(
            "Text completion request: model={}, prompt_chars={}",
            self.model,
            prompt.chars().count()
        );

        let client = get_http_client();
        let response = client
            .post(format!(
                "{}/chat/completions",
                self.base_url.trim_end_matches('/')
            ))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = summarize_error_body(&body);
            warn!("Text completion error: status={}, body={}", status, detail);
            return Err(InferenceError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        let value = response.json::<Value>().await?;
        let content = value
            .get("choices")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("message"))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .trim()
            .to_string();

        if content.is_empty() {
            return Err(InferenceError::MalformedResponse(
                "completion had no message content".to_string(),
            ));
        }
        Ok(content)
    }
}
