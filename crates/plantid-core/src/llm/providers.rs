use super::http_utils::{create_http_client, extract_completion_text, send_json_request};
use super::{ContentPart, LlmError, VisionProvider, VisionRequest};
use crate::config::AnalysisSettings;
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use tracing::debug;

/// Vision provider for OpenAI-compatible chat-completions endpoints
pub struct OpenAiVisionProvider {
    http_client: HttpClient,
    api_key: String,
    api_base: String,
}

impl OpenAiVisionProvider {
    /// Create a new provider instance
    #[must_use]
    pub fn new(api_key: String, api_base: &str, timeout_secs: u64) -> Self {
        Self {
            http_client: create_http_client(timeout_secs),
            api_key,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// Create a provider from analysis settings
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingConfig` if the API key is blank.
    pub fn from_settings(settings: &AnalysisSettings) -> Result<Self, LlmError> {
        if settings.openai_api_key.trim().is_empty() {
            return Err(LlmError::MissingConfig("OPENAI_API_KEY".to_string()));
        }
        Ok(Self::new(
            settings.openai_api_key.clone(),
            &settings.openai_api_base,
            settings.llm_http_timeout_secs,
        ))
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base)
    }
}

/// Build the chat-completions JSON body for a request.
#[must_use]
pub fn build_request_body(request: &VisionRequest) -> Value {
    let content: Vec<Value> = request
        .parts
        .iter()
        .map(|part| match part {
            ContentPart::Text(text) => json!({"type": "text", "text": text}),
            ContentPart::ImageUrl(url) => json!({
                "type": "image_url",
                "image_url": {"url": url, "detail": "auto"}
            }),
        })
        .collect();

    json!({
        "model": request.model,
        "messages": [
            {"role": "system", "content": request.system_prompt},
            {"role": "user", "content": content}
        ],
        "temperature": request.temperature,
        "max_tokens": request.max_tokens
    })
}

#[async_trait]
impl VisionProvider for OpenAiVisionProvider {
    async fn complete(&self, request: VisionRequest) -> Result<String, LlmError> {
        let body = build_request_body(&request);
        debug!(
            model = %request.model,
            has_image = request.has_image(),
            "Sending vision completion request"
        );

        let auth = format!("Bearer {}", self.api_key);
        let res_json =
            send_json_request(&self.http_client, &self.completions_url(), &body, Some(&auth))
                .await?;
        extract_completion_text(&res_json)
    }
}
