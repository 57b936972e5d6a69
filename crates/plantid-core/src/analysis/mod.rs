//! Plant analysis client
//!
//! Turns (image, text) into a model request, calls the model and parses the
//! reply into an [`AnalysisResult`]. Unusable replies are replaced by a
//! neutral fallback; transport and API failures are returned to the caller.

mod parser;
/// Instruction and system prompts.
pub mod prompt;
/// Result types.
pub mod types;

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use tracing::{debug, info, instrument};

use crate::config::AnalysisSettings;
use crate::llm::{ContentPart, LlmError, OpenAiVisionProvider, VisionProvider, VisionRequest};

pub use parser::{parse_completion, strip_code_fences};
pub use prompt::{build_instruction, AnalysisInput, RESPONSE_FIELDS, SYSTEM_PROMPT};
pub use types::{AnalysisResult, Difficulty, PlantReport};

/// Inline image, encoded as a `data:` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    data_url: String,
}

impl ImagePayload {
    /// Encode raw JPEG bytes as a base64 data URL.
    #[must_use]
    pub fn from_jpeg_bytes(bytes: &[u8]) -> Self {
        Self {
            data_url: format!("data:image/jpeg;base64,{}", BASE64.encode(bytes)),
        }
    }

    /// Use an already formed URL (remote or `data:`).
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            data_url: url.into(),
        }
    }

    /// The URL sent to the model
    #[must_use]
    pub fn as_url(&self) -> &str {
        &self.data_url
    }
}

/// Client that identifies plants through a vision model
pub struct AnalysisClient {
    provider: Arc<dyn VisionProvider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnalysisClient {
    /// Create a client backed by the OpenAI-compatible HTTP provider.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::MissingConfig` if the API key is blank.
    pub fn new(settings: &AnalysisSettings) -> Result<Self, LlmError> {
        let provider = OpenAiVisionProvider::from_settings(settings)?;
        Ok(Self::with_provider(Arc::new(provider), settings))
    }

    /// Create a client over any provider, taking model parameters from settings.
    #[must_use]
    pub fn with_provider(provider: Arc<dyn VisionProvider>, settings: &AnalysisSettings) -> Self {
        Self {
            provider,
            model: settings.openai_vision_model.clone(),
            temperature: settings.analysis_temperature,
            max_tokens: settings.analysis_max_tokens,
        }
    }

    /// Model name requests are sent to
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the model request for the given inputs.
    #[must_use]
    pub fn build_request(
        &self,
        input: &AnalysisInput<'_>,
        image: Option<&ImagePayload>,
        system_prompt: &str,
    ) -> VisionRequest {
        let mut parts = vec![ContentPart::Text(build_instruction(input))];
        if let Some(image) = image {
            parts.push(ContentPart::ImageUrl(image.as_url().to_string()));
        }

        VisionRequest {
            model: self.model.clone(),
            system_prompt: system_prompt.to_string(),
            parts,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    /// Identify a plant from a photo, a description, or both.
    ///
    /// With neither input, returns the low-quality fallback without calling
    /// the model. A reply that is not a JSON object yields the neutral
    /// malformed-response fallback.
    ///
    /// # Errors
    ///
    /// Returns the provider's `LlmError` when the model call itself fails.
    #[instrument(skip_all, fields(model = %self.model))]
    pub async fn analyze(
        &self,
        image: Option<&ImagePayload>,
        system_prompt: &str,
        text: Option<&str>,
    ) -> Result<AnalysisResult, LlmError> {
        let Some(input) = AnalysisInput::from_parts(image.is_some(), text) else {
            info!("No image or text supplied, returning fallback result");
            return Ok(AnalysisResult::no_input_fallback());
        };

        let request = self.build_request(&input, image, system_prompt);
        debug!(
            has_image = input.has_image(),
            parts = request.parts.len(),
            "Requesting plant analysis"
        );

        let raw = self.provider.complete(request).await?;
        Ok(parse_completion(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockVisionProvider;

    fn settings() -> AnalysisSettings {
        AnalysisSettings::with_api_key("test-key")
    }

    #[tokio::test]
    async fn test_no_input_skips_model_call() {
        let mut mock = MockVisionProvider::new();
        mock.expect_complete().times(0);
        let client = AnalysisClient::with_provider(Arc::new(mock), &settings());

        let result = client
            .analyze(None, SYSTEM_PROMPT, None)
            .await
            .expect("fallback is not an error");

        assert!(result.low_quality);
        assert_eq!(result.plant_name.as_deref(), Some("Unknown plant"));
        assert_eq!(result.description.as_deref(), Some("Could not identify the plant"));
        assert_eq!(result.scientific_name, None);
    }

    #[tokio::test]
    async fn test_blank_text_counts_as_no_input() {
        let mut mock = MockVisionProvider::new();
        mock.expect_complete().times(0);
        let client = AnalysisClient::with_provider(Arc::new(mock), &settings());

        let result = client
            .analyze(None, SYSTEM_PROMPT, Some("  \n"))
            .await
            .expect("fallback is not an error");
        assert!(result.low_quality);
    }

    #[tokio::test]
    async fn test_image_request_shape() {
        let image = ImagePayload::from_jpeg_bytes(&[0xFF, 0xD8, 0xFF]);
        let expected_url = image.as_url().to_string();

        let mut mock = MockVisionProvider::new();
        mock.expect_complete()
            .withf(move |req| {
                req.system_prompt == SYSTEM_PROMPT
                    && req.max_tokens == 800
                    && req.parts.len() == 2
                    && matches!(&req.parts[0], ContentPart::Text(t) if t.contains("'on a windowsill'"))
                    && req.parts[1] == ContentPart::ImageUrl(expected_url.clone())
            })
            .times(1)
            .returning(|_| Ok("```json\n{\"plant_name\":\"Monstera\"}\n```".to_string()));
        let client = AnalysisClient::with_provider(Arc::new(mock), &settings());

        let result = client
            .analyze(Some(&image), SYSTEM_PROMPT, Some("on a windowsill"))
            .await
            .expect("analysis succeeds");
        assert_eq!(result.plant_name.as_deref(), Some("Monstera"));
    }

    #[tokio::test]
    async fn test_text_request_has_no_image_part() {
        let mut mock = MockVisionProvider::new();
        mock.expect_complete()
            .withf(|req| !req.has_image() && req.parts.len() == 1)
            .times(1)
            .returning(|_| Ok("{\"plant_name\":\"Fern\",\"low_quality\":false}".to_string()));
        let client = AnalysisClient::with_provider(Arc::new(mock), &settings());

        let result = client
            .analyze(None, SYSTEM_PROMPT, Some("feathery green fronds"))
            .await
            .expect("analysis succeeds");
        assert_eq!(result.plant_name.as_deref(), Some("Fern"));
        assert!(!result.low_quality);
    }

    #[tokio::test]
    async fn test_malformed_reply_is_not_an_error() {
        let mut mock = MockVisionProvider::new();
        mock.expect_complete()
            .returning(|_| Ok("I think this is a rose.".to_string()));
        let client = AnalysisClient::with_provider(Arc::new(mock), &settings());

        let result = client
            .analyze(None, SYSTEM_PROMPT, Some("red flower"))
            .await
            .expect("malformed replies are downgraded");
        assert_eq!(result, AnalysisResult::malformed_response_fallback());
    }

    #[tokio::test]
    async fn test_provider_failure_is_surfaced() {
        let mut mock = MockVisionProvider::new();
        mock.expect_complete()
            .returning(|_| Err(LlmError::Authentication("401 Unauthorized".to_string())));
        let client = AnalysisClient::with_provider(Arc::new(mock), &settings());

        let result = client.analyze(None, SYSTEM_PROMPT, Some("red flower")).await;
        assert!(matches!(result, Err(LlmError::Authentication(_))));
    }

    #[test]
    fn test_image_payload_data_url() {
        let image = ImagePayload::from_jpeg_bytes(b"abc");
        assert_eq!(image.as_url(), "data:image/jpeg;base64,YWJj");
    }
}
