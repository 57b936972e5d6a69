//! Vision model providers
//!
//! A narrow chat-completion interface: one system prompt, one user turn made
//! of text and inline image parts, one text completion back.

mod http_utils;
/// Implementations of specific providers
pub mod providers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use providers::OpenAiVisionProvider;

/// Errors that can occur while calling the model
#[derive(Debug, Error)]
pub enum LlmError {
    /// Error returned by the provider's API
    #[error("API error: {0}")]
    ApiError(String),
    /// Error during network communication
    #[error("Network error: {0}")]
    NetworkError(String),
    /// The request did not complete within the configured timeout
    #[error("Request timed out: {0}")]
    Timeout(String),
    /// The API rejected the credentials (401/403)
    #[error("Authentication failed: {0}")]
    Authentication(String),
    /// The API rejected the request as malformed (400/404/422)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    /// The HTTP response body could not be decoded
    #[error("JSON error: {0}")]
    JsonError(String),
    /// Missing provider configuration
    #[error("Missing client/API key: {0}")]
    MissingConfig(String),
}

/// One part of a multimodal user message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentPart {
    /// Plain instruction text
    Text(String),
    /// Image reference, usually a `data:` URL
    ImageUrl(String),
}

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq)]
pub struct VisionRequest {
    /// Model identifier
    pub model: String,
    /// System message content
    pub system_prompt: String,
    /// User message content, in order
    pub parts: Vec<ContentPart>,
    /// Sampling temperature
    pub temperature: f32,
    /// Completion token limit
    pub max_tokens: u32,
}

impl VisionRequest {
    /// Whether the user message carries an image part
    #[must_use]
    pub fn has_image(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, ContentPart::ImageUrl(_)))
    }
}

/// Interface for chat-completion style vision models
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait VisionProvider: Send + Sync {
    /// Send the request and return the raw text of the first completion.
    async fn complete(&self, request: VisionRequest) -> Result<String, LlmError>;
}
