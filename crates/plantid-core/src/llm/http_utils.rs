//! HTTP utilities for LLM providers
//!
//! Request/response plumbing shared by the JSON-over-HTTP providers.

use crate::llm::LlmError;
use reqwest::{Client as HttpClient, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::warn;

/// Maximum number of characters of an error body kept in error messages.
const ERROR_BODY_LIMIT: usize = 500;

/// Creates an HTTP client with the given request timeout.
///
/// Falls back to a client without a custom timeout if the builder fails.
#[must_use]
pub fn create_http_client(timeout_secs: u64) -> HttpClient {
    HttpClient::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|e| {
            warn!("Failed to build HTTP client with timeout, using defaults: {e}");
            HttpClient::new()
        })
}

/// Sends an HTTP POST request with JSON body and returns parsed JSON response.
///
/// # Errors
///
/// - `LlmError::Timeout` / `LlmError::NetworkError` when the request does not complete
/// - `LlmError::Authentication` on 401/403
/// - `LlmError::InvalidRequest` on 400/404/422
/// - `LlmError::ApiError` on any other non-success status
/// - `LlmError::JsonError` if the body is not JSON
pub async fn send_json_request(
    client: &HttpClient,
    url: &str,
    body: &Value,
    auth_header: Option<&str>,
) -> Result<Value, LlmError> {
    let mut request = client.post(url).json(body);

    if let Some(auth) = auth_header {
        request = request.header("Authorization", auth);
    }

    let response = request.send().await.map_err(map_transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        return Err(classify_status(status, &error_text));
    }

    response
        .json()
        .await
        .map_err(|e| LlmError::JsonError(e.to_string()))
}

fn map_transport_error(e: reqwest::Error) -> LlmError {
    if e.is_timeout() {
        LlmError::Timeout(e.to_string())
    } else {
        LlmError::NetworkError(e.to_string())
    }
}

/// Map a non-success status and its body to an error variant.
pub(crate) fn classify_status(status: StatusCode, error_text: &str) -> LlmError {
    let message = clean_error_body(status, error_text);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::Authentication(message),
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => {
            LlmError::InvalidRequest(message)
        }
        _ => LlmError::ApiError(message),
    }
}

fn clean_error_body(status: StatusCode, error_text: &str) -> String {
    let trimmed = error_text.trim_start();
    // Nginx/proxy error pages
    let is_html = trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<HTML");

    if is_html {
        return format!("{status} (Server returned HTML error page)");
    }

    if error_text.chars().count() > ERROR_BODY_LIMIT {
        let truncated: String = error_text.chars().take(ERROR_BODY_LIMIT).collect();
        format!("{status} - {truncated}... (truncated)")
    } else {
        format!("{status} - {error_text}")
    }
}

/// Extracts the first completion text from a chat-completions response.
///
/// A `null` content is returned as `"{}"` so that an empty completion parses
/// as an empty object rather than failing.
///
/// # Errors
///
/// Returns `LlmError::ApiError` if the response has no choices or the content
/// is neither a string nor `null`.
pub fn extract_completion_text(response: &Value) -> Result<String, LlmError> {
    let message = response
        .get("choices")
        .and_then(|choices| choices.get(0))
        .and_then(|choice| choice.get("message"))
        .ok_or_else(|| LlmError::ApiError("Empty response".to_string()))?;

    match message.get("content") {
        None | Some(Value::Null) => Ok("{}".to_string()),
        Some(Value::String(text)) => Ok(text.clone()),
        Some(other) => Err(LlmError::ApiError(format!(
            "Expected string content, got: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_completion_text() {
        let response = json!({"choices": [{"message": {"content": "{\"plant_name\":\"Rose\"}"}}]});
        let text = extract_completion_text(&response).expect("content should be extracted");
        assert_eq!(text, "{\"plant_name\":\"Rose\"}");
    }

    #[test]
    fn test_extract_null_content_as_empty_object() {
        let response = json!({"choices": [{"message": {"content": null}}]});
        let text = extract_completion_text(&response).expect("null content is allowed");
        assert_eq!(text, "{}");
    }

    #[test]
    fn test_extract_without_choices_is_api_error() {
        let response = json!({"choices": []});
        assert!(matches!(
            extract_completion_text(&response),
            Err(LlmError::ApiError(_))
        ));
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "bad key"),
            LlmError::Authentication(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST, "{}"),
            LlmError::InvalidRequest(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, "oops"),
            LlmError::ApiError(_)
        ));
    }

    #[test]
    fn test_html_error_page_is_not_echoed() {
        let err = classify_status(StatusCode::BAD_GATEWAY, "<html><body>502</body></html>");
        let text = err.to_string();
        assert!(text.contains("HTML error page"));
        assert!(!text.contains("<body>"));
    }

    #[test]
    fn test_long_error_body_is_truncated_on_char_boundary() {
        let body = "é".repeat(ERROR_BODY_LIMIT + 10);
        let err = classify_status(StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert!(err.to_string().ends_with("... (truncated)"));
    }
}
