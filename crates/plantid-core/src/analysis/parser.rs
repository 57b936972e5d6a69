//! Defensive parsing of model completions.

use serde_json::Value;
use tracing::warn;

use super::types::AnalysisResult;

/// Remove a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
///
/// Only a fence that opens the text is stripped; the closing fence line is
/// dropped if present. Text without a leading fence is returned trimmed.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }

    // Drop the opening fence line; a fence with nothing after it leaves nothing.
    let Some((_, body)) = trimmed.split_once('\n') else {
        return trimmed;
    };

    let body = body.trim_end();
    let body = match body.rsplit_once('\n') {
        Some((head, last)) if last.trim().starts_with("```") => head,
        None if body.trim().starts_with("```") => "",
        _ => body,
    };
    body.trim()
}

/// Parse a completion into an [`AnalysisResult`].
///
/// Anything that is not a JSON object (invalid JSON, a string, a number,
/// an array) yields [`AnalysisResult::malformed_response_fallback`].
#[must_use]
pub fn parse_completion(raw: &str) -> AnalysisResult {
    let cleaned = strip_code_fences(raw);

    let value: Value = match serde_json::from_str(cleaned) {
        Ok(value) => value,
        Err(e) => {
            warn!("Model reply is not valid JSON ({e}), using fallback result");
            return AnalysisResult::malformed_response_fallback();
        }
    };

    if !value.is_object() {
        warn!("Model reply is JSON but not an object, using fallback result");
        return AnalysisResult::malformed_response_fallback();
    }

    serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("Model reply object could not be read ({e}), using fallback result");
        AnalysisResult::malformed_response_fallback()
    })
}
