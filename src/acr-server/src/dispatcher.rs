//! Request dispatcher.
//!
//! Turns a validated review or generation request into one upstream call
//! and always produces displayable text from the outcome.

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::prompts::{build_generate_prompt, build_review_prompt};
use crate::upstream::{Mode, UpstreamClient, UpstreamResult};

/// Dispatches review and generation requests to the upstream model.
#[derive(Debug, Clone)]
pub struct RequestDispatcher {
    upstream: UpstreamClient,
}

impl RequestDispatcher {
    /// Create a dispatcher over an upstream client.
    pub fn new(upstream: UpstreamClient) -> Self {
        Self { upstream }
    }

    /// Get the upstream client.
    pub fn upstream(&self) -> &UpstreamClient {
        &self.upstream
    }

    /// Review a code snippet.
    pub async fn review(&self, code: &str, language: &str) -> AppResult<String> {
        if code.is_empty() {
            return Err(AppError::Validation("code is required".to_string()));
        }

        let prompt = build_review_prompt(code, language);
        let result = self.upstream.call(&prompt, Mode::CodeReview).await;
        info!(language, mock = result.is_mock(), "Review completed");

        Ok(extract_text(result, Mode::CodeReview, || {
            format!(
                "Mock review: no GROQ API configured. Received code length {}.",
                code.chars().count()
            )
        }))
    }

    /// Generate code from a description.
    pub async fn generate(&self, description: &str, language: &str) -> AppResult<String> {
        if description.is_empty() {
            return Err(AppError::Validation("description is required".to_string()));
        }

        let prompt = build_generate_prompt(description, language);
        let result = self.upstream.call(&prompt, Mode::CodeGeneration).await;
        info!(language, mock = result.is_mock(), "Generation completed");

        Ok(extract_text(result, Mode::CodeGeneration, || {
            format!(
                "// Mock generated {language} code\n\
                 // Description: {description}\n\
                 console.log('GROQ not configured: set GROQ_API_URL and GROQ_API_KEY in the server environment');"
            )
        }))
    }
}

/// Fields checked, in order, for the text of a provider response.
fn text_fields(mode: Mode) -> &'static [&'static str] {
    match mode {
        Mode::CodeReview => &["text", "result"],
        Mode::CodeGeneration => &["code", "text", "result"],
    }
}

/// Pick the display text out of an upstream result.
///
/// Mock results (local fallbacks, or provider objects flagged `mock`) use
/// their `text`, or `default` when it is empty. Provider objects yield the
/// first truthy text field, else their whole serialization.
pub fn extract_text<F>(result: UpstreamResult, mode: Mode, default: F) -> String
where
    F: FnOnce() -> String,
{
    match result {
        UpstreamResult::Fallback(fallback) if fallback.text.is_empty() => default(),
        UpstreamResult::Fallback(fallback) => fallback.text,
        UpstreamResult::Response(value) => {
            if value.get("mock").is_some_and(truthy) {
                debug!("Upstream flagged its response as mock");
                return value
                    .get("text")
                    .filter(|v| truthy(v))
                    .map(render)
                    .unwrap_or_else(default);
            }

            text_fields(mode)
                .iter()
                .filter_map(|field| value.get(*field))
                .find(|v| truthy(v))
                .map(render)
                .unwrap_or_else(|| value.to_string())
        }
    }
}

/// JavaScript-style truthiness, matching what providers of this API assume.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
