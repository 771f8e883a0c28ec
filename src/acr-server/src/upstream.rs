//! Upstream model client.
//!
//! Sends one `{prompt, mode}` POST per request and never fails: missing
//! configuration, non-success statuses and transport errors are all turned
//! into a [`Fallback`] carrying displayable placeholder text.

use std::fmt;

use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::UpstreamConfig;

/// Characters of the prompt echoed back when the upstream is not configured.
pub const CONFIG_PREVIEW_CHARS: usize = 100;

/// Characters of the prompt echoed back when the upstream is unreachable.
pub const NETWORK_PREVIEW_CHARS: usize = 400;

/// What the upstream is asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    CodeReview,
    CodeGeneration,
}

impl Mode {
    /// Wire name sent in the request body.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CodeReview => "code-review",
            Self::CodeGeneration => "code-generation",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ways an upstream call can fail.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// URL or key not set.
    #[error("GROQ not configured")]
    ConfigMissing,

    /// The upstream answered with a non-success status.
    #[error("GROQ request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// Transport failure, timeout, or an undecodable body.
    #[error("{0}")]
    Network(String),
}

/// Why a fallback was synthesized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    ConfigMissing,
    Status(u16),
    Network,
}

/// Locally synthesized placeholder standing in for an upstream answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub reason: FallbackReason,
    pub text: String,
}

impl Fallback {
    /// Build the placeholder text for a failed call.
    pub fn from_error(error: &UpstreamError, prompt: &str, mode: Mode) -> Self {
        match error {
            UpstreamError::ConfigMissing => {
                let preview = preview(prompt, CONFIG_PREVIEW_CHARS);
                let ellipsis = if preview.len() < prompt.len() { "..." } else { "" };
                Self {
                    reason: FallbackReason::ConfigMissing,
                    text: format!("GROQ not configured. Would have sent: {preview}{ellipsis}"),
                }
            }
            UpstreamError::Status { status, .. } => Self {
                reason: FallbackReason::Status(*status),
                text: error.to_string(),
            },
            UpstreamError::Network(message) => Self {
                reason: FallbackReason::Network,
                text: network_fallback_text(message, prompt, mode),
            },
        }
    }
}

fn network_fallback_text(message: &str, prompt: &str, mode: Mode) -> String {
    let snippet = preview(prompt, NETWORK_PREVIEW_CHARS);
    let block = match mode {
        Mode::CodeReview => format!(
            "Quick review based on the provided code snippet:\n\
             - Snippet preview: {snippet}\n\
             - Suggestions: ensure input validation, add unit tests, consider edge cases."
        ),
        Mode::CodeGeneration => format!(
            "Generated code placeholder based on prompt preview:\n\
             // {}\n\
             console.log('GROQ unreachable; replace with real API key to get full output');",
            snippet.replace('\n', " ")
        ),
    };
    format!("Unable to reach GROQ API ({message}).\n\nFallback brief response:\n{block}")
}

/// First `max_chars` characters of `s`.
pub fn preview(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Outcome of one upstream call.
#[derive(Debug, Clone, PartialEq)]
pub enum UpstreamResult {
    /// Placeholder built locally; the caller shows its text.
    Fallback(Fallback),
    /// Opaque JSON returned by the provider.
    Response(Value),
}

impl UpstreamResult {
    /// Whether this result was synthesized rather than produced upstream.
    pub fn is_mock(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

#[derive(Debug, Serialize)]
struct UpstreamRequest<'a> {
    prompt: &'a str,
    mode: Mode,
}

/// Client for the upstream model endpoint.
#[derive(Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    config: UpstreamConfig,
}

impl fmt::Debug for UpstreamClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamClient")
            .field("config", &self.config)
            .finish()
    }
}

impl UpstreamClient {
    /// Create a client; the timeout covers the whole call.
    pub fn new(config: UpstreamConfig) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("acr-server/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout_duration())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, config }
    }

    /// Get the configuration this client was built with.
    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Call the upstream, degrading every failure to a [`Fallback`].
    pub async fn call(&self, prompt: &str, mode: Mode) -> UpstreamResult {
        match self.send(prompt, mode).await {
            Ok(value) => UpstreamResult::Response(value),
            Err(err) => UpstreamResult::Fallback(Fallback::from_error(&err, prompt, mode)),
        }
    }

    async fn send(&self, prompt: &str, mode: Mode) -> Result<Value, UpstreamError> {
        let Some((url, key)) = self.config.credentials() else {
            debug!(%mode, "Upstream not configured, skipping request");
            return Err(UpstreamError::ConfigMissing);
        };

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(key)
            .json(&UpstreamRequest { prompt, mode })
            .send()
            .await
            .map_err(|e| {
                error!(%mode, error = %e, "GROQ request error");
                UpstreamError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%mode, status = status.as_u16(), "GROQ request failed");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<Value>().await.map_err(|e| {
            error!(%mode, error = %e, "GROQ response could not be decoded");
            UpstreamError::Network(e.to_string())
        })
    }
}
