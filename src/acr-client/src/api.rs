//! HTTP client for the AI Code Reviewer server.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ClientError;

/// Default server URL.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:4000";

/// Timeout for one round trip; above the server's own upstream timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
struct ReviewBody<'a> {
    code: &'a str,
    language: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    description: &'a str,
    language: &'a str,
}

/// Client for the server's `/api` endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("acr/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Server health status (`"ok"` when healthy).
    pub async fn health(&self) -> Result<String, ClientError> {
        let response = self.client.get(self.url("health")).send().await?;
        let value = Self::read(response).await?;
        Ok(display_field(&value, "status"))
    }

    /// Request a review of `code`.
    pub async fn review(&self, code: &str, language: &str) -> Result<String, ClientError> {
        let value = self
            .post("review", &ReviewBody { code, language })
            .await?;
        Ok(display_field(&value, "review"))
    }

    /// Request code generated from `description`.
    pub async fn generate(&self, description: &str, language: &str) -> Result<String, ClientError> {
        let value = self
            .post(
                "generate",
                &GenerateBody {
                    description,
                    language,
                },
            )
            .await?;
        Ok(display_field(&value, "code"))
    }

    async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ClientError> {
        let url = self.url(path);
        debug!(%url, "Sending request");
        let response = self.client.post(&url).json(body).send().await?;
        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> Result<Value, ClientError> {
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(serde_json::from_str(&text)?);
        }

        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|value| value.get("error").and_then(Value::as_str).map(str::to_owned))
            .unwrap_or_else(|| {
                if text.is_empty() {
                    format!("server returned {status}")
                } else {
                    text
                }
            });
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }
}

/// Text of `field`, or the whole value serialized when it is missing or empty.
fn display_field(value: &Value, field: &str) -> String {
    match value.get(field).and_then(Value::as_str) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => value.to_string(),
    }
}
