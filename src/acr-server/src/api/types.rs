//! API request and response types.

use serde::{Deserialize, Serialize};

// ============================================================================
// Health
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

// ============================================================================
// Review
// ============================================================================

/// Code review request.
#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Reserved; accepted and ignored.
    #[serde(default)]
    pub options: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ReviewRequest {
    /// Language used when the request names none.
    pub const DEFAULT_LANGUAGE: &'static str = "unknown";

    pub fn code(&self) -> &str {
        self.code.as_deref().unwrap_or_default()
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(Self::DEFAULT_LANGUAGE)
    }
}

/// Code review response.
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub review: String,
}

// ============================================================================
// Generation
// ============================================================================

/// Code generation request.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    /// Reserved; accepted and ignored.
    #[serde(default)]
    pub options: Option<serde_json::Map<String, serde_json::Value>>,
}

impl GenerateRequest {
    /// Language used when the request names none.
    pub const DEFAULT_LANGUAGE: &'static str = "javascript";

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(Self::DEFAULT_LANGUAGE)
    }
}

/// Code generation response.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub code: String,
}
