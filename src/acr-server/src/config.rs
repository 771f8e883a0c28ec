//! Server configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Port used when `PORT` is not set.
pub const DEFAULT_PORT: u16 = 4000;

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0:4000").
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Upstream model endpoint configuration.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Maximum request body size in bytes.
    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_listen_addr() -> String {
    listen_addr_for_port(DEFAULT_PORT)
}

fn listen_addr_for_port(port: u16) -> String {
    format!("0.0.0.0:{port}")
}

fn default_max_body_size() -> usize {
    2 * 1024 * 1024 // 2MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            upstream: UpstreamConfig::default(),
            logging: LoggingConfig::default(),
            max_body_size: default_max_body_size(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from file.
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.apply_lookup(lookup)?;
        Ok(config)
    }

    /// Override settings with the process environment.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_lookup(|name| std::env::var(name).ok())
    }

    /// Override settings with the variables `lookup` knows about; unset
    /// variables leave the current value in place.
    ///
    /// `PORT` selects the port on all interfaces; `ACR_LISTEN_ADDR` wins over it.
    pub fn apply_lookup<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = lookup("PORT").filter(|p| !p.trim().is_empty()) {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT '{port}': {e}"))?;
            self.listen_addr = listen_addr_for_port(port);
        }

        if let Some(addr) = lookup("ACR_LISTEN_ADDR") {
            self.listen_addr = addr;
        }

        if let Some(url) = lookup("GROQ_API_URL") {
            self.upstream.api_url = Some(url);
        }
        if let Some(key) = lookup("GROQ_API_KEY") {
            self.upstream.api_key = Some(key);
        }

        if let Some(secs) = lookup("ACR_UPSTREAM_TIMEOUT_SECS") {
            self.upstream.timeout_secs = secs
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid ACR_UPSTREAM_TIMEOUT_SECS '{secs}': {e}"))?;
        }

        self.validate()
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.upstream.timeout_secs == 0 {
            anyhow::bail!("Upstream timeout must be at least 1 second");
        }
        Ok(())
    }
}

/// Upstream model endpoint configuration.
///
/// Both `api_url` and `api_key` must be set (and non-empty) for any request
/// to leave the server.
#[derive(Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Endpoint receiving `{prompt, mode}` POSTs.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Bearer token sent in the `Authorization` header.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Total timeout for one upstream call, in seconds.
    #[serde(default = "default_upstream_timeout")]
    pub timeout_secs: u64,
}

fn default_upstream_timeout() -> u64 {
    60
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            api_key: None,
            timeout_secs: default_upstream_timeout(),
        }
    }
}

impl std::fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl UpstreamConfig {
    /// Endpoint and key, if both are present.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let url = self.api_url.as_deref().filter(|s| !s.is_empty())?;
        let key = self.api_key.as_deref().filter(|s| !s.is_empty())?;
        Some((url, key))
    }

    /// Whether upstream calls will be attempted at all.
    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }

    /// Get the upstream timeout as Duration.
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (json or pretty).
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
