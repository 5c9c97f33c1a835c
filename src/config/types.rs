//! Configuration file types.
//!
//! These map directly onto the TOML file and are converted into a runtime
//! [`ClientConfig`] with environment variables resolved.

use crate::config::client::{ClientConfig, RateLimitConfig, DEFAULT_MODEL};
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Standard environment variable holding the API key.
pub(crate) const STANDARD_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Root configuration structure of the TOML file.
///
/// ```toml
/// api_key_env = "GROQ_API_KEY"
/// default_model = "llama-3.1-8b-instant"
///
/// [rate_limit]
/// wait = true
/// max_wait_ms = 5000
///
/// [logging]
/// level = "debug"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConfig {
    /// Direct API key value (discouraged - use api_key_env instead).
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Base URL override, mostly useful against a local mock.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Model used when a request does not name one.
    #[serde(default)]
    pub default_model: Option<String>,

    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Capacity of the streaming delta channel.
    #[serde(default)]
    pub stream_buffer: Option<usize>,

    /// Rate limit handling.
    #[serde(default)]
    pub rate_limit: Option<RateLimitFileConfig>,

    /// File logging; stderr logging is used when absent.
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

impl FileConfig {
    /// Creates an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key environment variable.
    #[must_use]
    pub fn with_api_key_env(mut self, env_var: impl Into<String>) -> Self {
        self.api_key_env = Some(env_var.into());
        self
    }

    /// Sets a direct API key (discouraged).
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the rate limit configuration.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimitFileConfig) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    /// Sets the file logging configuration.
    #[must_use]
    pub fn with_logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Returns the configured default model, or the built-in default.
    #[must_use]
    pub fn model(&self) -> &str {
        self.default_model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    /// Resolves the API key from environment or direct value.
    ///
    /// Resolution order:
    /// 1. `api_key_env` - read from environment variable
    /// 2. `GROQ_API_KEY`
    /// 3. `api_key` - direct value in config (discouraged)
    /// 4. Empty string
    #[must_use]
    pub fn resolve_api_key(&self) -> String {
        let candidates = self
            .api_key_env
            .as_deref()
            .into_iter()
            .chain(std::iter::once(STANDARD_API_KEY_ENV));

        for env_var in candidates {
            if let Ok(key) = std::env::var(env_var) {
                if !key.is_empty() {
                    return key;
                }
            }
        }

        self.api_key.clone().unwrap_or_default()
    }

    /// Converts this file configuration to a runtime ClientConfig.
    #[must_use]
    pub fn to_client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new(self.resolve_api_key());

        if let Some(ref url) = self.base_url {
            config = config.with_base_url(url);
        }

        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        if let Some(capacity) = self.stream_buffer {
            config = config.with_stream_buffer(capacity);
        }

        if let Some(ref rate_limit) = self.rate_limit {
            config = config.with_rate_limit(rate_limit.to_rate_limit_config());
        }

        config
    }
}

/// Rate limit section of the configuration file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitFileConfig {
    /// Whether to wait and retry on HTTP 429.
    #[serde(default)]
    pub wait: Option<bool>,
    /// Maximum single wait in milliseconds.
    #[serde(default)]
    pub max_wait_ms: Option<u64>,
}

impl RateLimitFileConfig {
    /// Converts to the runtime RateLimitConfig, filling gaps with defaults.
    #[must_use]
    pub fn to_rate_limit_config(&self) -> RateLimitConfig {
        let mut config = RateLimitConfig::default();
        if let Some(wait) = self.wait {
            config.wait_on_rate_limit = wait;
        }
        if let Some(ms) = self.max_wait_ms {
            config = config.with_max_wait_ms(ms);
        }
        config
    }
}
