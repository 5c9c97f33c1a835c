//! Runtime client configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Base URL of the Groq OpenAI-compatible API (no trailing slash).
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Configuration for a [`GroqClient`](crate::client::GroqClient).
///
/// `Debug` output never includes the API key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// The API key sent as a bearer credential
    pub api_key: String,
    /// Base URL for the API, without a trailing slash
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Rate limit handling
    pub rate_limit: RateLimitConfig,
    /// Capacity of the channel streaming deltas are delivered on
    pub stream_buffer: usize,
}

impl ClientConfig {
    /// Creates a configuration with the given API key and default settings.
    ///
    /// # Examples
    ///
    /// ```
    /// use groq_client::config::ClientConfig;
    ///
    /// let config = ClientConfig::new("gsk_...");
    /// assert!(config.rate_limit.wait_on_rate_limit);
    /// ```
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Sets the base URL, dropping any trailing slash.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the rate limit configuration.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Sets the streaming channel capacity (at least 1).
    #[must_use]
    pub fn with_stream_buffer(mut self, capacity: usize) -> Self {
        self.stream_buffer = capacity.max(1);
        self
    }

    /// Returns the chat completions endpoint URL.
    #[must_use]
    pub fn chat_completions_endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Returns the models endpoint URL.
    #[must_use]
    pub fn models_endpoint(&self) -> String {
        format!("{}/v1/models", self.base_url)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_empty() {
            "<empty>"
        } else {
            "<redacted>"
        };
        f.debug_struct("ClientConfig")
            .field("api_key", &api_key)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("rate_limit", &self.rate_limit)
            .field("stream_buffer", &self.stream_buffer)
            .finish()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            rate_limit: RateLimitConfig::default(),
            stream_buffer: 64,
        }
    }
}

/// How the client reacts to HTTP 429.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Whether to sleep and retry when rate limited
    pub wait_on_rate_limit: bool,
    /// Upper bound on a single wait
    pub max_wait: Duration,
}

impl RateLimitConfig {
    /// Creates a new rate limit configuration.
    #[must_use]
    pub fn new(wait_on_rate_limit: bool, max_wait: Duration) -> Self {
        Self {
            wait_on_rate_limit,
            max_wait,
        }
    }

    /// Disables waiting; a 429 is returned to the caller immediately.
    #[must_use]
    pub fn without_waiting(mut self) -> Self {
        self.wait_on_rate_limit = false;
        self
    }

    /// Sets the wait ceiling in milliseconds.
    #[must_use]
    pub fn with_max_wait_ms(mut self, max_wait_ms: u64) -> Self {
        self.max_wait = Duration::from_millis(max_wait_ms);
        self
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            wait_on_rate_limit: true,
            max_wait: Duration::from_secs(60),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_config_defaults() {
        let config = ClientConfig::new("test-key");

        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.stream_buffer, 64);
        assert!(config.rate_limit.wait_on_rate_limit);
    }

    #[test]
    fn client_config_endpoints() {
        let config = ClientConfig::new("k");

        assert_eq!(
            config.chat_completions_endpoint(),
            "https://api.groq.com/openai/v1/chat/completions"
        );
        assert_eq!(config.models_endpoint(), "https://api.groq.com/openai/v1/models");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = ClientConfig::new("k").with_base_url("http://127.0.0.1:8080/");

        assert_eq!(
            config.chat_completions_endpoint(),
            "http://127.0.0.1:8080/v1/chat/completions"
        );
    }

    #[test]
    fn client_config_builder_pattern() {
        let config = ClientConfig::new("k")
            .with_api_key("other")
            .with_timeout(Duration::from_secs(5))
            .with_stream_buffer(0)
            .with_rate_limit(RateLimitConfig::default().with_max_wait_ms(5_000));

        assert_eq!(config.api_key, "other");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.stream_buffer, 1);
        assert_eq!(config.rate_limit.max_wait, Duration::from_millis(5_000));
    }

    #[test]
    fn rate_limit_config_without_waiting() {
        let config = RateLimitConfig::default().without_waiting();

        assert!(!config.wait_on_rate_limit);
        assert_eq!(config.max_wait, Duration::from_secs(60));
    }

    #[test]
    fn client_config_serialization_roundtrip() {
        let config = ClientConfig::new("k").with_rate_limit(RateLimitConfig::new(false, Duration::from_millis(250)));

        let json = serde_json::to_string(&config).unwrap();
        let deserialized: ClientConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn debug_redacts_api_key() {
        let rendered = format!("{:?}", ClientConfig::new("gsk_secret_value"));

        assert!(!rendered.contains("gsk_secret_value"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("api.groq.com"));
    }
}
