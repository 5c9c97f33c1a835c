//! HTTP client for the Groq chat completions API.

use crate::client::request::{build_post, encode_request, RequestMode};
use crate::client::ChatClient;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::messages::{
    ChatCompletionRequest, ChatCompletionResponse, ErrorEnvelope, ListModelsResponse, Model,
};
use crate::retry::{RateLimitState, RetryDecision, Sleeper, TokioSleeper};
use crate::streaming::{spawn_pipeline, ChatCompletionStream};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::RETRY_AFTER;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Client for the Groq OpenAI-compatible API.
///
/// Cloning is cheap; clones share the connection pool.
///
/// # Example
///
/// ```rust,ignore
/// use groq_client::prelude::*;
///
/// let client = GroqClient::new(ClientConfig::new(std::env::var("GROQ_API_KEY")?))?;
/// let request = ChatCompletionRequest::new(DEFAULT_MODEL, vec![Message::user("Hello!")]);
/// let response = client.create_chat_completion(&request).await?;
/// println!("{}", response.first_text().unwrap_or_default());
/// ```
#[derive(Debug, Clone)]
pub struct GroqClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    sleeper: Arc<dyn Sleeper>,
}

impl GroqClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the API key is empty and `Transport` if the
    /// HTTP client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        if config.api_key.trim().is_empty() {
            return Err(ClientError::configuration(
                "api_key",
                "no API key configured; set GROQ_API_KEY or api_key_env",
            ));
        }

        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::transport(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            http,
            config: Arc::new(config),
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replaces the sleeper used between rate-limited attempts.
    #[must_use]
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Returns the configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends a non-streaming chat completion, waiting out rate limits.
    ///
    /// # Errors
    ///
    /// - `InvalidMode` if `request.stream` is set (no request is sent)
    /// - `Transport` on connection failure (not retried)
    /// - `RateLimitExhausted` if still rate limited after the retry budget
    /// - `Api` for any other non-success status, including a 429 when
    ///   waiting is disabled
    /// - `Decode` if the body does not match the response schema
    pub async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ClientError> {
        let body = encode_request(request, RequestMode::Complete)?;

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let (status, bytes) = self
            .execute(|| build_post(&self.http, &self.config, body.clone(), RequestMode::Complete))
            .await?;
        decode_success(status, &bytes)
    }

    /// Opens a streaming chat completion.
    ///
    /// The returned stream runs on its own task and stops when `cancel` (or
    /// the stream's own canceller) is triggered.
    ///
    /// # Errors
    ///
    /// - `InvalidMode` if `request.stream` is not set (no request is sent)
    /// - `Transport` on connection failure
    /// - `Api` if the server answers with a non-success status
    /// - `Cancelled` if `cancel` fires before the response arrives
    pub async fn create_chat_completion_stream(
        &self,
        cancel: &CancellationToken,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionStream, ClientError> {
        let body = encode_request(request, RequestMode::Stream)?;

        tracing::debug!(model = %request.model, "Opening chat completion stream");

        let send = build_post(&self.http, &self.config, body, RequestMode::Stream).send();
        let response = tokio::select! {
            () = cancel.cancelled() => {
                tracing::debug!("Stream cancelled before the response arrived");
                return Err(ClientError::cancelled());
            }
            response = send => response.map_err(|e| ClientError::transport(format!("request failed: {e}")))?,
        };

        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await?;
            return Err(error_from_body(status, &bytes));
        }

        Ok(spawn_pipeline(
            response.bytes_stream(),
            cancel,
            self.config.stream_buffer,
        ))
    }

    /// Lists the models available to this API key.
    ///
    /// # Errors
    ///
    /// Returns the same errors as a non-streaming completion, minus
    /// `InvalidMode`.
    pub async fn list_models(&self) -> Result<ListModelsResponse, ClientError> {
        self.get_json(self.config.models_endpoint()).await
    }

    /// Retrieves a single model by id.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for an empty id, `Api` with status 404 for an
    /// unknown model, and otherwise the same errors as
    /// [`list_models`](Self::list_models).
    pub async fn retrieve_model(&self, id: &str) -> Result<Model, ClientError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ClientError::configuration("model_id", "must not be empty"));
        }
        self.get_json(format!("{}/{}", self.config.models_endpoint(), id))
            .await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, ClientError> {
        tracing::debug!(url = %url, "Sending GET request");

        let (status, bytes) = self
            .execute(|| {
                self.http
                    .get(&url)
                    .bearer_auth(&self.config.api_key)
                    .timeout(self.config.timeout)
            })
            .await?;
        decode_success(status, &bytes)
    }

    /// Issues the request built by `build` until it is no longer rate
    /// limited, and returns the final status and body.
    async fn execute<F>(&self, build: F) -> Result<(StatusCode, Bytes), ClientError>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut state = RateLimitState::new(self.config.rate_limit);

        loop {
            state.begin_attempt();

            let response = match build().send().await {
                Ok(response) => response,
                Err(e) => {
                    state.transport_failed();
                    tracing::debug!(attempt = state.attempts(), error = %e, "Request failed");
                    return Err(ClientError::transport(format!("request failed: {e}")));
                }
            };

            let status = response.status();
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);

            let bytes = match response.bytes().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    state.transport_failed();
                    return Err(ClientError::transport(format!(
                        "failed to read response body: {e}"
                    )));
                }
            };

            tracing::debug!(
                attempt = state.attempts(),
                status = status.as_u16(),
                "Received response"
            );

            match state.on_response(status.as_u16(), retry_after.as_deref(), &bytes)? {
                RetryDecision::Complete => return Ok((status, bytes)),
                RetryDecision::Wait(wait) => self.sleeper.sleep(wait).await,
                RetryDecision::GiveUp(envelope) => {
                    return Err(error_from_envelope(status, envelope));
                }
            }
        }
    }
}

#[async_trait]
impl ChatClient for GroqClient {
    async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ClientError> {
        GroqClient::create_chat_completion(self, request).await
    }

    async fn create_chat_completion_stream(
        &self,
        cancel: &CancellationToken,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionStream, ClientError> {
        GroqClient::create_chat_completion_stream(self, cancel, request).await
    }

    async fn list_models(&self) -> Result<ListModelsResponse, ClientError> {
        GroqClient::list_models(self).await
    }

    async fn retrieve_model(&self, id: &str) -> Result<Model, ClientError> {
        GroqClient::retrieve_model(self, id).await
    }
}

/// Decodes a 2xx body, or converts any other status into an API error.
fn decode_success<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ClientError> {
    if !status.is_success() {
        return Err(error_from_body(status, body));
    }

    serde_json::from_slice(body).map_err(|e| {
        ClientError::decode(format!(
            "{}; body: {}",
            e,
            String::from_utf8_lossy(body)
        ))
    })
}

/// Builds an API error from a non-success body, decoding the envelope when
/// there is one.
fn error_from_body(status: StatusCode, body: &[u8]) -> ClientError {
    match serde_json::from_slice::<ErrorEnvelope>(body) {
        Ok(envelope) if envelope != ErrorEnvelope::default() => {
            error_from_envelope(status, envelope)
        }
        _ => {
            let text = String::from_utf8_lossy(body);
            let message = if text.trim().is_empty() {
                reason_phrase(status)
            } else {
                text.into_owned()
            };
            ClientError::api(status.as_u16(), message, None, None)
        }
    }
}

fn error_from_envelope(status: StatusCode, envelope: ErrorEnvelope) -> ClientError {
    let detail = envelope.error;
    let message = if detail.message.is_empty() {
        reason_phrase(status)
    } else {
        detail.message
    };
    ClientError::api(status.as_u16(), message, detail.error_type, detail.code)
}

fn reason_phrase(status: StatusCode) -> String {
    status.canonical_reason().unwrap_or("Unknown error").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientErrorKind;

    #[test]
    fn new_rejects_empty_api_key() {
        let error = GroqClient::new(ClientConfig::new("  ")).unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn client_is_debug_and_clone() {
        let client = GroqClient::new(ClientConfig::new("k")).unwrap();
        let cloned = client.clone();

        assert!(format!("{cloned:?}").contains("GroqClient"));
        assert_eq!(cloned.config().api_key, "k");
    }

    #[test]
    fn client_debug_does_not_leak_api_key() {
        let client = GroqClient::new(ClientConfig::new("gsk_live_secret")).unwrap();

        assert!(!format!("{client:?}").contains("gsk_live_secret"));
    }

    #[test]
    fn error_from_body_uses_envelope() {
        let body = br#"{"error":{"message":"model not found","type":"invalid_request_error","code":"model_not_found"}}"#;

        let error = error_from_body(StatusCode::NOT_FOUND, body);

        match error.kind {
            ClientErrorKind::Api {
                status_code,
                message,
                error_type,
                code,
            } => {
                assert_eq!(status_code, 404);
                assert_eq!(message, "model not found");
                assert_eq!(error_type.as_deref(), Some("invalid_request_error"));
                assert_eq!(code.as_deref(), Some("model_not_found"));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn error_from_body_falls_back_to_raw_text() {
        let error = error_from_body(StatusCode::BAD_GATEWAY, b"upstream exploded");

        assert_eq!(error.status_code(), Some(502));
        assert!(error.to_string().contains("upstream exploded"));
    }

    #[test]
    fn error_from_empty_body_uses_reason_phrase() {
        let error = error_from_body(StatusCode::SERVICE_UNAVAILABLE, b"");

        assert!(error.to_string().contains("Service Unavailable"));
    }

    #[test]
    fn envelope_without_message_uses_reason_phrase() {
        let body = br#"{"error":{"type":"tokens","code":"rate_limit_exceeded"}}"#;

        let error = error_from_body(StatusCode::TOO_MANY_REQUESTS, body);

        match error.kind {
            ClientErrorKind::Api { message, code, .. } => {
                assert_eq!(message, "Too Many Requests");
                assert_eq!(code.as_deref(), Some("rate_limit_exceeded"));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn empty_json_object_falls_back_to_raw_text() {
        let error = error_from_body(StatusCode::BAD_REQUEST, b"{}");

        assert!(error.to_string().contains("{}"));
    }

    #[test]
    fn decode_success_reports_schema_mismatch() {
        let error = decode_success::<ChatCompletionResponse>(StatusCode::OK, b"{\"id\":1}")
            .unwrap_err();

        assert!(error.is_decode());
    }

    #[test]
    fn decode_success_rejects_error_status_before_decoding() {
        let error =
            decode_success::<ChatCompletionResponse>(StatusCode::UNAUTHORIZED, b"{}").unwrap_err();

        assert_eq!(error.status_code(), Some(401));
    }
}
