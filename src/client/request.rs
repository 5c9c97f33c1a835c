//! Request encoding.
//!
//! The stream flag of a request must match the entry point it is sent
//! through; mismatches are rejected before anything touches the network.

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::messages::ChatCompletionRequest;
use bytes::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};

/// Which entry point a request is being encoded for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMode {
    /// `create_chat_completion`
    Complete,
    /// `create_chat_completion_stream`
    Stream,
}

impl RequestMode {
    /// Returns the stream flag a request must carry for this mode.
    #[must_use]
    pub fn expects_stream(self) -> bool {
        matches!(self, Self::Stream)
    }
}

/// Checks the stream flag and serializes the request body.
///
/// # Errors
///
/// Returns `InvalidMode` if `request.stream` does not match `mode`, and
/// `Encoding` if serialization fails.
pub fn encode_request(
    request: &ChatCompletionRequest,
    mode: RequestMode,
) -> Result<Bytes, ClientError> {
    if request.stream != mode.expects_stream() {
        return Err(ClientError::invalid_mode(request.stream));
    }

    serde_json::to_vec(request)
        .map(Bytes::from)
        .map_err(|e| ClientError::encoding(e.to_string()))
}

/// Builds the chat completions POST carrying an encoded body.
pub(crate) fn build_post(
    http: &reqwest::Client,
    config: &ClientConfig,
    body: Bytes,
    mode: RequestMode,
) -> reqwest::RequestBuilder {
    let request = http
        .post(config.chat_completions_endpoint())
        .header(CONTENT_TYPE, "application/json")
        .bearer_auth(&config.api_key)
        .body(body);

    match mode {
        RequestMode::Complete => request.timeout(config.timeout),
        RequestMode::Stream => request.header(ACCEPT, "text/event-stream"),
    }
}
