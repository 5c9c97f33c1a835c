//! Chat completion clients.
//!
//! [`GroqClient`] is the HTTP implementation. The [`ChatClient`] trait lets
//! callers hold any backend behind `Arc<dyn ChatClient>`.

mod groq;
mod request;

pub use groq::GroqClient;
pub use request::{encode_request, RequestMode};

use crate::error::ClientError;
use crate::messages::{ChatCompletionRequest, ChatCompletionResponse, ListModelsResponse, Model};
use crate::streaming::ChatCompletionStream;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Operations offered by a chat completion backend.
#[async_trait]
pub trait ChatClient: Send + Sync + std::fmt::Debug {
    /// Sends a non-streaming completion and returns the decoded response.
    ///
    /// Rate limits are waited out according to the client's configuration;
    /// the call completes only once a final outcome is known.
    async fn create_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ClientError>;

    /// Opens a streaming completion tied to `cancel`.
    async fn create_chat_completion_stream(
        &self,
        cancel: &CancellationToken,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionStream, ClientError>;

    /// Lists available models.
    async fn list_models(&self) -> Result<ListModelsResponse, ClientError>;

    /// Retrieves one model by id.
    async fn retrieve_model(&self, id: &str) -> Result<Model, ClientError>;
}
