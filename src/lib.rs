//! # groq-client
//!
//! An async client for the Groq OpenAI-compatible chat completion API.
//!
//! ## Features
//!
//! - **Rate limit handling**: HTTP 429 responses are waited out using the
//!   provider's `retry-after` hint, clamped to a configurable ceiling, for up
//!   to five retries
//! - **Streaming**: server-sent deltas delivered on a bounded channel from a
//!   dedicated task, with cancellation
//! - **Configuration**: builder-style [`ClientConfig`](config::ClientConfig)
//!   or a TOML file at XDG-compliant locations
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use groq_client::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), ClientError> {
//!     let client = GroqClient::new(config::load()?.to_client_config())?;
//!
//!     let request = ChatCompletionRequest::new(DEFAULT_MODEL, vec![Message::user("Hello!")]);
//!     let response = client.create_chat_completion(&request).await?;
//!     println!("{}", response.first_text().unwrap_or_default());
//!
//!     let cancel = CancellationToken::new();
//!     let mut stream = client
//!         .create_chat_completion_stream(&cancel, &request.with_stream(true))
//!         .await?;
//!     while let Some(chunk) = stream.recv().await {
//!         print!("{}", chunk.choices[0].delta.content.as_deref().unwrap_or(""));
//!     }
//!     stream.finish().await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod messages;
pub mod retry;
pub mod streaming;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::client::{ChatClient, GroqClient};
    pub use crate::config::{self, ClientConfig, RateLimitConfig, DEFAULT_MODEL};
    pub use crate::error::{ClientError, ClientErrorKind};
    pub use crate::messages::{
        ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, Message, Role,
        StopSequences,
    };
    pub use crate::retry::{retry_delay_ms, Sleeper, TokioSleeper};
    pub use crate::streaming::{
        ChatCompletionStream, StreamAccumulator, StreamCanceller, StreamOutcome,
    };

    pub use tokio_util::sync::CancellationToken;
}
