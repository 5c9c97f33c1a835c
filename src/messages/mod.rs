//! Wire types for the chat completion API.
//!
//! Request, response, stream chunk, error envelope and model types, all
//! serialized with serde in the OpenAI-compatible JSON layout.

mod types;

pub use types::*;
