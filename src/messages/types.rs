//! Core wire type definitions.

use serde::{Deserialize, Serialize};

// =============================================================================
// Conversation Messages
// =============================================================================

/// The role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions
    System,
    /// End-user input
    User,
    /// Model output
    Assistant,
    /// Tool result
    Tool,
}

/// A message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// The role of the message author
    pub role: Role,
    /// The text content (absent on assistant tool-call messages)
    #[serde(default)]
    pub content: Option<String>,
    /// Optional participant name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Tool calls requested by the model, kept as raw JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<serde_json::Value>>,
    /// The tool call this message answers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(content.into()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        }
    }

    /// Creates a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Creates an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Creates a tool result message.
    #[must_use]
    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::with_role(Role::Tool, content)
        }
    }

    /// Returns the text content, or an empty string if there is none.
    #[must_use]
    pub fn text(&self) -> &str {
        self.content.as_deref().unwrap_or_default()
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Stop sequences: either a single string or a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StopSequences {
    /// A single stop string
    Single(String),
    /// Several stop strings
    Multiple(Vec<String>),
}

/// Request body for `POST /v1/chat/completions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// The conversation so far
    pub messages: Vec<Message>,
    /// ID of the model to use
    pub model: String,
    /// Maximum number of tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Nucleus sampling probability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Number of choices to generate
    #[serde(rename = "n", default, skip_serializing_if = "Option::is_none")]
    pub num_choices: Option<u32>,
    /// Penalty for tokens already present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    /// Penalty proportional to token frequency, between -2.0 and 2.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    /// End-user identifier
    #[serde(rename = "user", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Deliver partial deltas as server-sent events
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stream: bool,
    /// Controls which tool the model calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<serde_json::Value>,
    /// Tools the model may call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<serde_json::Value>,
    /// Response format constraint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_format: Option<serde_json::Value>,
    /// Seed for deterministic sampling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    /// Sequences at which generation stops
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop: Option<StopSequences>,
}

impl ChatCompletionRequest {
    /// Creates a non-streaming request for the given model and messages.
    #[must_use]
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            messages,
            model: model.into(),
            ..Default::default()
        }
    }

    /// Enables or disables streaming.
    #[must_use]
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    /// Sets the maximum tokens to generate.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the nucleus sampling probability.
    #[must_use]
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Sets the presence penalty.
    #[must_use]
    pub fn with_presence_penalty(mut self, penalty: f64) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    /// Sets the frequency penalty.
    #[must_use]
    pub fn with_frequency_penalty(mut self, penalty: f64) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    /// Sets the sampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the stop sequences.
    #[must_use]
    pub fn with_stop(mut self, stop: StopSequences) -> Self {
        self.stop = Some(stop);
        self
    }
}

// =============================================================================
// Responses
// =============================================================================

/// Token usage accounting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt
    #[serde(default)]
    pub prompt_tokens: u32,
    /// Tokens in the completion
    #[serde(default)]
    pub completion_tokens: u32,
    /// Total tokens
    #[serde(default)]
    pub total_tokens: u32,
    /// Seconds spent on the prompt
    #[serde(default)]
    pub prompt_time: f64,
    /// Seconds spent on the completion
    #[serde(default)]
    pub completion_time: f64,
    /// Total seconds
    #[serde(default)]
    pub total_time: f64,
}

/// A single completion choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Index of the choice
    pub index: u32,
    /// The generated message
    pub message: Message,
    /// Why the model stopped generating
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Response body of a non-streaming chat completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// Unique identifier for the completion
    pub id: String,
    /// Object type, e.g. "chat.completion"
    #[serde(default)]
    pub object: String,
    /// Unix timestamp of creation
    #[serde(default)]
    pub created: i64,
    /// Model actually used
    #[serde(default)]
    pub model: String,
    /// Backend configuration fingerprint
    #[serde(default)]
    pub system_fingerprint: Option<String>,
    /// Completion choices
    pub choices: Vec<Choice>,
    /// Token usage
    #[serde(default)]
    pub usage: Usage,
}

impl ChatCompletionResponse {
    /// Returns the text of the first choice, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.choices.first().map(|choice| choice.message.text())
    }
}

// =============================================================================
// Streaming
// =============================================================================

/// Partial message carried by a stream chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// Role, usually present only on the first chunk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Text fragment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool call fragments, kept as raw JSON
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<serde_json::Value>>,
}

/// A choice inside a stream chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    /// Index of the choice this delta belongs to
    pub index: u32,
    /// The partial message
    #[serde(default)]
    pub delta: Delta,
    /// Set on the last chunk of a choice
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Provider-specific metadata attached to stream chunks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct XGroq {
    /// Request identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Usage, present on the final chunk
    #[serde(default)]
    pub usage: Option<Usage>,
}

/// One increment of a streamed chat completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    /// Identifier shared by all chunks of a completion
    pub id: String,
    /// Object type, e.g. "chat.completion.chunk"
    #[serde(default)]
    pub object: String,
    /// Unix timestamp of creation
    #[serde(default)]
    pub created: i64,
    /// Model actually used
    #[serde(default)]
    pub model: String,
    /// Backend configuration fingerprint
    #[serde(default)]
    pub system_fingerprint: Option<String>,
    /// Partial choices
    pub choices: Vec<ChunkChoice>,
    /// Provider metadata
    #[serde(default)]
    pub x_groq: Option<XGroq>,
}

// =============================================================================
// Errors and Models
// =============================================================================

/// Error detail returned with a non-success status.
///
/// Every field may be absent; a body that is valid JSON always decodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Human-readable message
    #[serde(default)]
    pub message: String,
    /// Error type tag
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
    /// Provider error code
    #[serde(default)]
    pub code: Option<String>,
}

/// Error body returned with a non-success status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error detail
    #[serde(default)]
    pub error: ErrorDetail,
}

/// A model available through the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Model identifier
    pub id: String,
    /// Object type, "model"
    #[serde(default)]
    pub object: String,
    /// Unix timestamp of creation
    #[serde(default)]
    pub created: i64,
    /// Owning organization
    #[serde(default)]
    pub owned_by: String,
    /// Whether the model is currently served
    #[serde(default)]
    pub active: Option<bool>,
    /// Context window in tokens
    #[serde(default)]
    pub context_window: Option<u64>,
}

/// Response body of `GET /v1/models`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListModelsResponse {
    /// Object type, "list"
    #[serde(default)]
    pub object: String,
    /// The models
    pub data: Vec<Model>,
}
