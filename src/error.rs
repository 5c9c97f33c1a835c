//! Error types for the Groq client.
//!
//! Every error implements Display, Debug, Clone, PartialEq, Eq and
//! std::error::Error. No external error crates are used in the library.

use std::fmt;

/// Errors that can occur while talking to the completion API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientError {
    /// The specific error that occurred
    pub kind: ClientErrorKind,
}

/// Specific client error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientErrorKind {
    /// The request could not be serialized
    Encoding {
        /// Description of the serialization failure
        message: String,
    },
    /// Network or connection failure
    Transport {
        /// Description of the transport failure
        message: String,
    },
    /// The request's stream flag does not match the entry point used
    InvalidMode {
        /// Whether the request asked for streaming
        stream_requested: bool,
    },
    /// Still rate limited after the retry budget was spent
    RateLimitExhausted {
        /// Total attempts issued, including the first
        attempts: u32,
        /// Status code of the last response
        status_code: u16,
        /// Body of the last response
        body: String,
    },
    /// The response body did not match the expected schema
    Decode {
        /// Description of the decode failure
        message: String,
    },
    /// The API returned a non-success status
    Api {
        /// HTTP status code
        status_code: u16,
        /// Error message from the API
        message: String,
        /// Error type from the API (if available)
        error_type: Option<String>,
        /// Provider error code (if available)
        code: Option<String>,
    },
    /// A stream ended before its terminating frame
    Stream {
        /// Description of the stream failure
        message: String,
    },
    /// The caller cancelled a stream before its response arrived
    Cancelled,
    /// Configuration error
    Configuration {
        /// The configuration field that was invalid
        field: String,
        /// Why it was invalid
        reason: String,
    },
}

impl ClientError {
    /// Creates a new ClientError with the given kind.
    #[must_use]
    pub fn new(kind: ClientErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an encoding error.
    #[must_use]
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Encoding {
            message: message.into(),
        })
    }

    /// Creates a transport error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Transport {
            message: message.into(),
        })
    }

    /// Creates an invalid mode error.
    #[must_use]
    pub fn invalid_mode(stream_requested: bool) -> Self {
        Self::new(ClientErrorKind::InvalidMode { stream_requested })
    }

    /// Creates a rate limit exhausted error.
    #[must_use]
    pub fn rate_limit_exhausted(attempts: u32, status_code: u16, body: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::RateLimitExhausted {
            attempts,
            status_code,
            body: body.into(),
        })
    }

    /// Creates a decode error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Decode {
            message: message.into(),
        })
    }

    /// Creates an API error.
    #[must_use]
    pub fn api(
        status_code: u16,
        message: impl Into<String>,
        error_type: Option<String>,
        code: Option<String>,
    ) -> Self {
        Self::new(ClientErrorKind::Api {
            status_code,
            message: message.into(),
            error_type,
            code,
        })
    }

    /// Creates a stream error.
    #[must_use]
    pub fn stream(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Stream {
            message: message.into(),
        })
    }

    /// Creates a cancellation error.
    #[must_use]
    pub fn cancelled() -> Self {
        Self::new(ClientErrorKind::Cancelled)
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn configuration(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Configuration {
            field: field.into(),
            reason: reason.into(),
        })
    }

    /// Returns true if the request was rejected for using the wrong entry point.
    #[must_use]
    pub fn is_invalid_mode(&self) -> bool {
        matches!(self.kind, ClientErrorKind::InvalidMode { .. })
    }

    /// Returns true if the retry budget ran out while rate limited.
    #[must_use]
    pub fn is_rate_limit_exhausted(&self) -> bool {
        matches!(self.kind, ClientErrorKind::RateLimitExhausted { .. })
    }

    /// Returns true if the API answered 429 and the call was not retried further.
    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self.kind,
            ClientErrorKind::Api {
                status_code: 429,
                ..
            } | ClientErrorKind::RateLimitExhausted { .. }
        )
    }

    /// Returns true if this is a decode error.
    #[must_use]
    pub fn is_decode(&self) -> bool {
        matches!(self.kind, ClientErrorKind::Decode { .. })
    }

    /// Returns true if this is a transport error.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self.kind, ClientErrorKind::Transport { .. })
    }

    /// Returns true if the caller cancelled before a stream opened.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self.kind, ClientErrorKind::Cancelled)
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, ClientErrorKind::Configuration { .. })
    }

    /// Returns the HTTP status code carried by this error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match &self.kind {
            ClientErrorKind::Api { status_code, .. }
            | ClientErrorKind::RateLimitExhausted { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ClientErrorKind::Encoding { message } => {
                write!(f, "failed to encode request: {}", message)
            }
            ClientErrorKind::Transport { message } => {
                write!(
                    f,
                    "transport error communicating with the API: {}; check network connectivity",
                    message
                )
            }
            ClientErrorKind::InvalidMode { stream_requested } => {
                if *stream_requested {
                    write!(
                        f,
                        "request has stream enabled; use create_chat_completion_stream for streaming completions"
                    )
                } else {
                    write!(
                        f,
                        "request has stream disabled; use create_chat_completion for non-streaming completions"
                    )
                }
            }
            ClientErrorKind::RateLimitExhausted {
                attempts,
                status_code,
                body,
            } => {
                write!(
                    f,
                    "still rate limited after {} attempts (HTTP {}): {}",
                    attempts, status_code, body
                )
            }
            ClientErrorKind::Decode { message } => {
                write!(f, "failed to decode API response: {}", message)
            }
            ClientErrorKind::Api {
                status_code,
                message,
                error_type,
                code,
            } => {
                write!(f, "API error (HTTP {}): {}", status_code, message)?;
                if let Some(error_type) = error_type {
                    write!(f, " (type: {})", error_type)?;
                }
                if let Some(code) = code {
                    write!(f, " (code: {})", code)?;
                }
                Ok(())
            }
            ClientErrorKind::Stream { message } => {
                write!(f, "streaming error: {}", message)
            }
            ClientErrorKind::Cancelled => {
                write!(f, "stream cancelled before the response arrived")
            }
            ClientErrorKind::Configuration { field, reason } => {
                write!(f, "invalid configuration for '{}': {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        Self::transport(error.to_string())
    }
}
