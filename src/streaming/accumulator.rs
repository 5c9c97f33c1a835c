//! Folds streamed deltas back into complete messages.

use crate::messages::{ChatCompletionChunk, ChatCompletionResponse, Choice, Message, Role, Usage};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
struct PartialChoice {
    role: Option<Role>,
    content: String,
    finish_reason: Option<String>,
}

/// Accumulates stream chunks per choice index.
///
/// ```
/// use groq_client::streaming::StreamAccumulator;
///
/// let mut acc = StreamAccumulator::new();
/// assert_eq!(acc.text(), "");
/// assert_eq!(acc.chunks(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct StreamAccumulator {
    id: Option<String>,
    model: Option<String>,
    created: i64,
    system_fingerprint: Option<String>,
    choices: BTreeMap<u32, PartialChoice>,
    usage: Option<Usage>,
    chunks: usize,
}

impl StreamAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one chunk in.
    pub fn push(&mut self, chunk: &ChatCompletionChunk) {
        self.chunks += 1;

        if self.id.is_none() && !chunk.id.is_empty() {
            self.id = Some(chunk.id.clone());
        }
        if self.model.is_none() && !chunk.model.is_empty() {
            self.model = Some(chunk.model.clone());
        }
        if self.created == 0 {
            self.created = chunk.created;
        }
        if chunk.system_fingerprint.is_some() {
            self.system_fingerprint.clone_from(&chunk.system_fingerprint);
        }

        for choice in &chunk.choices {
            let partial = self.choices.entry(choice.index).or_default();
            if let Some(role) = choice.delta.role {
                partial.role = Some(role);
            }
            if let Some(ref content) = choice.delta.content {
                partial.content.push_str(content);
            }
            if choice.finish_reason.is_some() {
                partial.finish_reason.clone_from(&choice.finish_reason);
            }
        }

        if let Some(usage) = chunk.x_groq.as_ref().and_then(|x| x.usage.clone()) {
            self.usage = Some(usage);
        }
    }

    /// Number of chunks folded in so far.
    #[must_use]
    pub fn chunks(&self) -> usize {
        self.chunks
    }

    /// Text accumulated for the given choice.
    #[must_use]
    pub fn content(&self, index: u32) -> Option<&str> {
        self.choices.get(&index).map(|c| c.content.as_str())
    }

    /// Text of the first choice, or an empty string.
    #[must_use]
    pub fn text(&self) -> &str {
        self.content(0).unwrap_or("")
    }

    /// Finish reason reported for the given choice, if any.
    #[must_use]
    pub fn finish_reason(&self, index: u32) -> Option<&str> {
        self.choices
            .get(&index)
            .and_then(|c| c.finish_reason.as_deref())
    }

    /// Usage reported on the final chunk, if any.
    #[must_use]
    pub fn usage(&self) -> Option<&Usage> {
        self.usage.as_ref()
    }

    /// Builds the response a non-streaming call would have returned.
    #[must_use]
    pub fn into_response(self) -> ChatCompletionResponse {
        let choices = self
            .choices
            .into_iter()
            .map(|(index, partial)| Choice {
                index,
                message: Message {
                    role: partial.role.unwrap_or(Role::Assistant),
                    ..Message::assistant(partial.content)
                },
                finish_reason: partial.finish_reason,
            })
            .collect();

        ChatCompletionResponse {
            id: self.id.unwrap_or_default(),
            object: "chat.completion".to_string(),
            created: self.created,
            model: self.model.unwrap_or_default(),
            system_fingerprint: self.system_fingerprint,
            choices,
            usage: self.usage.unwrap_or_default(),
        }
    }
}
