//! Streaming chat completions.
//!
//! A streamed response is decoded as server-sent events on a dedicated
//! task. Each `data:` frame becomes a [`ChatCompletionChunk`] delivered on a
//! bounded channel; malformed frames are skipped and `[DONE]` ends the
//! stream. The terminal outcome is reported by
//! [`ChatCompletionStream::finish`], never as a channel item.
//!
//! [`ChatCompletionChunk`]: crate::messages::ChatCompletionChunk

mod accumulator;
mod pipeline;
mod sse;

pub use accumulator::StreamAccumulator;
pub use pipeline::{spawn_pipeline, ChatCompletionStream, StreamCanceller, StreamOutcome};
pub use sse::{SseDecoder, SseFrame, DONE_SENTINEL};
