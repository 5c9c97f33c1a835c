//! Shared helpers for the HTTP mock tests.

#![allow(dead_code)]

use async_trait::async_trait;
use groq_client::prelude::*;
use groq_client::retry::Sleeper;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::MockServer;

pub const API_KEY: &str = "gsk_test_key";
pub const CHAT_PATH: &str = "/v1/chat/completions";

/// Records requested waits instead of sleeping.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.waits.lock().unwrap().push(duration);
    }
}

/// Builds a client pointed at the mock server with a recording sleeper.
pub fn client_for(
    server: &MockServer,
    rate_limit: RateLimitConfig,
) -> (GroqClient, Arc<RecordingSleeper>) {
    let config = ClientConfig::new(API_KEY)
        .with_base_url(server.uri())
        .with_timeout(Duration::from_secs(5))
        .with_rate_limit(rate_limit);
    let sleeper = Arc::new(RecordingSleeper::default());
    let client = GroqClient::new(config)
        .unwrap()
        .with_sleeper(Arc::clone(&sleeper) as Arc<dyn Sleeper>);
    (client, sleeper)
}

pub fn request() -> ChatCompletionRequest {
    ChatCompletionRequest::new(
        "llama-3.1-8b-instant",
        vec![Message::user("Explain the importance of low latency LLMs")],
    )
}

pub fn completion_body(text: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1_700_000_000,
        "model": "llama-3.1-8b-instant",
        "system_fingerprint": "fp_abc",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 12,
            "completion_tokens": 5,
            "total_tokens": 17,
            "prompt_time": 0.01,
            "completion_time": 0.02,
            "total_time": 0.03
        }
    })
}

pub fn rate_limit_body(hint: &str) -> serde_json::Value {
    json!({
        "error": {
            "message": format!("Rate limit reached for model `llama-3.1-8b-instant`. {hint}"),
            "type": "tokens",
            "code": "rate_limit_exceeded"
        }
    })
}

pub fn chunk_event(id: &str, content: &str) -> String {
    let chunk = json!({
        "id": id,
        "object": "chat.completion.chunk",
        "created": 1_700_000_000,
        "model": "llama-3.1-8b-instant",
        "choices": [{ "index": 0, "delta": { "content": content }, "finish_reason": null }]
    });
    format!("data: {chunk}\n\n")
}
