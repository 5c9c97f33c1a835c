//! Per-call rate-limit state machine.
//!
//! One [`RateLimitState`] lives for one logical call, retries included. The
//! client feeds it every response; it answers whether to hand the response
//! on, wait and re-issue, or stop with the 429 as the outcome.
//!
//! ```text
//! Sending -> Received -> Success
//!                     -> RateLimited -> Waiting -> Sending
//!                                    -> Failed
//! ```

use crate::config::RateLimitConfig;
use crate::error::ClientError;
use crate::messages::ErrorEnvelope;
use crate::retry::delay::retry_delay_ms;
use std::time::Duration;

/// Retries allowed beyond the first attempt while rate limited.
pub const MAX_RATE_LIMIT_RETRIES: u32 = 5;

/// HTTP status signaling rate limiting.
const TOO_MANY_REQUESTS: u16 = 429;

/// Where a call currently is in its request/response cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    /// A request is being issued
    Sending,
    /// A response arrived and is being classified
    Received,
    /// A non-429 response ended the cycle
    Success,
    /// The last response was a 429
    RateLimited,
    /// Sleeping before the next attempt
    Waiting,
    /// The call ended without a usable response
    Failed,
}

impl CallState {
    /// Returns true for `Success` and `Failed`.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }
}

/// What the client should do with the response it just received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Not rate limited; decode the response
    Complete,
    /// Sleep for the duration, then re-issue the request
    Wait(Duration),
    /// Rate limited with waiting disabled; the envelope is the outcome
    GiveUp(ErrorEnvelope),
}

/// Retry bookkeeping for one logical call.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    config: RateLimitConfig,
    state: CallState,
    attempts: u32,
    last_wait: Option<Duration>,
}

impl RateLimitState {
    /// Creates the state for a new call.
    #[must_use]
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            state: CallState::Sending,
            attempts: 0,
            last_wait: None,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> CallState {
        self.state
    }

    /// Returns how many requests have been issued so far.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns the retries spent so far (attempts beyond the first).
    #[must_use]
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }

    /// Returns the most recent wait the state machine asked for.
    #[must_use]
    pub fn last_wait(&self) -> Option<Duration> {
        self.last_wait
    }

    /// Records that a request is about to be issued.
    pub fn begin_attempt(&mut self) {
        debug_assert!(matches!(self.state, CallState::Sending | CallState::Waiting));
        self.state = CallState::Sending;
        self.attempts += 1;
    }

    /// Records that the transport failed before a response arrived.
    pub fn transport_failed(&mut self) {
        self.state = CallState::Failed;
    }

    /// Classifies a response and decides the next step.
    ///
    /// `retry_after` is the raw `retry-after` header value, if present.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitExhausted` when a 429 arrives after the retry budget
    /// is spent, and `Decode` when a 429 body is not valid JSON. Both leave
    /// the state `Failed`. Missing envelope fields are not an error.
    pub fn on_response(
        &mut self,
        status_code: u16,
        retry_after: Option<&str>,
        body: &[u8],
    ) -> Result<RetryDecision, ClientError> {
        self.state = CallState::Received;

        if status_code != TOO_MANY_REQUESTS {
            self.state = CallState::Success;
            return Ok(RetryDecision::Complete);
        }

        self.state = CallState::RateLimited;

        if self.retries() >= MAX_RATE_LIMIT_RETRIES {
            self.state = CallState::Failed;
            return Err(ClientError::rate_limit_exhausted(
                self.attempts,
                status_code,
                String::from_utf8_lossy(body),
            ));
        }

        let envelope: ErrorEnvelope = match serde_json::from_slice(body) {
            Ok(envelope) => envelope,
            Err(e) => {
                self.state = CallState::Failed;
                return Err(ClientError::decode(format!(
                    "invalid rate limit body (HTTP {}): {}; body: {}",
                    status_code,
                    e,
                    String::from_utf8_lossy(body)
                )));
            }
        };

        if !self.config.wait_on_rate_limit {
            tracing::warn!(
                attempt = self.attempts,
                message = %envelope.error.message,
                "Rate limited and waiting is disabled; skipping retry"
            );
            self.state = CallState::Failed;
            return Ok(RetryDecision::GiveUp(envelope));
        }

        let suggested = self.suggested_wait(retry_after, &envelope);
        let wait = suggested.min(self.config.max_wait);

        tracing::info!(
            attempt = self.attempts,
            suggested_ms = suggested.as_millis() as u64,
            wait_ms = wait.as_millis() as u64,
            "Rate limited; waiting before retry"
        );

        self.state = CallState::Waiting;
        self.last_wait = Some(wait);
        Ok(RetryDecision::Wait(wait))
    }

    /// Wait suggested by the provider: the `retry-after` header in whole
    /// seconds, else the hint in the error message, else the ceiling.
    fn suggested_wait(&self, retry_after: Option<&str>, envelope: &ErrorEnvelope) -> Duration {
        if let Some(secs) = retry_after.and_then(|v| v.trim().parse::<u64>().ok()) {
            return Duration::from_millis(secs.saturating_mul(1_000));
        }

        match retry_delay_ms(&envelope.error.message) {
            Ok(ms) => Duration::from_millis(ms),
            Err(e) => {
                tracing::debug!(error = %e, "No usable retry hint; using the maximum wait");
                self.config.max_wait
            }
        }
    }
}
