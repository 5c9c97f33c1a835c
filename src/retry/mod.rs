//! Rate-limit handling.
//!
//! This module contains the retry-delay parser for provider error messages,
//! the per-call rate-limit state machine, and the sleep abstraction the
//! controller waits through.

mod delay;
mod sleeper;
mod state;

pub use delay::{retry_delay_ms, RetryDelayError, RetryDelayErrorKind};
pub use sleeper::{Sleeper, TokioSleeper};
pub use state::{CallState, RateLimitState, RetryDecision, MAX_RATE_LIMIT_RETRIES};
