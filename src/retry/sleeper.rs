//! Sleep abstraction used between rate-limited attempts.

use async_trait::async_trait;
use std::time::Duration;

/// Waits for a duration before the next attempt.
///
/// The client sleeps only through this trait so tests can record the waits
/// instead of spending real time.
#[async_trait]
pub trait Sleeper: Send + Sync + std::fmt::Debug {
    /// Suspends the current task for `duration`.
    async fn sleep(&self, duration: Duration);
}

/// Sleeper backed by `tokio::time::sleep`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
