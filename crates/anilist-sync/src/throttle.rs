//! Delay sources and the sleep seam.
//!
//! Three independent delays pace a run: the post-success throttle, the retry
//! backoff, and the pause between partitions. All of them go through a
//! [`Sleeper`] so tests can record them instead of waiting.

use async_trait::async_trait;
use std::time::Duration;

/// Suspends the current task for a delay
#[async_trait]
pub trait Sleeper: Send {
    async fn sleep(&mut self, delay: Duration);
}

/// Real timer sleeps
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&mut self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

/// Fixed pauses that do not depend on failure history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After every successful page
    pub request_delay: Duration,
    /// Between partitions
    pub partition_delay: Duration,
}

impl Pacing {
    pub fn from_config(config: &shared::config::PacingConfig) -> Self {
        Self {
            request_delay: Duration::from_millis(config.req_delay_ms),
            partition_delay: Duration::from_millis(config.season_delay_ms),
        }
    }

    pub fn none() -> Self {
        Self {
            request_delay: Duration::ZERO,
            partition_delay: Duration::ZERO,
        }
    }
}
