//! Retry policy and scheduler.
//!
//! [`RetryPolicy::decide`] is a pure function of the classified outcome and
//! the attempt number; [`RetryScheduler`] wires it to a fetcher and a sleeper.

use crate::api::{FetchOutcome, Page, PageFetcher};
use crate::error::{Result, SyncError};
use crate::partition::Partition;
use crate::throttle::Sleeper;
use std::time::Duration;
use tracing::{debug, warn};

/// Next step after an attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Done,
    Retry(Duration),
    Fatal,
}

/// Backoff bounds and retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries allowed per page; one more failure is fatal
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further one
    pub backoff_base: Duration,
    /// Upper bound for backoff and server retry-after hints
    pub backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&shared::config::PacingConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &shared::config::PacingConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            backoff_max: Duration::from_millis(config.backoff_max_ms),
        }
    }

    /// `min(max, base * 2^(attempt - 1))`, attempts counted from 1
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.backoff_base
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.backoff_max)
            .min(self.backoff_max)
    }

    pub fn decide(&self, outcome: &FetchOutcome, attempt: u32) -> RetryDecision {
        match outcome {
            FetchOutcome::Page(_) => RetryDecision::Done,
            _ if attempt > self.max_retries => RetryDecision::Fatal,
            FetchOutcome::RateLimited {
                retry_after: Some(hint),
            } => RetryDecision::Retry((*hint).min(self.backoff_max)),
            _ => RetryDecision::Retry(self.backoff_delay(attempt)),
        }
    }
}

/// Runs page requests through the retry policy and the post-success throttle
pub struct RetryScheduler<S> {
    /// Decides between done, retry and fatal
    policy: RetryPolicy,
    /// Throttle slept after every successful request
    request_delay: Duration,
    /// Where every delay is spent
    sleeper: S,
    /// Retries taken across the whole run
    retries: u32,
}

impl<S: Sleeper> RetryScheduler<S> {
    pub fn new(policy: RetryPolicy, request_delay: Duration, sleeper: S) -> Self {
        Self {
            policy,
            request_delay,
            sleeper,
            retries: 0,
        }
    }

    /// Total retries performed so far
    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Sleep for a delay that is not tied to a request
    pub async fn pause(&mut self, delay: Duration) {
        self.sleeper.sleep(delay).await;
    }

    /// Fetch one page, retrying recoverable failures
    pub async fn fetch<F: PageFetcher>(
        &mut self,
        fetcher: &mut F,
        partition: Partition,
        page: u32,
        per_page: u32,
    ) -> Result<Page> {
        let mut attempt = 1;

        loop {
            let outcome = fetcher.fetch_page(partition, page, per_page).await;

            match (self.policy.decide(&outcome, attempt), outcome) {
                (RetryDecision::Done, FetchOutcome::Page(result)) => {
                    debug!(
                        partition = %partition,
                        page = page,
                        records = result.records.len(),
                        has_next_page = result.has_next_page,
                        "Page fetched"
                    );
                    self.sleeper.sleep(self.request_delay).await;
                    return Ok(result);
                }
                (RetryDecision::Retry(delay), outcome) => {
                    warn!(
                        partition = %partition,
                        page = page,
                        attempt = attempt,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %outcome.describe(),
                        "Request failed, retrying"
                    );
                    self.sleeper.sleep(delay).await;
                    self.retries += 1;
                    attempt += 1;
                }
                (_, outcome) => {
                    return Err(SyncError::Fatal {
                        partition,
                        page,
                        attempts: attempt,
                        last_error: outcome.describe(),
                    });
                }
            }
        }
    }
}
