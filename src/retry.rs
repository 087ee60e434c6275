//! Bounded exponential-backoff retry for marketplace lookups.
//!
//! A failed attempt is retried only when the error is transient and the
//! elapsed-time budget, counted from the first attempt, is not used up.
//! Permanent errors are returned straight away.

use crate::amazon::{ItemLookup, LookupError, LookupRequest, LookupResponse};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

/// Backoff schedule and time budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Wait before the first retry
    pub initial_delay_ms: u64,
    /// Growth factor applied to the wait after each retry
    pub multiplier: f64,
    /// Upper bound for a single wait
    pub max_delay_ms: u64,
    /// No new attempt starts once this much time has passed
    pub max_elapsed_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { initial_delay_ms: 1000, multiplier: 2.0, max_delay_ms: 3000, max_elapsed_ms: 6000 }
    }
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self { max_elapsed_ms: 0, ..Self::default() }
    }

    /// The successive waits between attempts.
    pub fn delays(&self) -> Backoff {
        Backoff {
            next_ms: self.initial_delay_ms.min(self.max_delay_ms),
            multiplier: self.multiplier,
            max_ms: self.max_delay_ms,
        }
    }

    pub fn max_elapsed(&self) -> Duration {
        Duration::from_millis(self.max_elapsed_ms)
    }

    /// Runs `operation` until it succeeds, fails permanently, or the budget
    /// runs out. In the last case the most recent error is returned.
    pub async fn run<T, E, F, Fut, C>(&self, mut operation: F, is_transient: C) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> bool,
        E: Display,
    {
        let started = Instant::now();
        let mut delays = self.delays();
        let mut attempt: u32 = 1;

        loop {
            let error = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("Succeeded on attempt {}", attempt);
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if !is_transient(&error) {
                debug!("Permanent failure on attempt {}: {}", attempt, error);
                return Err(error);
            }

            let elapsed = started.elapsed();
            if elapsed >= self.max_elapsed() {
                warn!(
                    "Giving up after {} attempts ({}ms): {}",
                    attempt,
                    elapsed.as_millis(),
                    error
                );
                return Err(error);
            }

            let delay = delays.next().unwrap_or(Duration::from_millis(self.max_delay_ms));
            warn!("Attempt {} failed ({}), retrying in {}ms", attempt, error, delay.as_millis());
            sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Endless iterator of capped, exponentially growing waits.
#[derive(Debug, Clone)]
pub struct Backoff {
    next_ms: u64,
    multiplier: f64,
    max_ms: u64,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next_ms;
        // float-to-int casts saturate, so huge values clamp to max_ms
        self.next_ms = ((current as f64 * self.multiplier) as u64).min(self.max_ms);
        Some(Duration::from_millis(current))
    }
}

/// A lookup transport guarded by a [`RetryPolicy`].
pub struct ResilientLookup<'a, L: ItemLookup + ?Sized> {
    transport: &'a L,
    policy: RetryPolicy,
}

impl<'a, L: ItemLookup + ?Sized> ResilientLookup<'a, L> {
    pub fn new(transport: &'a L, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub async fn lookup(&self, request: &LookupRequest) -> Result<LookupResponse, LookupError> {
        self.policy.run(|| self.transport.lookup(request), LookupError::is_transient).await
    }
}
