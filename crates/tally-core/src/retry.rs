//! Per-key retry policy for counter writes
//!
//! Only [`StoreWriteError::Transient`] failures are retried. Backoff doubles
//! after each failed attempt, capped at `max_backoff_ms`.

use crate::error::StoreWriteError;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts per write, including the first
    pub max_attempts: u32,
    /// Delay after the first failure
    pub initial_backoff_ms: u64,
    /// Upper bound on any single delay
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    /// Create policy
    #[inline]
    #[must_use]
    pub fn new(max_attempts: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_attempts,
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    /// Single attempt, no retries
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::new(1, 0, 0)
    }

    /// Delay before the attempt following `failed_attempts` failures
    #[must_use]
    pub fn backoff(&self, failed_attempts: u32) -> Duration {
        let exponent = failed_attempts.saturating_sub(1).min(63);
        let factor = 1u64 << exponent;
        let millis = self
            .initial_backoff_ms
            .saturating_mul(factor)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out
    ///
    /// Returns the number of attempts made alongside the final result.
    pub async fn run<T, F, Fut>(&self, target: &str, mut op: F) -> (u32, Result<T, StoreWriteError>)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StoreWriteError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            match op().await {
                Ok(value) => return (attempt, Ok(value)),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.backoff(attempt);
                    tracing::warn!(
                        target_key = target,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "retrying counter write"
                    );
                    sleep(delay).await;
                }
                Err(e) => return (attempt, Err(e)),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, 50, 2_000)
    }
}
