//! Bounded retry with exponential backoff, applied at stage boundaries.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::analysis::StageError;
use crate::constants::{DEFAULT_BACKOFF_BASE_MS, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_MAX_ATTEMPTS};

/// Retry policy shared by every stage; transient failures only.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Delay multiplier between consecutive attempts.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BACKOFF_BASE_MS),
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
        }
    }
}

impl RetryPolicy {
    /// Policy with `max_attempts` and no backoff delay (used by tests).
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// Runs `op`, retrying transient failures up to `max_attempts` times.
    ///
    /// Permanent failures (not-found, malformed output) return immediately.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T, StageError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StageError>>,
    {
        let mut delay = self.base_delay;
        let mut attempt = 1u32;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(
                        stage = label,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "transient stage failure, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    delay *= self.multiplier;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
