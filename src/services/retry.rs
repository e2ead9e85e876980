//! Exponential backoff for transient provider failures

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::error::{AppError, AppResult};

/// Retry policy for provider calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the initial attempt (0 = try once)
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Cap on any single delay, including server-requested ones
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
        }
    }

    /// No retries at all
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO, Duration::ZERO)
    }

    /// Delay before retry number `attempt` (0-indexed): base * 2^attempt, capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Server-requested delay wins over the computed one, still capped
    fn delay_after(&self, error: &AppError, attempt: u32) -> Duration {
        match error {
            AppError::RateLimited {
                retry_after: Some(retry_after),
            } => (*retry_after).min(self.max_delay),
            _ => self.delay_for(attempt),
        }
    }
}

/// Runs `operation`, retrying transient errors according to `policy`
///
/// Non-transient errors are returned immediately. After the last retry the
/// final error is returned.
pub async fn retry_with_backoff<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay_after(&e, attempt);
                tracing::warn!(
                    error = %e,
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "Transient provider failure, backing off"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
