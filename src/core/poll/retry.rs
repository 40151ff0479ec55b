//! Retry an operation until it succeeds or a deadline passes

use crate::domain::{PollError, ProviderError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Outcome of a failed attempt
#[derive(Debug)]
pub enum RetryError {
    /// Try again after the backoff delay
    Retryable(ProviderError),

    /// Give up and return the error
    NonRetryable(ProviderError),
}

impl RetryError {
    /// Transient errors are retryable, everything else is not
    pub fn classify(err: ProviderError) -> Self {
        if err.is_transient() {
            RetryError::Retryable(err)
        } else {
            RetryError::NonRetryable(err)
        }
    }
}

impl From<ProviderError> for RetryError {
    fn from(err: ProviderError) -> Self {
        RetryError::classify(err)
    }
}

/// Exponential backoff between attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    pub multiplier: f64,
}

impl Backoff {
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial: delay,
            max: delay,
            multiplier: 1.0,
        }
    }

    /// Delay before the attempt following `attempt` (0-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt as i32);
        let delay = self.initial.as_secs_f64() * factor;
        Duration::from_secs_f64(delay.min(self.max.as_secs_f64()))
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(500),
            max: Duration::from_secs(10),
            multiplier: 2.0,
        }
    }
}

/// Runs `operation` until it succeeds, fails non-retryably, or `timeout`
/// would be exceeded by the next backoff sleep
///
/// # Errors
///
/// The non-retryable error as-is, or [`PollError::Timeout`] carrying the
/// last retryable error.
pub async fn retry_until<T, F, Fut>(timeout: Duration, backoff: Backoff, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, RetryError>>,
{
    let start = Instant::now();
    let mut attempt: u32 = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(RetryError::NonRetryable(err)) => return Err(err),
            Err(RetryError::Retryable(err)) => {
                let delay = backoff.delay_for_attempt(attempt);
                attempt += 1;

                if start.elapsed().saturating_add(delay) > timeout {
                    return Err(PollError::Timeout {
                        target: "success".to_string(),
                        last_status: "retrying".to_string(),
                        timeout,
                        last_error: Some(err.to_string()),
                    }
                    .into());
                }

                tracing::warn!(
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Retrying operation"
                );

                sleep(delay).await;
            }
        }
    }
}
