//! Retry with exponential backoff for transient provider failures

use std::future::Future;
use std::time::Duration;

use log::warn;

use crate::error::{ApiError, Error, Result};

/// How many times to try an outbound call and how long to wait in between
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn with_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Self::default()
        }
    }

    /// Delay before attempt `attempt + 1`, given the error that ended `attempt`.
    ///
    /// A provider `Retry-After` is honoured up to `max_backoff`.
    pub fn backoff(&self, attempt: u32, err: &Error) -> Duration {
        let exp = self
            .base_backoff
            .saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
            .min(self.max_backoff);

        match err {
            Error::Api(ApiError::RateLimit(retry_after)) => {
                exp.max((*retry_after).min(self.max_backoff))
            }
            _ => exp,
        }
    }
}

/// Run `f` until it succeeds, fails with a non-transient error, or runs out
/// of attempts.
pub async fn with_retry<F, Fut, T>(policy: RetryPolicy, what: &str, mut f: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < policy.max_attempts && e.is_transient() => {
                let wait = policy.backoff(attempt, &e);
                warn!(
                    "{} failed (attempt {}/{}): {}. Retrying in {}ms",
                    what,
                    attempt,
                    policy.max_attempts,
                    e,
                    wait.as_millis()
                );
                tokio::time::sleep(wait).await;
            }
            Err(e) => return Err(e),
        }
    }
}
