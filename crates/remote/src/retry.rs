use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::errors::RemoteError;

/// Errors that know whether a repeated attempt could succeed.
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for RemoteError {
    fn is_retryable(&self) -> bool {
        RemoteError::is_retryable(self)
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_base: Duration,
    backoff_max: Duration,
    enabled: bool,
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        backoff_base: Duration,
        backoff_max: Duration,
        enabled: bool,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
            backoff_max,
            enabled,
        }
    }

    /// `retry_count` extra attempts after the first one.
    pub fn with_retries(retry_count: u32, backoff_base: Duration, backoff_max: Duration) -> Self {
        Self::new(retry_count.saturating_add(1), backoff_base, backoff_max, retry_count > 0)
    }

    /// Single attempt, no backoff. Used for non-idempotent requests.
    pub fn disabled() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO, false)
    }

    pub fn max_attempts(&self) -> u32 {
        if self.enabled {
            self.max_attempts
        } else {
            1
        }
    }

    /// Exponential backoff for the given retry number (1-based), capped at `backoff_max`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        if !self.enabled || attempt == 0 {
            return Duration::ZERO;
        }
        let factor = 2_u32.checked_pow(attempt - 1).unwrap_or(u32::MAX);
        self.backoff_base.saturating_mul(factor).min(self.backoff_max)
    }

    pub async fn wait_before_retry(&self, attempt: u32) {
        let backoff = self.backoff_for(attempt);
        if backoff.is_zero() {
            return;
        }
        debug!(?backoff, attempt, "retrying after backoff");
        sleep(backoff).await;
    }
}

/// Run `operation` under `policy`, retrying errors the error type marks as retryable.
pub async fn retry_with_policy<F, Fut, T, E>(policy: &RetryPolicy, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    retry_when(policy, operation, |e: &E| e.is_retryable()).await
}

/// Like [`retry_with_policy`] with a caller-supplied retry predicate.
pub async fn retry_when<F, Fut, T, E, P>(policy: &RetryPolicy, mut operation: F, should_retry: P) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0;
    loop {
        if attempt > 0 {
            policy.wait_before_retry(attempt).await;
        }
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(retries = attempt, "operation succeeded after retries");
                }
                return Ok(result);
            }
            Err(error) => {
                attempt += 1;
                if attempt < max_attempts && should_retry(&error) {
                    warn!(attempt, max_attempts, error = %error, "operation failed, will retry");
                    continue;
                }
                return Err(error);
            }
        }
    }
}
