//! Bounded retry with exponential backoff for upstream calls.

use crate::error::{Error, Result};
use std::future::Future;
use std::time::Duration;

/// Backoff schedule. Delays grow by `factor` after each failed attempt,
/// capped at `max_delay`. No jitter; the schedule is deterministic.
#[derive(Debug, Clone)]
pub struct RetryOptions {
  pub max_attempts: u32,
  pub initial_delay: Duration,
  pub max_delay: Duration,
  pub factor: u32,
}

impl Default for RetryOptions {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      initial_delay: Duration::from_millis(1000),
      max_delay: Duration::from_millis(10_000),
      factor: 2,
    }
  }
}

/// Run `operation`, retrying transient failures up to the attempt budget.
///
/// Uses [`Error::is_transient`] as the predicate: 5xx, 429, and timeouts
/// retry; everything else propagates immediately. The operation must be
/// safe to run more than once.
pub async fn retry<T, F, Fut>(operation: F, options: &RetryOptions) -> Result<T>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T>>,
{
  retry_if(operation, options, |err, _attempt| err.is_transient()).await
}

/// Like [`retry`], with a caller-supplied predicate over `(error, attempt)`.
pub async fn retry_if<T, F, Fut, P>(mut operation: F, options: &RetryOptions, should_retry: P) -> Result<T>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T>>,
  P: Fn(&Error, u32) -> bool,
{
  let mut delay = options.initial_delay;
  let max_attempts = options.max_attempts.max(1);

  for attempt in 1..=max_attempts {
    match operation().await {
      Ok(value) => return Ok(value),
      Err(err) => {
        if attempt == max_attempts || !should_retry(&err, attempt) {
          return Err(err);
        }
        tracing::warn!(
          attempt,
          max_attempts,
          delay_ms = delay.as_millis() as u64,
          error = %err,
          "transient upstream failure, retrying"
        );
        tokio::time::sleep(delay).await;
        delay = std::cmp::min(delay * options.factor, options.max_delay);
      }
    }
  }

  // Loop always returns on the final attempt.
  unreachable!("retry loop exited without a result")
}
