//! Retry with exponential backoff, limited to transient failures.
//!
//! A permanent failure (not found, validation, a business rule) is returned at
//! once. Only errors whose [`Transient::is_transient`] is true are retried, and
//! only callers whose operation is idempotent should ask for retries at all.
//!
//! ```rust
//! use actor_framework::retry::{retry_transient, RetryPolicy};
//! use actor_framework::FrameworkError;
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let policy = RetryPolicy::builder()
//!     .max_retries(2)
//!     .initial_delay(Duration::from_millis(1))
//!     .build();
//!
//! let mut calls = 0;
//! let result = retry_transient(&policy, || {
//!     calls += 1;
//!     let outcome = if calls < 2 { Err(FrameworkError::ActorDropped) } else { Ok(calls) };
//!     async move { outcome }
//! })
//! .await;
//! assert_eq!(result.unwrap(), 2);
//! # }
//! ```

use crate::error::FrameworkError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Errors that can tell a retryable failure from a final one.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

impl Transient for FrameworkError {
    fn is_transient(&self) -> bool {
        FrameworkError::is_transient(self)
    }
}

/// Backoff configuration.
///
/// Defaults: 3 retries, 50ms initial delay, 2s cap, doubling.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder {
            policy: Self::default(),
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// `initial_delay * multiplier^attempt`, capped at `max_delay`.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let millis = self.initial_delay.as_millis() as f64 * self.multiplier.powi(exponent);
        if !millis.is_finite() || millis >= self.max_delay.as_millis() as f64 {
            return self.max_delay;
        }
        Duration::from_millis(millis as u64)
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicyBuilder {
    policy: RetryPolicy,
}

impl RetryPolicyBuilder {
    #[must_use]
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.policy.max_retries = max_retries;
        self
    }

    #[must_use]
    pub fn initial_delay(mut self, delay: Duration) -> Self {
        self.policy.initial_delay = delay;
        self
    }

    #[must_use]
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.policy.max_delay = delay;
        self
    }

    #[must_use]
    pub fn multiplier(mut self, multiplier: f64) -> Self {
        self.policy.multiplier = multiplier;
        self
    }

    #[must_use]
    pub fn build(self) -> RetryPolicy {
        self.policy
    }
}

/// Runs `operation` until it succeeds, fails permanently, or the policy's
/// retries are used up. Returns the last error in the latter two cases.
pub async fn retry_transient<F, Fut, T, E>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Transient + std::fmt::Display,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(attempt, "Operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) if err.is_transient() && attempt < policy.max_retries => {
                let delay = policy.delay_for_attempt(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient failure, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                if err.is_transient() {
                    tracing::error!(attempts = attempt + 1, error = %err, "Retries exhausted");
                }
                return Err(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast() -> RetryPolicy {
        RetryPolicy::builder()
            .max_retries(3)
            .initial_delay(Duration::from_millis(1))
            .max_delay(Duration::from_millis(4))
            .build()
    }

    #[test]
    fn delay_grows_then_caps() {
        let policy = RetryPolicy::builder()
            .initial_delay(Duration::from_millis(100))
            .max_delay(Duration::from_millis(500))
            .build();
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(10_000), Duration::from_millis(500));
    }

    #[tokio::test]
    async fn permanent_errors_are_not_retried() {
        let mut calls = 0;
        let result: Result<(), _> = retry_transient(&fast(), || {
            calls += 1;
            async { Err(FrameworkError::NotFound("order_1".into())) }
        })
        .await;
        assert!(matches!(result, Err(FrameworkError::NotFound(_))));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn transient_errors_stop_after_max_retries() {
        let mut calls = 0;
        let result: Result<(), _> = retry_transient(&fast(), || {
            calls += 1;
            async { Err(FrameworkError::ActorClosed) }
        })
        .await;
        assert!(matches!(result, Err(FrameworkError::ActorClosed)));
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn no_retry_policy_calls_once() {
        let mut calls = 0;
        let _: Result<(), _> = retry_transient(&RetryPolicy::none(), || {
            calls += 1;
            async { Err(FrameworkError::ActorDropped) }
        })
        .await;
        assert_eq!(calls, 1);
    }
}
