//! Retrying work that lost a serializable-isolation race.
//!
//! Compiled queries surface SQLSTATE 40001 as [`StmtError::Serialization`]
//! and never retry on their own: only the caller knows the boundaries of the
//! transaction that has to be replayed. This module gives that caller a loop.

use crate::error::{StmtError, StmtResult};
use std::future::Future;
use std::time::Duration;

/// Backoff settings for [`retry_on_serialization_failure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the first retry; doubled after each further failure.
    pub base_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(10),
            max_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the total number of attempts. Values below 1 are treated as 1.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the delay before the first retry.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Set the upper bound for a single delay.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay after the `attempt`-th failure (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// Run `operation` until it succeeds, fails with anything other than a
/// serialization failure, or `policy.max_attempts` is used up.
///
/// The closure should open, run and commit the whole transaction so that a
/// retry replays all of it:
///
/// ```ignore
/// retry_on_serialization_failure(&RetryPolicy::default(), || async {
///     let tx = client.build_transaction()
///         .isolation_level(IsolationLevel::Serializable)
///         .start()
///         .await?;
///     debit.execute(&tx).await?;
///     credit.execute(&tx).await?;
///     tx.commit().await?;
///     Ok(())
/// })
/// .await?;
/// ```
pub async fn retry_on_serialization_failure<T, F, Fut>(
    policy: &RetryPolicy,
    mut operation: F,
) -> StmtResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StmtResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match operation().await {
            Err(StmtError::Serialization(message)) if attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                crate::sql_warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %message,
                    "serialization failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(attempts: u32) -> RetryPolicy {
        RetryPolicy::new()
            .max_attempts(attempts)
            .base_delay(Duration::from_millis(1))
            .max_delay(Duration::from_millis(2))
    }

    #[test]
    fn test_delay_doubles_up_to_cap() {
        let policy = RetryPolicy::new()
            .base_delay(Duration::from_millis(10))
            .max_delay(Duration::from_millis(35));
        assert_eq!(policy.delay_for(1), Duration::from_millis(10));
        assert_eq!(policy.delay_for(2), Duration::from_millis(20));
        assert_eq!(policy.delay_for(3), Duration::from_millis(35));
        assert_eq!(policy.delay_for(40), Duration::from_millis(35));
    }

    #[tokio::test]
    async fn test_retries_until_success() {
        let calls = AtomicU32::new(0);
        let value = retry_on_serialization_failure(&fast_policy(5), || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err(StmtError::Serialization("conflict".into()))
            } else {
                Ok(n)
            }
        })
        .await
        .unwrap();
        assert_eq!(value, 3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let err = retry_on_serialization_failure(&fast_policy(3), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(StmtError::Serialization("conflict".into()))
        })
        .await
        .unwrap_err();
        assert!(err.is_serialization_failure());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let err = retry_on_serialization_failure(&fast_policy(5), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(StmtError::UniqueViolation("pairings_pkey: duplicate".into()))
        })
        .await
        .unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
