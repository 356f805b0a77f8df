//! Bounded retry with constant backoff.
//!
//! Wraps both the upstream fetch and each outbound message send. The wait
//! between attempts suspends only the calling task.

use std::future::Future;
use std::time::Duration;

/// Attempt count and fixed delay shared by the call sites that retry.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Treated as at least 1.
    pub attempts: u32,

    /// Fixed delay between attempts. No exponential growth.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy from the configured attempt count and delay.
    #[must_use]
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// Runs `operation` under this policy. See [`retry`].
    pub async fn run<T, E, F, Fut, C>(&self, operation: F, on_retry: C) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: FnMut(&E, u32),
    {
        retry(self.attempts, self.delay, operation, on_retry).await
    }
}

/// Executes `operation` up to `attempts` times.
///
/// On each non-final failure, `on_retry` is invoked with the error and the
/// 1-based attempt number, then the task sleeps for the fixed `delay`. On
/// exhaustion the last observed error is returned to the caller.
pub async fn retry<T, E, F, Fut, C>(
    attempts: u32,
    delay: Duration,
    mut operation: F,
    mut on_retry: C,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: FnMut(&E, u32),
{
    let attempts = attempts.max(1);

    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= attempts {
                    return Err(err);
                }
                on_retry(&err, attempt);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_first_attempt_success_does_not_retry() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, &str> = retry(
            3,
            Duration::from_millis(1),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(7) }
            },
            |_, _| panic!("on_retry must not fire on success"),
        )
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_succeeds_after_failures() {
        let calls = AtomicU32::new(0);
        let retries = AtomicU32::new(0);

        let result: Result<u32, &str> = retry(
            3,
            Duration::from_millis(1),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { if n < 3 { Err("boom") } else { Ok(n) } }
            },
            |_, attempt| {
                retries.fetch_add(1, Ordering::SeqCst);
                assert!(attempt < 3);
            },
        )
        .await;

        assert_eq!(result, Ok(3));
        assert_eq!(retries.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let calls = AtomicU32::new(0);
        let result: Result<(), String> = retry(
            2,
            Duration::from_millis(1),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { Err(format!("failure {n}")) }
            },
            |_, _| {},
        )
        .await;

        assert_eq!(result, Err("failure 2".to_owned()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_zero_attempts_still_runs_once() {
        let result: Result<u32, &str> = retry(
            0,
            Duration::from_millis(1),
            || async { Ok(1) },
            |_, _| {},
        )
        .await;
        assert_eq!(result, Ok(1));
    }
}
