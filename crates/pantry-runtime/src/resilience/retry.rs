//! Bounded exponential-backoff retry.

use backon::{ExponentialBuilder, Retryable};
use pantry_core::{GatewayError, GatewayResult};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Ceiling for a single backoff delay.
const MAX_DELAY: Duration = Duration::from_secs(60);

/// Retry configuration for one class of outbound call.
///
/// Waits `base_delay * 2^(n-1)` before retry `n`, for at most `max_retries`
/// retries (so `max_retries + 1` attempts in total).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: usize,

    /// Delay before the first retry
    #[serde(with = "crate::config::duration_str")]
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: usize, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Recipe lookup and delivery calls: one retry after 0.5s.
    pub fn provider_default() -> Self {
        Self::new(1, Duration::from_millis(500))
    }

    /// Reasoning calls: two retries, 1s then 2s.
    pub fn reasoning_default() -> Self {
        Self::new(2, Duration::from_secs(1))
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_factor(2.0)
            .with_max_delay(MAX_DELAY)
            .with_max_times(self.max_retries)
    }

    /// Run `operation`, retrying failures accepted by `retryable`.
    ///
    /// Precondition failures (missing credential or sender) are never retried,
    /// whatever the predicate says. The last error is returned once attempts
    /// are exhausted.
    pub async fn execute<T, F, Fut, P>(&self, operation: F, retryable: P) -> GatewayResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
        P: Fn(&GatewayError) -> bool,
    {
        let mut retry = 0u32;
        operation
            .retry(self.backoff())
            .sleep(tokio::time::sleep)
            .when(|e: &GatewayError| !e.is_precondition() && retryable(e))
            .notify(|e: &GatewayError, delay: Duration| {
                retry += 1;
                tracing::warn!(
                    service = %e.service(),
                    retry,
                    delay = ?delay,
                    error = %e,
                    "Outbound call failed, retrying"
                );
            })
            .await
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::provider_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantry_core::Service;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn transient() -> GatewayError {
        GatewayError::TransientNetwork {
            service: Service::RecipeLookup,
            detail: "connection reset".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles_from_base() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::new(2, Duration::from_millis(500));
        let start = Instant::now();

        let result: GatewayResult<()> = policy
            .execute(
                move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(transient())
                },
                GatewayError::is_retryable,
            )
            .await;

        let elapsed = start.elapsed();
        assert_eq!(result, Err(transient()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 0.5s then 1.0s
        assert!(elapsed >= Duration::from_millis(1500), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1600), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::provider_default();

        let result = policy
            .execute(
                move || async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(transient())
                    } else {
                        Ok("done")
                    }
                },
                GatewayError::is_retryable,
            )
            .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_third_attempt_succeeds_within_two_retries() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::new(2, Duration::from_millis(500));
        let start = Instant::now();

        let result = policy
            .execute(
                move || async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(transient())
                    } else {
                        Ok(7)
                    }
                },
                GatewayError::is_retryable,
            )
            .await;

        let elapsed = start.elapsed();
        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(elapsed >= Duration::from_millis(1500), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(1600), "elapsed {:?}", elapsed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_fails_once() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::reasoning_default();

        let result: GatewayResult<()> = policy
            .execute(
                move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(GatewayError::Authentication {
                        service: Service::Reasoning,
                    })
                },
                GatewayError::is_retryable,
            )
            .await;

        assert!(matches!(result, Err(GatewayError::Authentication { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_precondition_never_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = RetryPolicy::reasoning_default();

        let result: GatewayResult<()> = policy
            .execute(
                move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(GatewayError::MissingSender)
                },
                |_| true,
            )
            .await;

        assert_eq!(result, Err(GatewayError::MissingSender));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: GatewayResult<()> = RetryPolicy::none()
            .execute(
                move || async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(transient())
                },
                GatewayError::is_retryable,
            )
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_policy_yaml_uses_humantime() {
        let policy: RetryPolicy =
            serde_yaml::from_str("max_retries: 3\nbase_delay: 250ms\n").unwrap();
        assert_eq!(policy, RetryPolicy::new(3, Duration::from_millis(250)));
    }
}
