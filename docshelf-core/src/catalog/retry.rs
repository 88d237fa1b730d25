//! Bounded retry with a fixed delay
//!
//! Only container-reachability probes are retried: that is the one step
//! subject to transient external I/O. Validation, duplicate and not-found
//! errors are deterministic and must never pass through here.

use std::future::Future;
use std::time::Duration;

use crate::error::Result;

/// Attempt count and fixed inter-attempt delay for a retried operation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Treated as at least 1.
    pub attempts: u32,

    /// Fixed delay between attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Build a policy.
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// A single attempt, no delay. Used by tests for determinism.
    pub const fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    /// 3 attempts, 500ms apart, absorbing transient backend latency.
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Drive `op` until it succeeds or the policy is exhausted, returning the
/// last error. Blocking from the caller's perspective; attempts are
/// short-lived and bounded, so no cancellation token is needed.
pub async fn retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts => {
                tracing::debug!(attempt, error = %err, "attempt failed, retrying");
                attempt += 1;
                if !policy.delay.is_zero() {
                    tokio::time::sleep(policy.delay).await;
                }
            }
            Err(err) => return Err(err),
        }
    }
}
