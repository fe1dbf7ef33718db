//! Bounded exponential-backoff retry for remote operations.
//!
//! Every remote call the store makes goes through [`execute`]. There is no
//! jitter, no circuit breaker, and no cancellation mid-sequence: a retry
//! sequence runs to completion or exhaustion. Each retried failure emits one
//! `retry` event; the final failure is propagated unmodified so callers can
//! distinguish the underlying cause.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use serde_json::json;

use crate::events;

const MODULE: &str = "sheetstore::retry";

/// Attempt budget and backoff base for one logical operation.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles for each subsequent one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(400),
        }
    }
}

/// Run `operation` up to `policy.max_attempts` times.
///
/// After a failed attempt `i` (0-based) that leaves budget, sleeps
/// `base_delay * 2^i` and tries again. The error of the final attempt is
/// returned as-is; no event is emitted for it.
pub async fn execute<T, E, F, Fut>(policy: &RetryPolicy, op: &str, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt + 1 >= attempts {
                    return Err(err);
                }
                let sleep = policy.base_delay * 2u32.pow(attempt);
                events::info(
                    "retry",
                    MODULE,
                    json!({
                        "op": op,
                        "attempt": attempt + 1,
                        "sleep": sleep.as_secs_f64(),
                        "error": err.to_string(),
                    }),
                );
                tokio::time::sleep(sleep).await;
                attempt += 1;
            }
        }
    }
}
