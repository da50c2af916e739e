//! Fixed-delay retry for transient network failures
//!
//! Wraps RepairShopr calls that may fail transiently (connection test,
//! ticket fetch). Attempts run strictly one after another on the caller's
//! task.

use std::future::Future;
use std::time::{Duration, Instant};

/// Retries after the first attempt
pub const DEFAULT_RETRIES: u32 = 3;

/// Wait between a failure and the next attempt
pub const RETRY_DELAY: Duration = Duration::from_millis(2000);

/// Retry an async operation with a fixed delay until it succeeds or the
/// retry budget is spent.
///
/// **Algorithm:**
/// 1. Attempt operation
/// 2. If successful, return result
/// 3. If failed and retries remain: log WARN, sleep `delay`, decrement budget, retry
/// 4. If failed and no retries remain: return the last error
///
/// `retries = 0` means a single attempt.
///
/// # Arguments
/// * `operation_name` - Name for logging (e.g., "connection test", "ticket fetch")
/// * `retries` - Retries allowed after the first attempt
/// * `delay` - Fixed wait between attempts
/// * `operation` - Closure producing a fresh future per attempt
pub async fn with_retry<F, Fut, T, E>(
    operation_name: &str,
    retries: u32,
    delay: Duration,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let start_time = Instant::now();
    let mut remaining = retries;
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    tracing::debug!(
                        operation = operation_name,
                        attempt,
                        elapsed_ms = start_time.elapsed().as_millis() as u64,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if remaining == 0 {
                    if retries > 0 {
                        tracing::error!(
                            operation = operation_name,
                            attempt,
                            error = %err,
                            "Operation failed: retries exhausted"
                        );
                    }
                    return Err(err);
                }

                tracing::warn!(
                    operation = operation_name,
                    attempt,
                    remaining,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Operation failed, will retry after delay"
                );

                tokio::time::sleep(delay).await;
                remaining -= 1;
            }
        }
    }
}

/// [`with_retry`] with the standard policy (3 retries, 2000 ms apart)
pub async fn with_default_retry<F, Fut, T, E>(operation_name: &str, operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    with_retry(operation_name, DEFAULT_RETRIES, RETRY_DELAY, operation).await
}
