//! Async retry executors.
//!
//! Every executor takes a factory instead of a future: a future can only be
//! polled to completion once, so each attempt builds a fresh one.

use std::fmt::Debug;
use std::future::Future;

use tokio::time::{sleep, Instant};

use super::{RetryEvent, RetryExhausted, RetryPolicy};

/// Retry an operation with the default policy: up to 5 attempts, sleeping
/// 100ms, 400ms, 900ms and 1600ms between them.
///
/// Only the error from the final attempt is returned.
///
/// # Example
///
/// ```rust
/// use settle::retry_with_backoff;
///
/// # tokio_test::block_on(async {
/// let quote = retry_with_backoff(|| async { Ok::<_, String>(42) }).await;
/// assert_eq!(quote, Ok(42));
/// # });
/// ```
pub async fn retry_with_backoff<T, E, F, Fut>(operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Debug,
{
    retry(operation, &RetryPolicy::default()).await
}

/// Retry an operation according to `policy`.
///
/// The operation is invoked until it succeeds or `policy.max_attempts()`
/// invocations have failed. Errors from earlier attempts are dropped; the
/// caller receives the last one unchanged.
///
/// # Example
///
/// ```rust
/// use settle::{retry, RetryPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let policy = RetryPolicy::quadratic(Duration::from_millis(1)).with_max_attempts(2);
///
/// let mut calls = 0;
/// let result = retry(
///     || {
///         calls += 1;
///         let n = calls;
///         async move { Err::<(), _>(format!("attempt {} failed", n)) }
///     },
///     &policy,
/// )
/// .await;
///
/// assert_eq!(result, Err("attempt 2 failed".to_string()));
/// # });
/// ```
pub async fn retry<T, E, F, Fut>(operation: F, policy: &RetryPolicy) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Debug,
{
    run(operation, policy, |_| true, |_| {})
        .await
        .map_err(RetryExhausted::into_error)
}

/// Retry only when the predicate returns true for the error.
///
/// Non-retryable errors propagate immediately, without a delay. Useful for
/// separating transient failures (rate limits, timeouts) from permanent ones
/// (invalid mint, insufficient balance).
///
/// # Example
///
/// ```rust
/// use settle::{retry_if, RetryPolicy};
///
/// #[derive(Debug, PartialEq)]
/// enum QuoteError { RateLimited, NoRoute }
///
/// # tokio_test::block_on(async {
/// let result = retry_if(
///     || async { Err::<(), _>(QuoteError::NoRoute) },
///     &RetryPolicy::default(),
///     |err| matches!(err, QuoteError::RateLimited),
/// )
/// .await;
///
/// // Permanent errors are not retried
/// assert_eq!(result, Err(QuoteError::NoRoute));
/// # });
/// ```
pub async fn retry_if<T, E, F, Fut, P>(
    operation: F,
    policy: &RetryPolicy,
    should_retry: P,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&E) -> bool,
    E: Debug,
{
    run(operation, policy, should_retry, |_| {})
        .await
        .map_err(RetryExhausted::into_error)
}

/// Retry with a hook for observability.
///
/// `on_retry` is invoked for every failed attempt, the last one included
/// (its event carries `next_delay: None`). The hook is synchronous and
/// should not block; use it for logging or metrics.
///
/// On failure the final error comes back wrapped in [`RetryExhausted`]
/// together with the number of attempts and the total time spent.
///
/// # Example
///
/// ```rust
/// use settle::{retry_with_hooks, RetryEvent, RetryPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let mut seen = Vec::new();
/// let result = retry_with_hooks(
///     || async { Err::<(), _>("timeout".to_string()) },
///     &RetryPolicy::quadratic(Duration::from_millis(1)).with_max_attempts(3),
///     |event: &RetryEvent<'_, String>| seen.push((event.attempt, event.will_retry())),
/// )
/// .await;
///
/// assert_eq!(result.unwrap_err().attempts, 3);
/// assert_eq!(seen, vec![(1, true), (2, true), (3, false)]);
/// # });
/// ```
pub async fn retry_with_hooks<T, E, F, Fut, H>(
    operation: F,
    policy: &RetryPolicy,
    on_retry: H,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    H: FnMut(&RetryEvent<'_, E>),
    E: Debug,
{
    run(operation, policy, |_| true, on_retry).await
}

async fn run<T, E, F, Fut, P, H>(
    mut operation: F,
    policy: &RetryPolicy,
    mut should_retry: P,
    mut on_retry: H,
) -> Result<T, RetryExhausted<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&E) -> bool,
    H: FnMut(&RetryEvent<'_, E>),
    E: Debug,
{
    let start = Instant::now();
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let delay = if should_retry(&error) {
            policy.delay_with_jitter(attempt)
        } else {
            None
        };

        on_retry(&RetryEvent {
            attempt,
            error: &error,
            next_delay: delay,
            elapsed: start.elapsed(),
        });

        match delay {
            Some(d) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(attempt, delay = ?d, "attempt failed: {:?}; retrying", error);

                sleep(d).await;
            }
            None => {
                #[cfg(feature = "tracing")]
                tracing::warn!(attempt, "giving up: {:?}", error);

                return Err(RetryExhausted::new(error, attempt, start.elapsed()));
            }
        }
    }
}
