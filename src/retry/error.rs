//! Error types for retry operations.

use std::time::Duration;

/// Error returned by [`retry_with_hooks`](super::retry_with_hooks) when no
/// attempt succeeded.
///
/// Contains the final error along with metadata about the retry sequence.
/// The plain [`retry`](super::retry) executor surfaces the final error on
/// its own instead.
///
/// # Examples
///
/// ```rust
/// use settle::{retry_with_hooks, RetryPolicy};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let policy = RetryPolicy::quadratic(Duration::from_millis(1)).with_max_attempts(3);
///
/// let result = retry_with_hooks(
///     || async { Err::<(), _>("quote unavailable") },
///     &policy,
///     |_| {},
/// )
/// .await;
///
/// let exhausted = result.unwrap_err();
/// assert_eq!(exhausted.final_error, "quote unavailable");
/// assert_eq!(exhausted.attempts, 3);
/// # });
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    /// The error from the final attempt.
    pub final_error: E,
    /// Total number of attempts made.
    pub attempts: u32,
    /// Total time spent, attempts and delays included.
    pub total_duration: Duration,
}

impl<E> RetryExhausted<E> {
    /// Create a new RetryExhausted error.
    pub fn new(final_error: E, attempts: u32, total_duration: Duration) -> Self {
        Self {
            final_error,
            attempts,
            total_duration,
        }
    }

    /// Extract the final error, discarding metadata.
    pub fn into_error(self) -> E {
        self.final_error
    }

    /// Get a reference to the final error.
    pub fn error(&self) -> &E {
        &self.final_error
    }
}

impl<E: std::fmt::Display> std::fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "retry exhausted after {} attempts ({:?}): {}",
            self.attempts, self.total_duration, self.final_error
        )
    }
}

impl<E: std::error::Error + 'static> std::error::Error for RetryExhausted<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.final_error)
    }
}

/// Error returned when a [`RetryPolicy`](super::RetryPolicy) is built from
/// invalid parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    /// The attempt bound was zero; an operation must run at least once.
    ZeroAttempts,
}

impl std::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroAttempts => write!(f, "max_attempts must be at least 1"),
        }
    }
}

impl std::error::Error for PolicyError {}
