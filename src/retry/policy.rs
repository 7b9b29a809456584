//! Retry policy types and configuration.

use std::time::Duration;

use super::error::PolicyError;

/// Number of attempts made by [`RetryPolicy::default`].
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Base delay used by [`RetryPolicy::default`].
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

/// A retry policy describing how often, and how patiently, to retry a
/// failed operation.
///
/// Policies are pure data. The delay before the next attempt grows with the
/// square of the attempt that just failed: `base * attempt²`, so the default
/// policy waits 100ms, 400ms, 900ms and 1600ms between its five attempts.
///
/// `max_attempts` counts every invocation, the first one included, and is
/// never below 1.
///
/// # Examples
///
/// ```rust
/// use settle::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.max_attempts(), 5);
///
/// let delays: Vec<_> = policy.delays().collect();
/// assert_eq!(
///     delays,
///     vec![
///         Duration::from_millis(100),
///         Duration::from_millis(400),
///         Duration::from_millis(900),
///         Duration::from_millis(1600),
///     ]
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    base: Duration,
    max_attempts: u32,
    max_delay: Option<Duration>,
    jitter: JitterStrategy,
}

/// Strategy for adding randomness to delays.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum JitterStrategy {
    /// No jitter applied.
    #[default]
    None,
    /// Add ±percentage randomness to delay.
    Proportional(f64),
    /// Random delay between 0 and calculated delay.
    Full,
}

/// Information about a failed attempt, passed to hooks.
#[derive(Debug, Clone)]
pub struct RetryEvent<'a, E> {
    /// Which attempt just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed attempt.
    pub error: &'a E,
    /// Delay before the next attempt, `None` when this was the last one.
    pub next_delay: Option<Duration>,
    /// Total elapsed time since the first attempt started.
    pub elapsed: Duration,
}

impl<E> RetryEvent<'_, E> {
    /// Returns true if another attempt follows this one.
    pub fn will_retry(&self) -> bool {
        self.next_delay.is_some()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::quadratic(DEFAULT_BASE_DELAY)
    }
}

impl RetryPolicy {
    /// Create a quadratic backoff policy with [`DEFAULT_MAX_ATTEMPTS`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use settle::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::quadratic(Duration::from_millis(10));
    ///
    /// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(10)));
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(40)));
    /// assert_eq!(policy.delay_for_attempt(3), Some(Duration::from_millis(90)));
    /// ```
    pub fn quadratic(base: Duration) -> Self {
        Self {
            base,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_delay: None,
            jitter: JitterStrategy::None,
        }
    }

    /// Create a policy, rejecting an attempt bound of zero.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use settle::{PolicyError, RetryPolicy};
    /// use std::time::Duration;
    ///
    /// assert!(RetryPolicy::new(Duration::from_millis(100), 3).is_ok());
    /// assert_eq!(
    ///     RetryPolicy::new(Duration::from_millis(100), 0),
    ///     Err(PolicyError::ZeroAttempts)
    /// );
    /// ```
    pub fn new(base: Duration, max_attempts: u32) -> Result<Self, PolicyError> {
        if max_attempts == 0 {
            return Err(PolicyError::ZeroAttempts);
        }
        Ok(Self::quadratic(base).with_max_attempts(max_attempts))
    }

    /// Set the maximum number of attempts, the initial one included.
    ///
    /// A bound of zero is raised to one: the operation always runs at least
    /// once. Use [`RetryPolicy::new`] to reject zero instead.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use settle::RetryPolicy;
    ///
    /// let policy = RetryPolicy::default().with_max_attempts(3);
    /// assert_eq!(policy.max_attempts(), 3);
    ///
    /// let policy = RetryPolicy::default().with_max_attempts(0);
    /// assert_eq!(policy.max_attempts(), 1);
    /// ```
    pub fn with_max_attempts(mut self, n: u32) -> Self {
        self.max_attempts = n.max(1);
        self
    }

    /// Set the maximum delay cap.
    ///
    /// Delays never exceed this value, jitter included.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use settle::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default()
    ///     .with_max_attempts(10)
    ///     .with_max_delay(Duration::from_secs(1));
    ///
    /// assert_eq!(policy.delay_for_attempt(3), Some(Duration::from_millis(900)));
    /// assert_eq!(policy.delay_for_attempt(4), Some(Duration::from_secs(1)));
    /// ```
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Add proportional jitter to delays.
    ///
    /// `0.25` means the actual delay lands within ±25% of the calculated one.
    /// The factor is clamped to `[0.0, 1.0]`; a NaN or infinite factor
    /// means no jitter.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, delays stay exact.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        let factor = if factor.is_finite() {
            factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.jitter = JitterStrategy::Proportional(factor);
        self
    }

    /// Use full jitter: a random delay between 0 and the calculated delay.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, delays stay exact.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Full;
        self
    }

    /// Get the base delay.
    pub fn base(&self) -> Duration {
        self.base
    }

    /// Get the maximum number of attempts.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Get the maximum delay cap.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Get the jitter strategy.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Calculate the delay after attempt `attempt` (1-indexed) has failed.
    ///
    /// Returns `None` when `attempt` was the last one allowed.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use settle::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::default().with_max_attempts(3);
    ///
    /// assert_eq!(policy.delay_for_attempt(1), Some(Duration::from_millis(100)));
    /// assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(400)));
    /// assert_eq!(policy.delay_for_attempt(3), None);
    /// ```
    pub fn delay_for_attempt(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }

        let delay = self
            .base
            .saturating_mul(attempt.saturating_mul(attempt));

        Some(match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        })
    }

    /// Calculate the delay with jitter applied.
    ///
    /// This is used internally by the retry executor.
    #[doc(hidden)]
    pub fn delay_with_jitter(&self, attempt: u32) -> Option<Duration> {
        let base_delay = self.delay_for_attempt(attempt)?;
        Some(self.jitter.apply(base_delay, self.max_delay))
    }

    /// Iterate over every delay this policy can produce, in order.
    ///
    /// Yields `max_attempts - 1` values; jitter is not applied.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts).filter_map(move |attempt| self.delay_for_attempt(attempt))
    }

    /// Total time spent sleeping if every attempt fails.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use settle::RetryPolicy;
    /// use std::time::Duration;
    ///
    /// // 100 + 400 + 900 + 1600
    /// assert_eq!(RetryPolicy::default().max_total_delay(), Duration::from_millis(3000));
    /// ```
    pub fn max_total_delay(&self) -> Duration {
        self.delays()
            .fold(Duration::ZERO, |total, d| total.saturating_add(d))
    }
}

impl JitterStrategy {
    /// Apply jitter to a base delay, then cap it at `max_delay`.
    pub fn apply(&self, base_delay: Duration, max_delay: Option<Duration>) -> Duration {
        let jittered = match self {
            JitterStrategy::None => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Proportional(factor) => {
                use rand::Rng;
                let base_millis = base_delay.as_millis() as f64;
                let range = base_millis * factor;
                let min = (base_millis - range).max(0.0);
                let max = base_millis + range;
                // Also false for a NaN or infinite factor.
                if max.is_finite() && max > min {
                    let millis = rand::rng().random_range(min..=max);
                    Duration::from_millis(millis as u64)
                } else {
                    base_delay
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Proportional(_) => base_delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Full => {
                use rand::Rng;
                let max_millis = u64::try_from(base_delay.as_millis()).unwrap_or(u64::MAX);
                if max_millis == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rand::rng().random_range(0..=max_millis))
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Full => base_delay,
        };

        match max_delay {
            Some(max) => jittered.min(max),
            None => jittered,
        }
    }
}
