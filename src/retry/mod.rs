//! Retry with quadratic backoff.
//!
//! This module splits retrying into two halves:
//!
//! - **Pure Core**: [`RetryPolicy`] is just data. It answers "how long do I
//!   wait after attempt *n* failed?" without touching a clock.
//! - **Imperative Shell**: [`retry`] and friends (behind the `async` feature)
//!   run the operation, sleep on the tokio timer and surface the outcome.
//!
//! # Quick Start
//!
//! ```rust
//! use settle::{retry, RetryPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! // 100ms, 400ms, 900ms, 1600ms between five attempts
//! let policy = RetryPolicy::default();
//! assert_eq!(policy.delay_for_attempt(2), Some(Duration::from_millis(400)));
//!
//! let price = retry(|| async { Ok::<_, String>(0.42) }, &policy).await;
//! assert_eq!(price, Ok(0.42));
//! # });
//! ```
//!
//! # Choosing an executor
//!
//! - [`retry_with_backoff`]: default policy, final error returned unchanged
//! - [`retry`]: explicit policy, final error returned unchanged
//! - [`retry_if`]: stop early on errors that will never succeed
//! - [`retry_with_hooks`]: observe every failed attempt, get [`RetryExhausted`] back
//!
//! # Jitter Support
//!
//! Enable the `jitter` feature to spread retries from many clients:
//!
//! ```rust,ignore
//! use settle::RetryPolicy;
//!
//! // Add ±25% randomness to delays
//! let policy = RetryPolicy::default().with_jitter(0.25);
//! ```

mod error;
#[cfg(feature = "async")]
mod executor;
mod policy;
#[cfg(feature = "serde")]
mod serde_impl;

pub use error::{PolicyError, RetryExhausted};
#[cfg(feature = "async")]
pub use executor::{retry, retry_if, retry_with_backoff, retry_with_hooks};
pub use policy::{
    JitterStrategy, RetryEvent, RetryPolicy, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS,
};
