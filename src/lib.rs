//! # Settle
//!
//! > *"Let the input settle, then ask, and ask again if you must"*
//!
//! Two small tools for UIs and services that turn fast-changing input into
//! network requests:
//!
//! - **Backoff retries** ([`retry`](mod@retry)): run an async operation up to
//!   `max_attempts` times, sleeping `attempt² × 100ms` between failures.
//! - **Debounced values** ([`debounce`]): hold back a value until it has stopped
//!   changing for a quiet period, so a burst of keystrokes becomes one request.
//!
//! The [`pipeline`] module composes the two: settled input → fetch wrapped in
//! retry → latest result.
//!
//! ## Philosophy
//!
//! Both tools come as a **pure core** with an **imperative shell**:
//! [`RetryPolicy`] and [`Debounce`] are plain data that compute delays and
//! deadlines from the arguments they are given, while the `async` feature adds
//! the tokio-driven executors that actually sleep.
//!
//! ## Quick Example
//!
//! ```rust
//! use settle::{retry_with_backoff, Debounce};
//! use std::time::{Duration, Instant};
//!
//! // Debounce: only the last of a burst of values settles
//! let t0 = Instant::now();
//! let mut amount = Debounce::new(0, Duration::from_millis(500));
//! amount.update(1, t0);
//! amount.update(12, t0 + Duration::from_millis(100));
//! assert_eq!(amount.poll(t0 + Duration::from_millis(600)), Some(&12));
//!
//! // Retry: the quote request is attempted up to five times
//! # tokio_test::block_on(async {
//! let quote = retry_with_backoff(|| async { Ok::<_, String>(1_250_000u64) }).await;
//! assert_eq!(quote, Ok(1_250_000));
//! # });
//! ```
//!
//! ## Features
//!
//! - `async` (default): tokio executors, [`Debouncer`] and [`pipeline`]
//! - `tracing`: log failed attempts and debounce timers
//! - `jitter`: randomized delays
//! - `serde`: (de)serialize [`RetryPolicy`]
//! - `proptest`: `Arbitrary` implementations in [`testing`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod debounce;
#[cfg(feature = "async")]
pub mod pipeline;
pub mod retry;
pub mod testing;

// Re-exports
pub use debounce::Debounce;
#[cfg(feature = "async")]
pub use debounce::Debouncer;
pub use retry::{JitterStrategy, PolicyError, RetryEvent, RetryExhausted, RetryPolicy};
#[cfg(feature = "async")]
pub use retry::{retry, retry_if, retry_with_backoff, retry_with_hooks};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::debounce::Debounce;
    #[cfg(feature = "async")]
    pub use crate::debounce::Debouncer;
    #[cfg(feature = "async")]
    pub use crate::pipeline::{fetch_latest, Fetched};
    pub use crate::retry::{RetryEvent, RetryExhausted, RetryPolicy};
    #[cfg(feature = "async")]
    pub use crate::retry::{retry, retry_if, retry_with_backoff, retry_with_hooks};
}
