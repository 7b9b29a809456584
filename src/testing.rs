//! Testing utilities for code built on settle.
//!
//! # Examples
//!
//! ## Flaky operations
//!
//! ```rust
//! use settle::testing::{Flaky, FlakyError};
//! use settle::{retry, RetryPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let rpc = Flaky::new(2);
//! let policy = RetryPolicy::quadratic(Duration::from_millis(1));
//!
//! // Fails on attempts 1 and 2, succeeds on attempt 3
//! assert_eq!(retry(|| rpc.call(), &policy).await, Ok(3));
//! assert_eq!(rpc.calls(), 3);
//! # });
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use futures::future::{ready, Ready};

/// A scripted operation that fails a fixed number of times, then succeeds.
///
/// Every call returns the 1-indexed attempt number: wrapped in
/// [`FlakyError`] while failing, as the success value afterwards. Clones
/// share the call counter, so a clone can be moved into an operation while
/// the test keeps the original for assertions.
#[derive(Debug, Clone)]
pub struct Flaky {
    failures: u32,
    calls: Arc<AtomicU32>,
}

/// Error produced by a failing [`Flaky`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlakyError {
    /// The attempt that failed (1-indexed).
    pub attempt: u32,
}

impl std::fmt::Display for FlakyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "scripted failure on attempt {}", self.attempt)
    }
}

impl std::error::Error for FlakyError {}

impl Flaky {
    /// Fail the first `failures` calls, succeed afterwards.
    pub fn new(failures: u32) -> Self {
        Self {
            failures,
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Fail every call.
    pub fn always() -> Self {
        Self::new(u32::MAX)
    }

    /// Number of calls made so far, across all clones.
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Invoke the operation.
    pub fn call(&self) -> Ready<Result<u32, FlakyError>> {
        let attempt = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if attempt <= self.failures {
            ready(Err(FlakyError { attempt }))
        } else {
            ready(Ok(attempt))
        }
    }
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
use crate::RetryPolicy;

#[cfg(feature = "proptest")]
impl Arbitrary for RetryPolicy {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    /// Jitter-free policies with bases up to 1s and up to 10 attempts.
    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            0u64..1_000,
            1u32..=10,
            proptest::option::of(0u64..5_000),
        )
            .prop_map(|(base_ms, max_attempts, max_delay_ms)| {
                let policy =
                    RetryPolicy::quadratic(std::time::Duration::from_millis(base_ms))
                        .with_max_attempts(max_attempts);
                match max_delay_ms {
                    Some(max) => policy.with_max_delay(std::time::Duration::from_millis(max)),
                    None => policy,
                }
            })
            .boxed()
    }
}
