//! Debounced values.
//!
//! A debounced value trails a rapidly changing source and only moves once the
//! source has been unchanged for a *quiet period*. Typing `1`, `12`, `125`
//! into a swap amount field within half a second produces a single settled
//! value, `125`, and therefore a single quote request.
//!
//! - [`Debounce`] is the pure state machine. Time is an argument, never read
//!   from a clock.
//! - [`Debouncer`] (behind the `async` feature) drives a `Debounce` from the
//!   tokio timer and publishes settled values through a `watch` channel.
//!
//! # Example
//!
//! ```rust
//! use settle::Debounce;
//! use std::time::{Duration, Instant};
//!
//! let t0 = Instant::now();
//! let ms = Duration::from_millis;
//! let mut amount = Debounce::new(0, ms(500));
//!
//! amount.update(1, t0);
//! amount.update(12, t0 + ms(80));
//! amount.update(125, t0 + ms(150));
//!
//! assert_eq!(amount.poll(t0 + ms(600)), None);
//! assert_eq!(amount.poll(t0 + ms(650)), Some(&125));
//! ```

mod state;
#[cfg(feature = "async")]
mod tracker;

pub use state::{Debounce, DEFAULT_QUIET_PERIOD};
#[cfg(feature = "async")]
pub use tracker::Debouncer;
