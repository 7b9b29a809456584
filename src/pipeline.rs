//! Fetch on settle: the glue between a debounced input and a retried request.
//!
//! A swap form feeds keystrokes into a [`Debouncer`](crate::Debouncer); every
//! value that settles is turned into a quote request wrapped in
//! [`retry`](fn@crate::retry). When the user keeps typing while a request (or
//! one of its backoff sleeps) is still running, that request is dropped: only
//! the newest settled input is worth rendering.
//!
//! # Example
//!
//! ```rust
//! use futures::StreamExt;
//! use settle::pipeline::fetch_latest;
//! use settle::{Debouncer, RetryPolicy};
//! use std::time::Duration;
//!
//! # tokio_test::block_on(async {
//! let amount = Debouncer::new(10u64, Duration::from_millis(5));
//!
//! let quotes = fetch_latest(
//!     amount.subscribe(),
//!     |lamports| async move { Ok::<_, String>(lamports * 2) },
//!     RetryPolicy::default(),
//! );
//! futures::pin_mut!(quotes);
//!
//! let first = quotes.next().await.unwrap();
//! assert_eq!(first.input, 10);
//! assert_eq!(first.result, Ok(20));
//! # });
//! ```

use std::fmt::Debug;
use std::future::Future;

use futures::stream::{self, Stream};
use tokio::sync::watch;

use crate::retry::{retry, RetryPolicy};

/// The outcome of fetching for one settled input.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T, R, E> {
    /// The settled value the request was made for.
    pub input: T,
    /// The result of the final attempt.
    pub result: Result<R, E>,
}

impl<T, R, E> Fetched<T, R, E> {
    /// Returns true if the fetch eventually succeeded.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

struct Feed<T, F> {
    settled: watch::Receiver<T>,
    fetch: F,
    policy: RetryPolicy,
    started: bool,
}

/// Turn settled values into fetched results, newest input wins.
///
/// The stream yields a [`Fetched`] for the value current at the time of the
/// first poll, then one for every value that settles afterwards. Each fetch
/// runs under [`retry`] with `policy`. If another value settles before a
/// fetch completes, the in-flight fetch is dropped without yielding and the
/// newer value is fetched instead.
///
/// The stream ends once every sender of `settled` is gone.
pub fn fetch_latest<T, R, E, F, Fut>(
    settled: watch::Receiver<T>,
    fetch: F,
    policy: RetryPolicy,
) -> impl Stream<Item = Fetched<T, R, E>>
where
    T: Clone,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<R, E>>,
    E: Debug,
{
    let feed = Feed {
        settled,
        fetch,
        policy,
        started: false,
    };

    stream::unfold(feed, |mut feed| async move {
        if feed.started {
            feed.settled.changed().await.ok()?;
        }
        feed.started = true;

        loop {
            let input = feed.settled.borrow_and_update().clone();

            let outcome = {
                let fetch = &mut feed.fetch;
                let attempt = retry(|| fetch(input.clone()), &feed.policy);

                tokio::select! {
                    biased;
                    changed = feed.settled.changed() => Err(changed.is_ok()),
                    result = attempt => Ok(result),
                }
            };

            match outcome {
                Ok(result) => return Some((Fetched { input, result }, feed)),
                Err(true) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("newer input settled; dropping in-flight fetch");
                    continue;
                }
                Err(false) => return None,
            }
        }
    })
}
