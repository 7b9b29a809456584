//! End-to-end tests for the debounce → retry → result pipeline.

#![cfg(feature = "async")]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use settle::pipeline::{fetch_latest, Fetched};
use settle::testing::{Flaky, FlakyError};
use settle::{Debouncer, RetryPolicy};
use tokio::time::{sleep, sleep_until, Instant};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// A quote endpoint that answers `amount * 2` after `latency`.
#[derive(Clone)]
struct QuoteApi {
    latency: Duration,
    requests: Arc<Mutex<Vec<u64>>>,
}

impl QuoteApi {
    fn new(latency: Duration) -> Self {
        Self {
            latency,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn quote(&self, amount: u64) -> impl std::future::Future<Output = Result<u64, String>> {
        self.requests.lock().unwrap().push(amount);
        let latency = self.latency;
        async move {
            sleep(latency).await;
            Ok(amount * 2)
        }
    }

    fn requests(&self) -> Vec<u64> {
        self.requests.lock().unwrap().clone()
    }
}

#[tokio::test(start_paused = true)]
async fn fetches_initial_value_immediately() {
    let amount = Debouncer::new(5u64, ms(500));
    let api = QuoteApi::new(ms(10));
    let start = Instant::now();

    let quotes = fetch_latest(
        amount.subscribe(),
        |value| api.quote(value),
        RetryPolicy::default(),
    );
    futures::pin_mut!(quotes);

    let first = quotes.next().await.unwrap();
    assert_eq!(
        first,
        Fetched {
            input: 5,
            result: Ok(10)
        }
    );
    assert_eq!(start.elapsed(), ms(10));
}

#[tokio::test(start_paused = true)]
async fn fetches_each_settled_value_once() {
    let start = Instant::now();
    let mut amount = Debouncer::new(1u64, ms(500));
    let api = QuoteApi::new(ms(10));

    let quotes = fetch_latest(
        amount.subscribe(),
        {
            let api = api.clone();
            move |value| api.quote(value)
        },
        RetryPolicy::default(),
    );

    let consumer = tokio::spawn(async move {
        quotes
            .map(|fetched| (start.elapsed(), fetched.input, fetched.result))
            .collect::<Vec<_>>()
            .await
    });

    sleep(ms(100)).await;
    amount.set(2);
    sleep_until(start + ms(700)).await;
    amount.set(3);
    sleep_until(start + ms(2000)).await;
    drop(amount);

    let seen = consumer.await.unwrap();
    assert_eq!(
        seen,
        vec![
            (ms(10), 1, Ok(2)),
            (ms(610), 2, Ok(4)),
            (ms(1210), 3, Ok(6)),
        ]
    );
    assert_eq!(api.requests(), vec![1, 2, 3]);
}

#[tokio::test(start_paused = true)]
async fn newer_settled_value_supersedes_in_flight_fetch() {
    let start = Instant::now();
    let mut amount = Debouncer::new(1u64, ms(500));
    let api = QuoteApi::new(ms(1000));

    let quotes = fetch_latest(
        amount.subscribe(),
        {
            let api = api.clone();
            move |value| api.quote(value)
        },
        RetryPolicy::default(),
    );

    let consumer = tokio::spawn(async move {
        quotes
            .map(|fetched| (start.elapsed(), fetched.input, fetched.result))
            .collect::<Vec<_>>()
            .await
    });

    sleep(ms(100)).await;
    amount.set(2);
    sleep_until(start + ms(3000)).await;
    drop(amount);

    // The fetch for 1 would have finished at t=1000, but 2 settled at t=600.
    let seen = consumer.await.unwrap();
    assert_eq!(seen, vec![(ms(1600), 2, Ok(4))]);
    assert_eq!(api.requests(), vec![1, 2]);
}

#[tokio::test(start_paused = true)]
async fn failed_fetches_are_retried_with_backoff() {
    let amount = Debouncer::new(7u64, ms(500));
    let flaky = Flaky::new(2);
    let start = Instant::now();

    let quotes = fetch_latest(
        amount.subscribe(),
        |_| flaky.call(),
        RetryPolicy::default(),
    );
    futures::pin_mut!(quotes);

    let first = quotes.next().await.unwrap();
    assert_eq!(first.input, 7);
    assert_eq!(first.result, Ok(3));
    assert_eq!(flaky.calls(), 3);
    assert_eq!(start.elapsed(), ms(500));
}

#[tokio::test(start_paused = true)]
async fn exhausted_fetch_reports_final_error() {
    let amount = Debouncer::new(7u64, ms(500));
    let flaky = Flaky::always();

    let quotes = fetch_latest(
        amount.subscribe(),
        |_| flaky.call(),
        RetryPolicy::default().with_max_attempts(3),
    );
    futures::pin_mut!(quotes);

    let first = quotes.next().await.unwrap();
    assert!(!first.is_ok());
    assert_eq!(first.result, Err(FlakyError { attempt: 3 }));
}

#[tokio::test(start_paused = true)]
async fn stream_ends_when_debouncer_is_dropped() {
    let amount = Debouncer::new(1u64, ms(500));
    let calls = Arc::new(AtomicU32::new(0));

    let quotes = fetch_latest(
        amount.subscribe(),
        {
            let calls = Arc::clone(&calls);
            move |value: u64| {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<_, String>(value) }
            }
        },
        RetryPolicy::default(),
    );
    futures::pin_mut!(quotes);

    assert!(quotes.next().await.is_some());
    drop(amount);
    assert!(quotes.next().await.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
