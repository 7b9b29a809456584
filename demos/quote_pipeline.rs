//! Simulates a swap form: keystrokes are debounced, each settled amount is
//! quoted through a flaky endpoint with backoff retries.
//!
//! Run with: cargo run --example quote_pipeline --features tracing

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use settle::pipeline::fetch_latest;
use settle::{Debouncer, RetryPolicy};
use tokio::time::sleep;

const LAMPORTS_PER_TOKEN: u64 = 100_000;

#[derive(Debug)]
enum QuoteError {
    RateLimited,
}

/// Every third request is rate limited.
async fn quote(amount: u64, requests: Arc<AtomicU32>) -> Result<u64, QuoteError> {
    let n = requests.fetch_add(1, Ordering::SeqCst) + 1;
    sleep(Duration::from_millis(40)).await;

    if n % 3 == 0 {
        tracing::info!(amount, "quote endpoint rate limited request #{}", n);
        Err(QuoteError::RateLimited)
    } else {
        Ok(amount * LAMPORTS_PER_TOKEN)
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let mut amount = Debouncer::new(0u64, Duration::from_millis(500));
    let requests = Arc::new(AtomicU32::new(0));

    let quotes = fetch_latest(
        amount.subscribe(),
        {
            let requests = Arc::clone(&requests);
            move |tokens| quote(tokens, Arc::clone(&requests))
        },
        RetryPolicy::default(),
    );

    let renderer = tokio::spawn(async move {
        futures::pin_mut!(quotes);
        while let Some(fetched) = quotes.next().await {
            match fetched.result {
                Ok(out) => tracing::info!("{} tokens -> {} lamports", fetched.input, out),
                Err(e) => tracing::error!("no quote for {}: {:?}", fetched.input, e),
            }
        }
    });

    // Typing "125", pausing, then correcting it to "12".
    for keystroke in [1, 12, 125] {
        tracing::info!("keystroke: {}", keystroke);
        amount.set(keystroke);
        sleep(Duration::from_millis(120)).await;
    }
    sleep(Duration::from_secs(2)).await;

    tracing::info!("keystroke: 12");
    amount.set(12);
    sleep(Duration::from_secs(2)).await;

    drop(amount);
    let _ = renderer.await;

    tracing::info!(
        "{} quote requests sent",
        requests.load(Ordering::SeqCst)
    );
}
