//! Tokio-driven debouncer.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use super::Debounce;

/// A debounced value driven by the tokio timer.
///
/// Call [`set`](Debouncer::set) on every change of the source (every
/// keystroke, every slider tick). The settled value is published through a
/// [`watch`] channel once the source has been quiet for the configured
/// period, so consumers can `await` changes instead of polling.
///
/// The debouncer owns at most one timer task. A change aborts the previous
/// timer and arms a new one; dropping the debouncer aborts whatever timer is
/// still pending, so a discarded input never publishes.
///
/// # Example
///
/// ```rust
/// use settle::Debouncer;
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let mut amount = Debouncer::new(0u64, Duration::from_millis(20));
/// let mut settled = amount.subscribe();
///
/// amount.set(1);
/// amount.set(12);
/// amount.set(125);
///
/// settled.changed().await.unwrap();
/// assert_eq!(*settled.borrow(), 125);
/// # });
/// ```
#[derive(Debug)]
pub struct Debouncer<T> {
    state: Arc<Mutex<Debounce<T>>>,
    settled: Arc<watch::Sender<T>>,
    timer: Option<JoinHandle<()>>,
}

impl<T> Debouncer<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    /// Create a debouncer whose settled value starts as `initial`.
    ///
    /// No runtime is needed until the first call to [`set`](Debouncer::set).
    pub fn new(initial: T, quiet: Duration) -> Self {
        let (settled, _) = watch::channel(initial.clone());
        Self {
            state: Arc::new(Mutex::new(Debounce::new(initial, quiet))),
            settled: Arc::new(settled),
            timer: None,
        }
    }

    /// Feed the latest source value.
    ///
    /// A value equal to the latest one is ignored and the running timer keeps
    /// its deadline. Anything else cancels the pending update and starts a
    /// new quiet period. A quiet period too long to schedule leaves the value
    /// pending until the next change or [`cancel`](Debouncer::cancel).
    ///
    /// # Panics
    ///
    /// Panics when called outside of a tokio runtime, as the timer is a
    /// spawned task.
    pub fn set(&mut self, value: T) {
        let (armed, schedulable) = {
            let mut state = lock(&self.state);
            let armed = state.update(value, Instant::now().into_std());
            (armed, state.deadline().is_some())
        };

        // Nothing left that a timer could settle.
        if !schedulable {
            self.abort_timer();
        }
        let deadline = match armed {
            Some(deadline) => Instant::from_std(deadline),
            None => return,
        };

        self.abort_timer();

        #[cfg(feature = "tracing")]
        tracing::trace!(deadline = ?deadline, "debounce timer armed");

        let state = Arc::clone(&self.state);
        let settled = Arc::clone(&self.settled);
        self.timer = Some(tokio::spawn(async move {
            sleep_until(deadline).await;

            let mut state = lock(&state);
            // A superseding update carries a later or equal deadline, so
            // polling at ours never settles it early.
            if let Some(value) = state.poll(deadline.into_std()) {
                let value = value.clone();
                settled.send_if_modified(|current| {
                    if *current == value {
                        return false;
                    }
                    *current = value;
                    true
                });

                #[cfg(feature = "tracing")]
                tracing::trace!("debounced value settled");
            }
        }));
    }

    /// The most recently settled value.
    pub fn get(&self) -> T {
        self.settled.borrow().clone()
    }

    /// Subscribe to settled values.
    ///
    /// The receiver's current value is the settled one; `changed()` resolves
    /// whenever a different value settles, and fails once the debouncer is
    /// dropped.
    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.settled.subscribe()
    }

    /// Returns true while an update is waiting for its quiet period.
    pub fn is_pending(&self) -> bool {
        !lock(&self.state).is_settled()
    }

    /// The configured quiet period.
    pub fn quiet_period(&self) -> Duration {
        lock(&self.state).quiet_period()
    }

    /// Cancel the pending update, if any. The settled value is kept.
    pub fn cancel(&mut self) {
        self.abort_timer();
        lock(&self.state).cancel();
    }
}

impl<T> Debouncer<T> {
    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.abort_timer();
    }
}

// Debounce has no invariants that a panic could leave half-updated.
fn lock<T>(state: &Mutex<Debounce<T>>) -> MutexGuard<'_, Debounce<T>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
