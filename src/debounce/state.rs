//! The pure debounce state machine.

use std::time::{Duration, Instant};

/// Default quiet period used for keystroke-driven inputs.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Tracks a rapidly changing source value and exposes it only once it has
/// stayed unchanged for a quiet period.
///
/// `Debounce` never reads a clock. Callers pass the current time to
/// [`update`](Debounce::update) and [`poll`](Debounce::poll), which keeps the
/// state machine deterministic and trivially testable. The async
/// [`Debouncer`](super::Debouncer) drives it from tokio timers.
///
/// The first value is settled immediately; only later changes are delayed.
///
/// # Example
///
/// ```rust
/// use settle::Debounce;
/// use std::time::{Duration, Instant};
///
/// let t0 = Instant::now();
/// let ms = Duration::from_millis;
///
/// let mut amount = Debounce::new(1, ms(500));
/// assert_eq!(*amount.settled(), 1);
///
/// amount.update(2, t0 + ms(100));
/// assert_eq!(amount.poll(t0 + ms(599)), None);
/// assert_eq!(amount.poll(t0 + ms(600)), Some(&2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Debounce<T> {
    settled: T,
    pending: Option<Pending<T>>,
    quiet: Duration,
}

#[derive(Debug, Clone, PartialEq)]
struct Pending<T> {
    value: T,
    // None when the quiet period runs past the end of representable time.
    deadline: Option<Instant>,
}

impl<T> Debounce<T> {
    /// Start tracking with `initial` already settled.
    pub fn new(initial: T, quiet: Duration) -> Self {
        Self {
            settled: initial,
            pending: None,
            quiet,
        }
    }

    /// The quiet period a value must survive before it settles.
    pub fn quiet_period(&self) -> Duration {
        self.quiet
    }

    /// The most recently settled value.
    pub fn settled(&self) -> &T {
        &self.settled
    }

    /// The value waiting for its quiet period to elapse, if any.
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }

    /// When the pending value settles, if there is one.
    ///
    /// A pending value whose deadline overflows `Instant` has none: it
    /// waits until it is replaced or cancelled.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().and_then(|p| p.deadline)
    }

    /// Returns true when no update is waiting.
    pub fn is_settled(&self) -> bool {
        self.pending.is_none()
    }

    /// Settle the pending value if its deadline has passed.
    ///
    /// Returns the newly settled value, or `None` when nothing changed.
    pub fn poll(&mut self, now: Instant) -> Option<&T> {
        match self.pending.take() {
            Some(pending) if pending.deadline.is_some_and(|d| d <= now) => {
                self.settled = pending.value;
                Some(&self.settled)
            }
            still_waiting => {
                self.pending = still_waiting;
                None
            }
        }
    }

    /// Drop the pending update, returning its value.
    ///
    /// The settled value is left untouched.
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    /// Consume the tracker, returning the settled value.
    ///
    /// A pending value is discarded.
    pub fn into_settled(self) -> T {
        self.settled
    }
}

impl<T: PartialEq> Debounce<T> {
    /// Feed a new source value observed at `now`.
    ///
    /// A value equal to the latest source value (the pending one, or the
    /// settled one when nothing is pending) is not a change: the running
    /// timer keeps its deadline and `None` is returned.
    ///
    /// Any other value replaces the pending one and restarts the quiet
    /// period. The new deadline is returned. If `now + quiet` overflows,
    /// the value is still pending but never settles on its own, and `None`
    /// is returned since there is no deadline to wait for.
    ///
    /// # Example
    ///
    /// ```rust
    /// use settle::Debounce;
    /// use std::time::{Duration, Instant};
    ///
    /// let t0 = Instant::now();
    /// let ms = Duration::from_millis;
    /// let mut query = Debounce::new("", ms(300));
    ///
    /// assert_eq!(query.update("b", t0), Some(t0 + ms(300)));
    /// assert_eq!(query.update("bo", t0 + ms(100)), Some(t0 + ms(400)));
    ///
    /// // Same value again: the timer is not restarted
    /// assert_eq!(query.update("bo", t0 + ms(200)), None);
    /// assert_eq!(query.deadline(), Some(t0 + ms(400)));
    /// ```
    pub fn update(&mut self, value: T, now: Instant) -> Option<Instant> {
        let latest = self.pending().unwrap_or(&self.settled);
        if *latest == value {
            return None;
        }

        let deadline = now.checked_add(self.quiet);
        self.pending = Some(Pending { value, deadline });
        deadline
    }
}

impl<T: Default> Default for Debounce<T> {
    fn default() -> Self {
        Self::new(T::default(), DEFAULT_QUIET_PERIOD)
    }
}
