//! Property-based tests for the pure retry and debounce cores.

use proptest::prelude::*;
use settle::{Debounce, RetryPolicy};
use std::time::{Duration, Instant};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

proptest! {
    #[test]
    fn delay_grows_with_square_of_attempt(attempt in 1u32..50) {
        let policy = RetryPolicy::default().with_max_attempts(100);
        let expected = ms(100 * u64::from(attempt) * u64::from(attempt));

        prop_assert_eq!(policy.delay_for_attempt(attempt), Some(expected));
    }

    #[test]
    fn bound_limits_number_of_delays(max_attempts in 1u32..20) {
        let policy = RetryPolicy::default().with_max_attempts(max_attempts);

        prop_assert_eq!(policy.delays().count() as u32, max_attempts - 1);
        prop_assert_eq!(policy.delay_for_attempt(max_attempts), None);
    }

    #[test]
    fn delays_are_non_decreasing(
        base_ms in 0u64..1_000,
        max_attempts in 1u32..20,
        cap in proptest::option::of(0u64..10_000),
    ) {
        let mut policy = RetryPolicy::quadratic(ms(base_ms)).with_max_attempts(max_attempts);
        if let Some(cap) = cap {
            policy = policy.with_max_delay(ms(cap));
        }

        let delays: Vec<_> = policy.delays().collect();
        for pair in delays.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        if let Some(cap) = cap {
            prop_assert!(delays.iter().all(|d| *d <= ms(cap)));
        }
    }

    /// Any burst of changes closer together than the quiet period settles
    /// exactly once, on the last value, one quiet period after it.
    #[test]
    fn burst_settles_once_on_last_value(
        gaps in proptest::collection::vec(0u64..500, 1..20),
        quiet_ms in 500u64..2_000,
    ) {
        let t0 = Instant::now();
        let mut tracker = Debounce::new(0usize, ms(quiet_ms));

        let mut now = t0;
        let mut last = 0;
        for (i, gap) in gaps.iter().enumerate() {
            now += ms(*gap);
            prop_assert_eq!(tracker.poll(now), None);
            tracker.update(i + 1, now);
            last = i + 1;
        }

        prop_assert_eq!(tracker.poll(now + ms(quiet_ms) - ms(1)), None);
        prop_assert_eq!(tracker.poll(now + ms(quiet_ms)), Some(&last));
        prop_assert_eq!(tracker.poll(now + ms(quiet_ms * 10)), None);
    }

    /// The settled value only ever takes values the source actually had, and
    /// always catches up once the source goes quiet.
    #[test]
    fn settled_value_converges_to_source(
        steps in proptest::collection::vec((0u64..1_000, 0u8..4), 1..40),
    ) {
        let quiet = ms(300);
        let t0 = Instant::now();
        let mut tracker = Debounce::new(0u8, quiet);
        let mut history = vec![0u8];

        let mut now = t0;
        for (gap, value) in &steps {
            now += ms(*gap);
            tracker.poll(now);
            tracker.update(*value, now);
            history.push(*value);
            prop_assert!(history.contains(tracker.settled()));
        }

        tracker.poll(now + quiet);
        prop_assert_eq!(tracker.settled(), history.last().unwrap());
        prop_assert!(tracker.is_settled());
    }
}

#[test]
fn default_policy_matches_documented_schedule() {
    let delays: Vec<_> = RetryPolicy::default().delays().collect();
    assert_eq!(delays, vec![ms(100), ms(400), ms(900), ms(1600)]);
}
