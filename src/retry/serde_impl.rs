//! Serde support for [`RetryPolicy`].
//!
//! Policies travel through config files as flat millisecond fields:
//!
//! ```json
//! { "base_ms": 100, "max_attempts": 5, "max_delay_ms": null, "jitter": { "kind": "none" } }
//! ```
//!
//! `max_attempts` of zero is rejected on deserialization.
//!
//! Durations are stored in whole milliseconds. Anything finer is truncated
//! on serialization, so a policy with a 1.5 ms base comes back with a 1 ms
//! base. Durations too long for a `u64` of milliseconds are written as
//! `u64::MAX`.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{JitterStrategy, RetryPolicy};

#[derive(Serialize, Deserialize)]
struct PolicyRepr {
    base_ms: u64,
    max_attempts: u32,
    #[serde(default)]
    max_delay_ms: Option<u64>,
    #[serde(default)]
    jitter: JitterRepr,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum JitterRepr {
    #[default]
    None,
    Proportional {
        factor: f64,
    },
    Full,
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

impl Serialize for RetryPolicy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let jitter = match self.jitter() {
            JitterStrategy::None => JitterRepr::None,
            JitterStrategy::Proportional(factor) => JitterRepr::Proportional { factor: *factor },
            JitterStrategy::Full => JitterRepr::Full,
        };

        PolicyRepr {
            base_ms: millis(self.base()),
            max_attempts: self.max_attempts(),
            max_delay_ms: self.max_delay().map(millis),
            jitter,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RetryPolicy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = PolicyRepr::deserialize(deserializer)?;

        let mut policy = RetryPolicy::new(Duration::from_millis(repr.base_ms), repr.max_attempts)
            .map_err(serde::de::Error::custom)?;

        if let Some(max) = repr.max_delay_ms {
            policy = policy.with_max_delay(Duration::from_millis(max));
        }

        policy = match repr.jitter {
            JitterRepr::None => policy,
            JitterRepr::Proportional { factor } => policy.with_jitter(factor),
            JitterRepr::Full => policy.with_full_jitter(),
        };

        Ok(policy)
    }
}
