//! Jitter strategies that spread reconnect attempts out in time.
//!
//! When many clients lose the same database at once, identical backoff curves make them all
//! reconnect in lockstep. Jitter randomizes each wait:
//! - `None`: deterministic waits, mostly for tests.
//! - `Full`: uniform in `[0, delay]`.
//! - `Equal`: uniform in `[delay/2, delay]`, keeps a floor.
//! - `Decorrelated`: AWS-style, grows from the previous wait. Stateful; the owning policy calls
//!   [`Jitter::reset`] at the start of every reconnect cycle.
//!
//! RNG: `rand`'s thread-local RNG by default; inject a seeded RNG with [`Jitter::apply_with_rng`].

use rand::{rng, Rng};
use std::time::Duration;

/// Bounds and memory for decorrelated jitter; fields are private to enforce validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorrelatedConfig {
    base: Duration,
    max: Duration,
    previous: Duration,
}

/// Jitter strategy applied to each backoff delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Jitter {
    None,
    Full,
    Equal,
    Decorrelated(DecorrelatedConfig),
}

impl Jitter {
    pub fn full() -> Self {
        Jitter::Full
    }

    pub fn equal() -> Self {
        Jitter::Equal
    }

    /// Decorrelated jitter bounded by `[base, max]`.
    pub fn decorrelated(base: Duration, max: Duration) -> Result<Self, &'static str> {
        if base > max {
            return Err("decorrelated jitter: base must not exceed max");
        }
        Ok(Jitter::Decorrelated(DecorrelatedConfig { base, max, previous: base }))
    }

    /// Forget the previous wait so a new reconnect cycle starts from `base` again.
    pub fn reset(&mut self) {
        if let Jitter::Decorrelated(config) = self {
            config.previous = config.base;
        }
    }

    /// Randomize `delay` using the thread-local RNG.
    pub fn apply(&mut self, delay: Duration) -> Duration {
        let mut rng = rng();
        self.apply_with_rng(delay, &mut rng)
    }

    /// Randomize `delay` with a caller-provided RNG.
    pub fn apply_with_rng<R: Rng>(&mut self, delay: Duration, rng: &mut R) -> Duration {
        match self {
            Jitter::None => delay,
            Jitter::Full => {
                let millis = as_millis_saturated(delay);
                if millis == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rng.random_range(0..=millis))
            }
            Jitter::Equal => {
                let millis = as_millis_saturated(delay);
                if millis == 0 {
                    return Duration::ZERO;
                }
                Duration::from_millis(rng.random_range(millis / 2..=millis))
            }
            Jitter::Decorrelated(config) => {
                // sleep = min(max, random(base, previous * 3))
                let base = as_millis_saturated(config.base);
                let upper = as_millis_saturated(config.previous)
                    .saturating_mul(3)
                    .min(as_millis_saturated(config.max));
                let lower = base.min(upper);
                config.previous = Duration::from_millis(rng.random_range(lower..=upper));
                config.previous
            }
        }
    }
}

fn as_millis_saturated(duration: Duration) -> u64 {
    duration.as_millis().try_into().unwrap_or(u64::MAX)
}
