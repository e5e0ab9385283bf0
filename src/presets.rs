//! Ready-made reconnect policies.
//!
//! [`default_policy`] is what a [`ResilientConnection`](crate::ResilientConnection) installs when
//! the caller configures none. It is produced fresh on every call; there is no process-wide
//! default to mutate.
//!
//! | preset | first wait | growth | cap per wait | attempts | elapsed budget |
//! |--------|-----------:|-------:|-------------:|---------:|---------------:|
//! | [`default_policy`] | 500ms | x1.5 | 60s | unbounded | 15 min |
//! | [`fail_fast`] | - | - | - | 1 | - |
//! | [`patient`] | 1s | x2 | 5 min | unbounded | none |
//! | [`bounded`] | `interval` | constant | - | `attempts` | none |

use crate::{Backoff, Jitter, ReconnectPolicy};
use std::time::Duration;

pub const DEFAULT_INITIAL_INTERVAL: Duration = Duration::from_millis(500);
pub const DEFAULT_MULTIPLIER: f64 = 1.5;
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_ELAPSED: Duration = Duration::from_secs(15 * 60);

const PATIENT_INITIAL_INTERVAL: Duration = Duration::from_secs(1);
const PATIENT_MAX_INTERVAL: Duration = Duration::from_secs(5 * 60);

pub(crate) fn default_backoff() -> Backoff {
    Backoff::exponential_capped(DEFAULT_INITIAL_INTERVAL, DEFAULT_MULTIPLIER, DEFAULT_MAX_INTERVAL)
}

/// Exponential backoff from 500ms (x1.5, equal jitter, 60s cap per wait) with no attempt limit;
/// a cycle gives up after 15 minutes.
pub fn default_policy() -> ReconnectPolicy {
    ReconnectPolicy::from_parts(default_backoff(), Jitter::equal(), None, Some(DEFAULT_MAX_ELAPSED))
}

/// A single connect attempt per cycle; any failure ends the cycle.
pub fn fail_fast() -> ReconnectPolicy {
    ReconnectPolicy::from_parts(Backoff::constant(Duration::ZERO), Jitter::None, Some(1), None)
}

/// Keeps trying forever, backing off to one attempt every five minutes.
pub fn patient() -> ReconnectPolicy {
    ReconnectPolicy::from_parts(
        Backoff::exponential_capped(PATIENT_INITIAL_INTERVAL, 2.0, PATIENT_MAX_INTERVAL),
        Jitter::full(),
        None,
        None,
    )
}

/// `attempts` total attempts spaced by a constant `interval`, no jitter. `attempts` of zero is
/// treated as one.
pub fn bounded(attempts: usize, interval: Duration) -> ReconnectPolicy {
    ReconnectPolicy::from_parts(Backoff::constant(interval), Jitter::None, Some(attempts.max(1)), None)
}
