#![allow(dead_code)]

pub mod fake_driver;

use relink::{Backoff, Jitter, ReconnectPolicy};
use std::time::Duration;

/// Linear 100ms steps, no jitter, `attempts` total connect attempts per cycle.
pub fn linear_policy(attempts: usize) -> ReconnectPolicy {
    ReconnectPolicy::builder()
        .backoff(Backoff::linear(Duration::from_millis(100)))
        .with_jitter(Jitter::None)
        .max_attempts(attempts)
        .max_elapsed(None)
        .build()
        .expect("valid policy")
}
