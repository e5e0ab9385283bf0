//! Convenient re-exports for common relink types.
pub use crate::{
    backoff::{Backoff, BackoffError, MAX_BACKOFF},
    classify::{is_retryable, DriverError},
    config::{JitterKind, ReconnectConfig},
    connection::{ResilientConnection, ResilientConnectionBuilder},
    driver::{Connection, Driver},
    jitter::Jitter,
    policy::{BackoffPolicy, BuildError, ReconnectPolicy},
    presets, CancellationToken, ReconnectError,
};
