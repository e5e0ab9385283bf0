//! Plain-data reconnect configuration.
//!
//! [`ReconnectConfig`] mirrors the knobs of [`ReconnectPolicy`] in a form that can live in an
//! application's config file. With the `serde` feature it deserializes from any serde format;
//! missing fields fall back to the library defaults.
//!
//! ```rust
//! use relink::config::{JitterKind, ReconnectConfig};
//!
//! let config = ReconnectConfig {
//!     initial_interval_ms: 100,
//!     max_attempts: Some(5),
//!     jitter: JitterKind::None,
//!     ..ReconnectConfig::default()
//! };
//! let policy = config.into_policy().unwrap();
//! assert_eq!(policy.max_attempts(), Some(5));
//! ```

use crate::backoff::BackoffError;
use crate::policy::BuildError;
use crate::{presets, Backoff, Jitter, ReconnectPolicy};
use std::time::Duration;

/// Errors converting a [`ReconnectConfig`] into a policy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid backoff: {0}")]
    Backoff(#[from] BackoffError),
    #[error("invalid policy: {0}")]
    Policy(#[from] BuildError),
    /// A zero first wait turns a cycle against a down target into a busy loop.
    #[error("initial_interval_ms must be greater than zero")]
    ZeroInitialInterval,
}

/// Jitter selector for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum JitterKind {
    None,
    Full,
    #[default]
    Equal,
}

impl From<JitterKind> for Jitter {
    fn from(kind: JitterKind) -> Self {
        match kind {
            JitterKind::None => Jitter::None,
            JitterKind::Full => Jitter::Full,
            JitterKind::Equal => Jitter::Equal,
        }
    }
}

/// Exponential reconnect policy expressed in plain numbers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReconnectConfig {
    /// Wait before the first retry.
    pub initial_interval_ms: u64,
    /// Growth factor per retry.
    pub multiplier: f64,
    /// Cap per wait; `None` lets waits grow to the one-day ceiling.
    pub max_interval_ms: Option<u64>,
    pub jitter: JitterKind,
    /// Total connect attempts per cycle; `None` is unbounded.
    pub max_attempts: Option<usize>,
    /// Time budget per cycle; `None` is unbounded.
    pub max_elapsed_ms: Option<u64>,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            initial_interval_ms: presets::DEFAULT_INITIAL_INTERVAL.as_millis() as u64,
            multiplier: presets::DEFAULT_MULTIPLIER,
            max_interval_ms: Some(presets::DEFAULT_MAX_INTERVAL.as_millis() as u64),
            jitter: JitterKind::default(),
            max_attempts: None,
            max_elapsed_ms: Some(presets::DEFAULT_MAX_ELAPSED.as_millis() as u64),
        }
    }
}

impl ReconnectConfig {
    /// Validate and build the policy.
    pub fn into_policy(self) -> Result<ReconnectPolicy, ConfigError> {
        if self.initial_interval_ms == 0 {
            return Err(ConfigError::ZeroInitialInterval);
        }
        let mut backoff = Backoff::exponential(Duration::from_millis(self.initial_interval_ms))
            .with_multiplier(self.multiplier)?;
        if let Some(max) = self.max_interval_ms {
            backoff = backoff.with_max(Duration::from_millis(max))?;
        }
        let builder = ReconnectPolicy::builder()
            .backoff(backoff)
            .with_jitter(self.jitter.into())
            .max_elapsed(self.max_elapsed_ms.map(Duration::from_millis));
        let builder = match self.max_attempts {
            Some(attempts) => builder.max_attempts(attempts),
            None => builder.unbounded_attempts(),
        };
        Ok(builder.build()?)
    }
}
