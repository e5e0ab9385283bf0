#![forbid(unsafe_code)]
#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::all))]

//! # relink
//!
//! A self-healing proxy for a single database connection.
//!
//! [`ResilientConnection`] wraps one physical connection opened through a [`Driver`]. Before
//! every call it makes sure a live handle exists; when a call fails because the connection was
//! lost it reconnects under a backoff policy and re-issues the call exactly once.
//!
//! ## Features
//!
//! - **Reconnect with backoff**: exponential, linear, or constant curves with jitter, attempt
//!   caps, and an elapsed-time budget
//! - **Single retry per call** for `query`, `exec`, and `ping`; logical errors pass through
//!   unchanged
//! - **Cancellation** via [`CancellationToken`], honored during connects, waits, and calls
//! - **Pluggable classification** through [`DriverError`] or a custom predicate
//! - **Structured logging** with `tracing`; passwords in targets are masked
//!
//! ## Quick Start
//!
//! ```rust
//! use relink::{presets, Connection, Driver, ResilientConnection};
//! use relink::CancellationToken;
//! use async_trait::async_trait;
//! use std::io;
//!
//! struct Echo;
//! struct EchoConn;
//!
//! #[async_trait]
//! impl Driver for Echo {
//!     type Conn = EchoConn;
//!     async fn connect(&self, _target: &str) -> Result<EchoConn, io::Error> {
//!         Ok(EchoConn)
//!     }
//! }
//!
//! #[async_trait]
//! impl Connection for EchoConn {
//!     type Error = io::Error;
//!     type Value = String;
//!     type Rows = Vec<String>;
//!     type Row = Option<String>;
//!     type Outcome = u64;
//!
//!     async fn query(&mut self, sql: &str, _args: &[String]) -> io::Result<Vec<String>> {
//!         Ok(vec![sql.to_string()])
//!     }
//!     async fn query_row(&mut self, sql: &str, _args: &[String]) -> Option<String> {
//!         Some(sql.to_string())
//!     }
//!     async fn exec(&mut self, _sql: &str, _args: &[String]) -> io::Result<u64> {
//!         Ok(1)
//!     }
//!     async fn ping(&mut self) -> io::Result<()> {
//!         Ok(())
//!     }
//!     async fn close(&mut self) -> io::Result<()> {
//!         Ok(())
//!     }
//!     fn is_closed(&self) -> bool {
//!         false
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), relink::ReconnectError<io::Error>> {
//!     let cancel = CancellationToken::new();
//!     let mut conn = ResilientConnection::builder(Echo, "postgres://app@localhost/app")
//!         .policy(presets::default_policy())
//!         .connect(&cancel)
//!         .await?;
//!
//!     let rows = conn.query(&cancel, "SELECT 1", &[]).await?;
//!     assert_eq!(rows, vec!["SELECT 1".to_string()]);
//!     conn.close(&cancel).await
//! }
//! ```

pub mod backoff;
pub mod classify;
pub mod clock;
pub mod config;
pub mod connection;
pub mod driver;
pub mod error;
pub mod jitter;
pub mod policy;
pub mod prelude;
pub mod presets;
pub mod retry;
pub mod sleeper;

// Re-exports
pub use backoff::{Backoff, BackoffError};
pub use classify::{is_retryable, DriverError};
pub use clock::{Clock, MonotonicClock};
pub use config::{ConfigError, ReconnectConfig};
pub use connection::{Classifier, ResilientConnection, ResilientConnectionBuilder};
pub use driver::{Connection, Driver};
pub use error::ReconnectError;
pub use jitter::Jitter;
pub use policy::{BackoffPolicy, BuildError, ReconnectPolicy, ReconnectPolicyBuilder};
pub use retry::{Failure, RetryError};
pub use sleeper::{InstantSleeper, Sleeper, TokioSleeper, TrackingSleeper};
pub use tokio_util::sync::CancellationToken;
