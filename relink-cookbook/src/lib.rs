//! Ready-to-use reconnect recipes ("cookbook") for relink.
//! Each recipe returns a [`ReconnectPolicy`] you hand to
//! [`ResilientConnectionBuilder::policy`](relink::ResilientConnectionBuilder::policy).
//!
//! **Ladder:**
//! - Simple: [`startup_probe`]
//! - Intermediate: [`interactive`]
//! - Advanced: [`background_worker`]
//!
//! [`MemoryDriver`] is a toy in-process driver with switches for outages; the demos use it.

use async_trait::async_trait;
use relink::{Backoff, BuildError, Connection, Driver, DriverError, Jitter, ReconnectPolicy};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Wait for a dependency at process start: `attempts` tries one second apart.
pub fn startup_probe(attempts: usize) -> ReconnectPolicy {
    relink::presets::bounded(attempts, Duration::from_secs(1))
}

/// Request path: give up within a few seconds so callers see the failure quickly.
pub fn interactive() -> Result<ReconnectPolicy, Box<dyn std::error::Error>> {
    let backoff = Backoff::exponential(Duration::from_millis(50)).with_max(Duration::from_secs(1))?;
    Ok(ReconnectPolicy::builder()
        .backoff(backoff)
        .with_jitter(Jitter::full())
        .max_attempts(4)
        .max_elapsed(Some(Duration::from_secs(5)))
        .build()?)
}

/// Long-running worker: never give up, spread reconnect storms with decorrelated jitter.
pub fn background_worker() -> Result<ReconnectPolicy, Box<dyn std::error::Error>> {
    let jitter = Jitter::decorrelated(Duration::from_millis(200), Duration::from_secs(30))?;
    let policy: Result<_, BuildError> = ReconnectPolicy::builder()
        .backoff(Backoff::exponential(Duration::from_millis(200)).with_max(Duration::from_secs(30))?)
        .with_jitter(jitter)
        .unbounded_attempts()
        .max_elapsed(None)
        .build();
    Ok(policy?)
}

/// Errors raised by [`MemoryDriver`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("connect: connection refused")]
    Refused,
    #[error("conn closed")]
    ConnClosed,
    #[error("ERROR: syntax error at or near \"{0}\"")]
    Syntax(String),
}

impl DriverError for MemoryError {
    fn is_connect_error(&self) -> bool {
        matches!(self, MemoryError::Refused)
    }
}

#[derive(Debug, Default)]
struct Shared {
    down: bool,
    generation: u64,
    connects: usize,
    rows: Vec<String>,
}

/// In-process "database" holding a list of strings. `INSERT` appends, anything starting with
/// `SELECT` reads everything back.
#[derive(Debug, Clone, Default)]
pub struct MemoryDriver {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Refuse new connections until [`MemoryDriver::set_down`] is called with `false`.
    pub fn set_down(&self, down: bool) {
        tracing::info!(down, "memory driver availability changed");
        self.shared().down = down;
    }

    /// Sever every open connection. Each one notices on its next call.
    pub fn drop_connections(&self) {
        self.shared().generation += 1;
    }

    /// Connect attempts so far.
    pub fn connects(&self) -> usize {
        self.shared().connects
    }
}

#[async_trait]
impl Driver for MemoryDriver {
    type Conn = MemoryConn;

    async fn connect(&self, _target: &str) -> Result<MemoryConn, MemoryError> {
        let mut shared = self.shared();
        shared.connects += 1;
        if shared.down {
            return Err(MemoryError::Refused);
        }
        Ok(MemoryConn { generation: shared.generation, closed: false, shared: self.shared.clone() })
    }
}

#[derive(Debug)]
pub struct MemoryConn {
    generation: u64,
    closed: bool,
    shared: Arc<Mutex<Shared>>,
}

impl MemoryConn {
    fn session(&mut self) -> Result<MutexGuard<'_, Shared>, MemoryError> {
        if self.closed {
            return Err(MemoryError::ConnClosed);
        }
        let shared = self.shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if shared.generation != self.generation {
            self.closed = true;
            return Err(MemoryError::ConnClosed);
        }
        Ok(shared)
    }
}

#[async_trait]
impl Connection for MemoryConn {
    type Error = MemoryError;
    type Value = String;
    type Rows = Vec<String>;
    type Row = Option<String>;
    type Outcome = u64;

    async fn query(&mut self, sql: &str, _args: &[String]) -> Result<Vec<String>, MemoryError> {
        let shared = self.session()?;
        if !sql.starts_with("SELECT") {
            return Err(MemoryError::Syntax(sql.split_whitespace().next().unwrap_or("").into()));
        }
        Ok(shared.rows.clone())
    }

    async fn query_row(&mut self, sql: &str, args: &[String]) -> Option<String> {
        self.query(sql, args).await.ok().and_then(|rows| rows.into_iter().next())
    }

    async fn exec(&mut self, sql: &str, args: &[String]) -> Result<u64, MemoryError> {
        let mut shared = self.session()?;
        if !sql.starts_with("INSERT") {
            return Err(MemoryError::Syntax(sql.split_whitespace().next().unwrap_or("").into()));
        }
        shared.rows.extend(args.iter().cloned());
        Ok(args.len() as u64)
    }

    async fn ping(&mut self) -> Result<(), MemoryError> {
        self.session().map(|_| ())
    }

    async fn close(&mut self) -> Result<(), MemoryError> {
        self.closed = true;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
