//! Scriptable in-memory driver used by the integration tests.

use async_trait::async_trait;
use relink::{Connection, Driver, DriverError};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Closed,
    Timeout,
    Refused,
    SafeToRetry,
    Syntax,
    Auth,
    Constraint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeError {
    pub kind: Kind,
    pub message: String,
}

impl FakeError {
    fn new(kind: Kind, message: &str) -> Self {
        Self { kind, message: message.to_string() }
    }

    pub fn closed() -> Self {
        Self::new(Kind::Closed, "conn closed")
    }

    pub fn timeout() -> Self {
        Self::new(Kind::Timeout, "i/o timeout")
    }

    pub fn refused() -> Self {
        Self::new(Kind::Refused, "dial tcp 10.0.0.5:5432: connect: connection refused")
    }

    pub fn safe_to_retry() -> Self {
        Self::new(Kind::SafeToRetry, "unexpected EOF before request was sent")
    }

    pub fn syntax() -> Self {
        Self::new(Kind::Syntax, "ERROR: syntax error at or near \"SELEC\" (SQLSTATE 42601)")
    }

    pub fn auth() -> Self {
        Self::new(Kind::Auth, "FATAL: password authentication failed for user \"app\"")
    }

    pub fn constraint() -> Self {
        Self::new(Kind::Constraint, "ERROR: duplicate key value violates unique constraint")
    }
}

impl fmt::Display for FakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FakeError {}

impl DriverError for FakeError {
    fn is_timeout(&self) -> bool {
        self.kind == Kind::Timeout
    }

    fn is_connect_error(&self) -> bool {
        self.kind == Kind::Refused
    }

    fn is_safe_to_retry(&self) -> bool {
        self.kind == Kind::SafeToRetry
    }
}

#[derive(Debug, Default)]
struct State {
    connect_failures: VecDeque<FakeError>,
    refuse_all: Option<FakeError>,
    call_failures: VecDeque<FakeError>,
    close_error: Option<FakeError>,
    connect_delay: Option<Duration>,
    targets: Vec<String>,
    current: Option<Arc<AtomicBool>>,
    connects: usize,
    opened: usize,
    queries: usize,
    query_rows: usize,
    execs: usize,
    pings: usize,
    closes: usize,
}

/// Clones share state, so a test can keep one while the wrapper owns another.
#[derive(Debug, Clone, Default)]
pub struct FakeDriver {
    state: Arc<Mutex<State>>,
}

impl FakeDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn with<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        let mut state = self.state.lock().unwrap();
        f(&mut state)
    }

    /// Fail the next connect attempts with `errors`, in order.
    pub fn fail_connects(&self, errors: impl IntoIterator<Item = FakeError>) {
        self.with(|s| s.connect_failures.extend(errors));
    }

    /// Fail every connect attempt from now on.
    pub fn refuse_connections(&self, error: FakeError) {
        self.with(|s| s.refuse_all = Some(error));
    }

    pub fn accept_connections(&self) {
        self.with(|s| s.refuse_all = None);
    }

    /// Fail the next `query`/`exec`/`ping` calls (and the next `query_row` scan) with `errors`.
    pub fn fail_calls(&self, errors: impl IntoIterator<Item = FakeError>) {
        self.with(|s| s.call_failures.extend(errors));
    }

    pub fn close_fails_with(&self, error: FakeError) {
        self.with(|s| s.close_error = Some(error));
    }

    pub fn delay_connects(&self, delay: Duration) {
        self.with(|s| s.connect_delay = Some(delay));
    }

    /// Mark the most recently opened connection closed, as if the server dropped it.
    pub fn kill_current(&self) {
        self.with(|s| {
            if let Some(flag) = &s.current {
                flag.store(true, Ordering::SeqCst);
            }
        });
    }

    /// Connect attempts, successful or not.
    pub fn connects(&self) -> usize {
        self.with(|s| s.connects)
    }

    /// Successfully opened connections.
    pub fn opened(&self) -> usize {
        self.with(|s| s.opened)
    }

    pub fn queries(&self) -> usize {
        self.with(|s| s.queries)
    }

    pub fn query_rows(&self) -> usize {
        self.with(|s| s.query_rows)
    }

    pub fn execs(&self) -> usize {
        self.with(|s| s.execs)
    }

    pub fn pings(&self) -> usize {
        self.with(|s| s.pings)
    }

    pub fn closes(&self) -> usize {
        self.with(|s| s.closes)
    }

    pub fn targets(&self) -> Vec<String> {
        self.with(|s| s.targets.clone())
    }
}

#[async_trait]
impl Driver for FakeDriver {
    type Conn = FakeConn;

    async fn connect(&self, target: &str) -> Result<FakeConn, FakeError> {
        let (failure, delay) = self.with(|s| {
            s.connects += 1;
            s.targets.push(target.to_string());
            let failure = s.connect_failures.pop_front().or_else(|| s.refuse_all.clone());
            (failure, s.connect_delay)
        });
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(err) = failure {
            return Err(err);
        }
        let closed = Arc::new(AtomicBool::new(false));
        let id = self.with(|s| {
            s.opened += 1;
            s.current = Some(closed.clone());
            s.opened
        });
        Ok(FakeConn { id, closed, state: self.state.clone() })
    }
}

/// Row handle whose error, like a real driver's, only shows when the row is scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeRow {
    pub conn: usize,
    pub sql: String,
    pub error: Option<FakeError>,
}

impl FakeRow {
    pub fn scan(self) -> Result<String, FakeError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(format!("conn{}: {}", self.conn, self.sql)),
        }
    }
}

#[derive(Debug)]
pub struct FakeConn {
    pub id: usize,
    closed: Arc<AtomicBool>,
    state: Arc<Mutex<State>>,
}

impl FakeConn {
    /// Record a call and pop its scripted failure. A closed-connection failure also marks this
    /// handle closed.
    fn call(&self, count: impl FnOnce(&mut State)) -> Option<FakeError> {
        let failure = {
            let mut state = self.state.lock().unwrap();
            count(&mut state);
            state.call_failures.pop_front()
        };
        if failure.as_ref().is_some_and(|e| e.kind == Kind::Closed) {
            self.closed.store(true, Ordering::SeqCst);
        }
        failure
    }
}

#[async_trait]
impl Connection for FakeConn {
    type Error = FakeError;
    type Value = i64;
    type Rows = Vec<String>;
    type Row = FakeRow;
    type Outcome = u64;

    async fn query(&mut self, sql: &str, _args: &[i64]) -> Result<Vec<String>, FakeError> {
        match self.call(|s| s.queries += 1) {
            Some(err) => Err(err),
            None => Ok(vec![format!("conn{}: {}", self.id, sql)]),
        }
    }

    async fn query_row(&mut self, sql: &str, _args: &[i64]) -> FakeRow {
        let error = self.call(|s| s.query_rows += 1);
        FakeRow { conn: self.id, sql: sql.to_string(), error }
    }

    async fn exec(&mut self, _sql: &str, args: &[i64]) -> Result<u64, FakeError> {
        match self.call(|s| s.execs += 1) {
            Some(err) => Err(err),
            None => Ok(args.len() as u64),
        }
    }

    async fn ping(&mut self) -> Result<(), FakeError> {
        match self.call(|s| s.pings += 1) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn close(&mut self) -> Result<(), FakeError> {
        self.closed.store(true, Ordering::SeqCst);
        let mut state = self.state.lock().unwrap();
        state.closes += 1;
        match state.close_error.clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}
