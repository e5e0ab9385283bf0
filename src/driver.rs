//! Contract a database driver must satisfy to sit behind a
//! [`ResilientConnection`](crate::ResilientConnection).
//!
//! The wrapper never inspects rows, command results, or parameters; they are opaque associated
//! types. Cancellation is applied from the outside by racing these futures against the caller's
//! token, so drivers must tolerate their futures being dropped mid-flight.

use crate::classify::DriverError;
use async_trait::async_trait;

/// Opens physical connections.
#[async_trait]
pub trait Driver: Send + Sync {
    type Conn: Connection;

    /// Open one connection to `target`. Establishment failures should report
    /// [`DriverError::is_connect_error`].
    async fn connect(&self, target: &str) -> Result<Self::Conn, <Self::Conn as Connection>::Error>;
}

/// One live physical connection.
#[async_trait]
pub trait Connection: Send {
    type Error: DriverError;
    /// Bind parameter.
    type Value: Send + Sync;
    /// Row sequence produced by `query`.
    type Rows: Send;
    /// Lazily evaluated single row; errors surface when it is consumed.
    type Row: Send;
    /// Command result produced by `exec`, e.g. an affected-row count.
    type Outcome: Send;

    async fn query(&mut self, sql: &str, args: &[Self::Value]) -> Result<Self::Rows, Self::Error>;

    async fn query_row(&mut self, sql: &str, args: &[Self::Value]) -> Self::Row;

    async fn exec(&mut self, sql: &str, args: &[Self::Value])
        -> Result<Self::Outcome, Self::Error>;

    async fn ping(&mut self) -> Result<(), Self::Error>;

    async fn close(&mut self) -> Result<(), Self::Error>;

    /// Whether the driver already knows this connection is unusable.
    fn is_closed(&self) -> bool;
}

pub type ErrorOf<D> = <<D as Driver>::Conn as Connection>::Error;
pub type ValueOf<D> = <<D as Driver>::Conn as Connection>::Value;
pub type RowsOf<D> = <<D as Driver>::Conn as Connection>::Rows;
pub type RowOf<D> = <<D as Driver>::Conn as Connection>::Row;
pub type OutcomeOf<D> = <<D as Driver>::Conn as Connection>::Outcome;
