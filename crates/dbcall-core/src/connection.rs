//! Driver boundary: opening connections and executing commands

use crate::{Command, Result, TableSet, Value};
use async_trait::async_trait;

/// A database driver that can open single-use connections
#[async_trait]
pub trait RoutineDriver: Send + Sync {
    /// Driver name (e.g., "mssql")
    fn name(&self) -> &'static str;

    /// Open a connection described by `connection_string`
    ///
    /// Failures (unreachable host, bad credentials) are the driver's own
    /// errors, wrapped in `CallError::Database`.
    async fn open(&self, connection_string: &str) -> Result<Box<dyn RoutineConnection>>;
}

/// An open database connection
///
/// A connection is owned by exactly one invocation. Implementations release
/// their transport when dropped, so a connection abandoned mid-call (for
/// example a cancelled future) never stays open.
#[async_trait]
pub trait RoutineConnection: Send {
    /// Get the driver name
    fn driver_name(&self) -> &str;

    /// Execute the command and read every result set it produces
    ///
    /// Result sets without rows are still returned as tables. Values the
    /// server assigns to `Output`, `InputOutput` and `ReturnValue` parameters
    /// are written back into `command.parameters`.
    async fn fill(&mut self, command: &mut Command) -> Result<TableSet>;

    /// Execute the command and return the first column of the first row
    ///
    /// Returns `Value::Null` when the command produced no rows. Output
    /// parameters are written back as for `fill`.
    async fn execute_scalar(&mut self, command: &mut Command) -> Result<Value>;

    /// Close the connection
    async fn close(&mut self) -> Result<()>;

    /// Check if the connection is closed
    fn is_closed(&self) -> bool;
}
