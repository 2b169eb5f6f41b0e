//! Single-use connection lifecycle around one command
//!
//! A connection is closed on every path. When both the command and the close
//! fail, the command's error is returned and the close error is only logged.
//! A connection dropped before completion (for example when the returned
//! future is cancelled) is released by the driver's `Drop`.

use dbcall_core::{Command, Result, RoutineConnection, RoutineDriver, TableSet, Value};
use std::time::Instant;

/// Open a connection, read every result set of `command` and close it again
pub async fn fill(
    driver: &dyn RoutineDriver,
    connection_string: &str,
    command: &mut Command,
) -> Result<TableSet> {
    let start = Instant::now();
    let mut connection = open(driver, connection_string).await?;
    let outcome = connection.fill(command).await;
    finish(driver, connection, command, start, outcome).await
}

/// Open a connection, read the first cell of `command`'s response and close it again
pub async fn scalar(
    driver: &dyn RoutineDriver,
    connection_string: &str,
    command: &mut Command,
) -> Result<Value> {
    let start = Instant::now();
    let mut connection = open(driver, connection_string).await?;
    let outcome = connection.execute_scalar(command).await;
    finish(driver, connection, command, start, outcome).await
}

async fn open(
    driver: &dyn RoutineDriver,
    connection_string: &str,
) -> Result<Box<dyn RoutineConnection>> {
    let connection = driver.open(connection_string).await?;
    tracing::debug!(driver = driver.name(), "connection opened");
    Ok(connection)
}

async fn finish<T>(
    driver: &dyn RoutineDriver,
    mut connection: Box<dyn RoutineConnection>,
    command: &Command,
    start: Instant,
    outcome: Result<T>,
) -> Result<T> {
    let closed = connection.close().await;
    tracing::debug!(
        driver = driver.name(),
        kind = ?command.kind,
        succeeded = outcome.is_ok() && closed.is_ok(),
        duration_ms = start.elapsed().as_millis() as u64,
        "routine call finished"
    );

    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            tracing::warn!(error = %close_err, "failed to close connection after a failed command");
            Err(err)
        }
    }
}
