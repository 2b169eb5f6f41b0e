//! MS SQL Server driver implementation

use crate::connection::MssqlConnection;
use async_trait::async_trait;
use dbcall_core::{Result, RoutineConnection, RoutineDriver};

/// MS SQL Server database driver
pub struct MssqlDriver;

impl MssqlDriver {
    /// Create a new MS SQL Server driver instance
    pub fn new() -> Self {
        tracing::debug!("MS SQL Server driver initialized");
        Self
    }

    /// Default TCP port of a SQL Server instance
    pub fn default_port(&self) -> u16 {
        1433
    }

    /// Connection string format help text
    pub fn connection_string_help(&self) -> &'static str {
        "Server=tcp:host,port;Database=dbname;User Id=user;Password=pass;TrustServerCertificate=true"
    }
}

impl Default for MssqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoutineDriver for MssqlDriver {
    fn name(&self) -> &'static str {
        "mssql"
    }

    #[tracing::instrument(skip(self, connection_string))]
    async fn open(&self, connection_string: &str) -> Result<Box<dyn RoutineConnection>> {
        tracing::debug!("opening MS SQL Server connection");
        let connection = MssqlConnection::connect(connection_string).await?;
        Ok(Box::new(connection))
    }
}
