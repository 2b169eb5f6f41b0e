//! Caller configuration

use crate::{CallError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable read by `CallerConfig::from_env`
pub const CONNECTION_STRING_ENV: &str = "DBCALL_CONNECTION_STRING";

/// Configuration for a routine caller
///
/// ```toml
/// connection_string = "Server=tcp:localhost,1433;Database=app;User Id=sa;Password=...;TrustServerCertificate=true"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerConfig {
    /// Driver connection string; a missing value is rejected at call time
    #[serde(default)]
    pub connection_string: Option<String>,
}

impl CallerConfig {
    pub fn new(connection_string: impl Into<String>) -> Self {
        Self {
            connection_string: Some(connection_string.into()),
        }
    }

    /// Parse a TOML document
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| CallError::Configuration(e.to_string()))
    }

    /// Read and parse a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "loading caller configuration");
        let contents = std::fs::read_to_string(path).map_err(|e| {
            CallError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Read the connection string from `DBCALL_CONNECTION_STRING`
    pub fn from_env() -> Self {
        Self {
            connection_string: std::env::var(CONNECTION_STRING_ENV).ok(),
        }
    }

    /// The connection string, or an empty string when none is configured
    pub fn connection_string_or_empty(&self) -> &str {
        self.connection_string.as_deref().unwrap_or_default()
    }
}
