//! Error types for DBCall

use std::error::Error as StdError;
use thiserror::Error;

/// Boxed driver error, carried through untouched
pub type DatabaseError = Box<dyn StdError + Send + Sync + 'static>;

/// Core error type for routine invocation
#[derive(Error, Debug)]
pub enum CallError {
    /// An argument was rejected before any connection was opened
    #[error("{message} (Parameter '{param}')")]
    InvalidArgument {
        message: &'static str,
        param: &'static str,
    },

    /// Whatever the driver reported, with its own message and type
    #[error(transparent)]
    Database(DatabaseError),

    #[error("Table function '{function}' returned no result table")]
    MissingResultTable { function: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The shared runtime behind the blocking API could not be started
    #[error("Async runtime unavailable: {0}")]
    Runtime(String),
}

impl CallError {
    pub const BLANK_CONNECTION_STRING: &'static str =
        "Connection string parameter cannot be null, empty or whitespace";
    pub const BLANK_PROCEDURE_NAME: &'static str =
        "Procedure name cannot be null, empty or whitespace";
    pub const BLANK_FUNCTION_NAME: &'static str =
        "function name cannot be null, empty or whitespace";
    pub const EMPTY_FIELD_LIST: &'static str =
        "list of fields to be selected cannot be null or empty";
    pub const BLANK_SQL: &'static str = "sql parameter cannot be null, empty or whitespace";

    /// Wrap a native driver error without altering it
    pub fn database(err: impl Into<DatabaseError>) -> Self {
        CallError::Database(err.into())
    }

    /// Check if this is an argument-validation error
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, CallError::InvalidArgument { .. })
    }

    /// Name of the rejected argument, for argument-validation errors
    pub fn param_name(&self) -> Option<&'static str> {
        match self {
            CallError::InvalidArgument { param, .. } => Some(param),
            _ => None,
        }
    }

    /// The driver's native error, for database errors
    ///
    /// Callers that need to classify failures downcast this to the driver's
    /// own error type.
    pub fn database_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            CallError::Database(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias for DBCall operations
pub type Result<T> = std::result::Result<T, CallError>;

/// Fail with an argument-validation error when `value` is empty or whitespace
pub fn ensure_not_blank(value: &str, message: &'static str, param: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CallError::InvalidArgument { message, param });
    }
    Ok(())
}
