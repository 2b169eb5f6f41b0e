//! DBCall - Invoke database routines through one parameter/result contract
//!
//! Three routine shapes are supported:
//!
//! - Stored procedures, returning every result set plus the integer return code
//! - Scalar functions, invoked as `select <name>(<args>)`
//! - Table-valued functions, invoked as `select <fields> from <name>(<args>)`
//!
//! Every call opens its own connection through a [`RoutineDriver`] and closes
//! it before returning. Output and return-value parameters are written back
//! into the caller's parameter list; a return-value slot the caller did not
//! ask for is used internally and never handed back.
//!
//! # Example
//!
//! ```ignore
//! let caller = RoutineCaller::new(Arc::new(MssqlDriver::new()), connection_string);
//!
//! let mut parameters = vec![Parameter::input("@parameter1", 12345)];
//! let result = caller.run_procedure("dbo.ReturnNumber", &mut parameters).await?;
//! assert_eq!(result.return_value, Some(12345));
//! ```

mod blocking;
mod caller;
pub mod executor;
mod materialize;
pub mod reconcile;
mod routine;
pub mod runtime;

#[cfg(test)]
mod materialize_tests;
#[cfg(test)]
mod reconcile_tests;
#[cfg(test)]
mod routine_tests;

pub use blocking::BlockingRoutineCaller;
pub use caller::RoutineCaller;
pub use materialize::{ExecutionResult, ProcedureResult};
pub use routine::{RoutineInvocation, RoutineKind};

pub use dbcall_core::*;
