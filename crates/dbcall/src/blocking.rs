//! Synchronous routine caller

use crate::caller::RoutineCaller;
use crate::materialize::{ExecutionResult, ProcedureResult};
use crate::routine::RoutineInvocation;
use crate::runtime::block_on_tokio;
use dbcall_core::{CallerConfig, Parameter, Result, RoutineDriver, Table, TableSet, Value};
use std::sync::Arc;

/// Blocking counterpart of [`RoutineCaller`]
///
/// Each operation runs the async operation of the same name on the shared
/// runtime and blocks until it finishes. Results and errors are identical.
/// Do not use it from inside an async task; use the async caller there.
#[derive(Debug, Clone)]
pub struct BlockingRoutineCaller {
    inner: RoutineCaller,
}

impl BlockingRoutineCaller {
    pub fn new(driver: Arc<dyn RoutineDriver>, connection_string: impl Into<String>) -> Self {
        Self {
            inner: RoutineCaller::new(driver, connection_string),
        }
    }

    pub fn from_config(driver: Arc<dyn RoutineDriver>, config: &CallerConfig) -> Self {
        Self {
            inner: RoutineCaller::from_config(driver, config),
        }
    }

    pub fn connection_string(&self) -> &str {
        self.inner.connection_string()
    }

    /// The async caller this one drives
    pub fn as_async(&self) -> &RoutineCaller {
        &self.inner
    }

    pub fn invoke(&self, invocation: &mut RoutineInvocation) -> Result<ExecutionResult> {
        block_on_tokio(self.inner.invoke(invocation))?
    }

    pub fn run_procedure(
        &self,
        name: &str,
        parameters: &mut Vec<Parameter>,
    ) -> Result<ProcedureResult> {
        block_on_tokio(self.inner.run_procedure(name, parameters))?
    }

    pub fn call_scalar_function(&self, name: &str, parameters: &mut Vec<Parameter>) -> Result<Value> {
        block_on_tokio(self.inner.call_scalar_function(name, parameters))?
    }

    pub fn call_table_function<S: AsRef<str>>(
        &self,
        name: &str,
        fields: &[S],
        parameters: &[Parameter],
    ) -> Result<Table> {
        block_on_tokio(self.inner.call_table_function(name, fields, parameters))?
    }

    pub fn query(&self, sql: &str, parameters: &[Parameter]) -> Result<TableSet> {
        block_on_tokio(self.inner.query(sql, parameters))?
    }
}

impl From<RoutineCaller> for BlockingRoutineCaller {
    fn from(inner: RoutineCaller) -> Self {
        Self { inner }
    }
}
