//! Asynchronous routine caller

use crate::executor;
use crate::materialize::{self, ExecutionResult, ProcedureResult};
use crate::reconcile::{self, Reconciled, ReturnSlot};
use crate::routine::{RoutineInvocation, RoutineKind};
use dbcall_core::{
    CallError, CallerConfig, Command, Parameter, Result, RoutineDriver, Table, TableSet, Value,
    ensure_not_blank,
};
use std::sync::Arc;

/// Invokes routines against one database
///
/// Every operation opens its own connection and closes it before returning;
/// nothing is shared between calls except the driver and the connection
/// string, so a caller can be used from many tasks at once.
#[derive(Clone)]
pub struct RoutineCaller {
    driver: Arc<dyn RoutineDriver>,
    connection_string: String,
}

impl RoutineCaller {
    pub fn new(driver: Arc<dyn RoutineDriver>, connection_string: impl Into<String>) -> Self {
        Self {
            driver,
            connection_string: connection_string.into(),
        }
    }

    /// Create a caller from loaded configuration
    ///
    /// A missing connection string is accepted here and rejected by the first
    /// call, like a blank one.
    pub fn from_config(driver: Arc<dyn RoutineDriver>, config: &CallerConfig) -> Self {
        Self::new(driver, config.connection_string_or_empty())
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub fn driver_name(&self) -> &'static str {
        self.driver.name()
    }

    /// Run any kind of routine
    ///
    /// On success `invocation.parameters` holds the values the server
    /// assigned; on failure it is left as it was.
    #[tracing::instrument(
        skip(self, invocation),
        fields(driver = self.driver.name(), routine = %invocation.name)
    )]
    pub async fn invoke(&self, invocation: &mut RoutineInvocation) -> Result<ExecutionResult> {
        self.ensure_connection_string()?;
        invocation.validate()?;

        match invocation.kind {
            RoutineKind::Procedure => self
                .procedure_call(invocation)
                .await
                .map(ExecutionResult::Procedure),
            RoutineKind::ScalarFunction => self
                .scalar_call(invocation)
                .await
                .map(ExecutionResult::Scalar),
            RoutineKind::TableFunction { .. } => {
                self.table_call(invocation).await.map(ExecutionResult::Table)
            }
        }
    }

    /// Run a stored procedure
    ///
    /// The return code is reported in the result whether or not `parameters`
    /// holds a `ReturnValue` parameter; one is only written back when the
    /// caller supplied it.
    #[tracing::instrument(skip(self, parameters), fields(driver = self.driver.name()))]
    pub async fn run_procedure(
        &self,
        name: &str,
        parameters: &mut Vec<Parameter>,
    ) -> Result<ProcedureResult> {
        self.ensure_connection_string()?;
        let mut invocation = RoutineInvocation::procedure(name, parameters.clone());
        invocation.validate()?;
        let result = self.procedure_call(&mut invocation).await?;
        *parameters = invocation.parameters;
        Ok(result)
    }

    /// Call a scalar function as `select <name>(<parameter names>)`
    ///
    /// A trailing `()` on `name` is ignored. The value is returned as the
    /// driver typed it.
    #[tracing::instrument(skip(self, parameters), fields(driver = self.driver.name()))]
    pub async fn call_scalar_function(
        &self,
        name: &str,
        parameters: &mut Vec<Parameter>,
    ) -> Result<Value> {
        self.ensure_connection_string()?;
        let mut invocation = RoutineInvocation::scalar_function(name, parameters.clone());
        invocation.validate()?;
        let result = self.scalar_call(&mut invocation).await?;
        *parameters = invocation.parameters;
        Ok(result)
    }

    /// Select `fields` from a table-valued function
    #[tracing::instrument(skip(self, fields, parameters), fields(driver = self.driver.name()))]
    pub async fn call_table_function<S: AsRef<str>>(
        &self,
        name: &str,
        fields: &[S],
        parameters: &[Parameter],
    ) -> Result<Table> {
        self.ensure_connection_string()?;
        let invocation = RoutineInvocation::table_function(
            name,
            fields.iter().map(|f| f.as_ref().to_string()),
            parameters.to_vec(),
        );
        invocation.validate()?;
        self.table_call(&invocation).await
    }

    /// Run a SQL batch that refers to `parameters` by name
    #[tracing::instrument(skip(self, sql, parameters), fields(driver = self.driver.name()))]
    pub async fn query(&self, sql: &str, parameters: &[Parameter]) -> Result<TableSet> {
        self.ensure_connection_string()?;
        ensure_not_blank(sql, CallError::BLANK_SQL, "sql")?;

        let mut command = Command::text(sql).with_parameters(parameters.to_vec());
        executor::fill(self.driver.as_ref(), &self.connection_string, &mut command).await
    }

    async fn procedure_call(&self, invocation: &mut RoutineInvocation) -> Result<ProcedureResult> {
        let (mut command, slot) = bind(invocation)?;
        let tables =
            executor::fill(self.driver.as_ref(), &self.connection_string, &mut command).await?;
        let return_value = write_back(invocation, command, slot);
        Ok(materialize::procedure(tables, return_value))
    }

    async fn scalar_call(&self, invocation: &mut RoutineInvocation) -> Result<Value> {
        let (mut command, slot) = bind(invocation)?;
        let value =
            executor::scalar(self.driver.as_ref(), &self.connection_string, &mut command).await?;
        write_back(invocation, command, slot);
        Ok(value)
    }

    async fn table_call(&self, invocation: &RoutineInvocation) -> Result<Table> {
        let mut command = invocation.build_command(invocation.parameters.clone())?;
        let tables =
            executor::fill(self.driver.as_ref(), &self.connection_string, &mut command).await?;
        materialize::first_table(&invocation.name, tables)
    }

    fn ensure_connection_string(&self) -> Result<()> {
        ensure_not_blank(
            &self.connection_string,
            CallError::BLANK_CONNECTION_STRING,
            "connection_string",
        )
    }
}

/// Build the command for `invocation` with a return-value slot bound
fn bind(invocation: &RoutineInvocation) -> Result<(Command, ReturnSlot)> {
    let mut bound = invocation.parameters.clone();
    let slot = reconcile::bind_return_slot(&mut bound);
    Ok((invocation.build_command(bound)?, slot))
}

/// Hand the server-assigned values back to `invocation`
fn write_back(
    invocation: &mut RoutineInvocation,
    command: Command,
    slot: ReturnSlot,
) -> Option<i32> {
    let Reconciled {
        return_value,
        parameters,
    } = reconcile::reconcile(command.parameters, slot);
    invocation.parameters = parameters;

    tracing::debug!(?return_value, origin = ?slot.origin, "return value reconciled");
    return_value
}

impl std::fmt::Debug for RoutineCaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The connection string may carry a password.
        f.debug_struct("RoutineCaller")
            .field("driver", &self.driver.name())
            .finish_non_exhaustive()
    }
}
