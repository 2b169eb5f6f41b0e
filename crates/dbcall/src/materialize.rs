//! Caller-facing result shapes

use dbcall_core::{CallError, Result, Table, TableSet, Value};

/// Result of running a stored procedure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcedureResult {
    /// The procedure's return code; `None` when the server reported NULL
    pub return_value: Option<i32>,
    /// Every result set, in order; empty when the procedure selected nothing
    pub tables: TableSet,
}

/// Result of an invocation, shaped by the routine kind
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionResult {
    Procedure(ProcedureResult),
    Scalar(Value),
    Table(Table),
}

impl ExecutionResult {
    pub fn as_procedure(&self) -> Option<&ProcedureResult> {
        match self {
            ExecutionResult::Procedure(result) => Some(result),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            ExecutionResult::Scalar(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            ExecutionResult::Table(table) => Some(table),
            _ => None,
        }
    }
}

pub(crate) fn procedure(tables: TableSet, return_value: Option<i32>) -> ProcedureResult {
    ProcedureResult {
        return_value,
        tables,
    }
}

/// The first table of a table function's response
///
/// A response without any table is an error, never an empty table.
pub(crate) fn first_table(function: &str, tables: TableSet) -> Result<Table> {
    tables
        .into_first()
        .ok_or_else(|| CallError::MissingResultTable {
            function: function.to_string(),
        })
}
