//! Tests for result shaping

use crate::materialize::{self, ExecutionResult, ProcedureResult};
use dbcall_core::{CallError, Column, Table, TableSet, Value};
use pretty_assertions::assert_eq;

fn numbers(count: i32) -> Table {
    let mut table = Table::new(vec![Column {
        name: "n".to_string(),
        data_type: "Int4".to_string(),
        ordinal: 0,
    }]);
    for n in 1..=count {
        table.push_row(vec![Value::Int32(n)]);
    }
    table
}

#[test]
fn test_procedure_keeps_every_table() {
    let tables = TableSet::from(vec![numbers(1), numbers(0), numbers(2)]);

    let result = materialize::procedure(tables, Some(0));

    assert_eq!(result.return_value, Some(0));
    assert_eq!(result.tables.len(), 3);
    assert!(result.tables.get(1).unwrap().is_empty());
}

#[test]
fn test_procedure_without_tables_is_empty_not_missing() {
    let result = materialize::procedure(TableSet::new(), Some(0));
    assert_eq!(
        result,
        ProcedureResult {
            return_value: Some(0),
            tables: TableSet::new()
        }
    );
}

#[test]
fn test_first_table_is_selected() {
    let tables = TableSet::from(vec![numbers(3), numbers(1)]);
    let table = materialize::first_table("dbcalltest.Numbers", tables).unwrap();
    assert_eq!(table.row_count(), 3);
}

#[test]
fn test_first_table_may_be_empty() {
    let tables = TableSet::from(vec![numbers(0)]);
    let table = materialize::first_table("dbcalltest.Numbers", tables).unwrap();
    assert!(table.is_empty());
    assert_eq!(table.column_count(), 1);
}

#[test]
fn test_missing_table_is_an_error() {
    let err = materialize::first_table("dbcalltest.Numbers", TableSet::new())
        .unwrap_err();

    assert!(matches!(
        &err,
        CallError::MissingResultTable { function } if function == "dbcalltest.Numbers"
    ));
    assert_eq!(
        err.to_string(),
        "Table function 'dbcalltest.Numbers' returned no result table"
    );
}

#[test]
fn test_execution_result_accessors() {
    let result = ExecutionResult::Scalar(Value::Int32(5));
    assert_eq!(result.as_scalar(), Some(&Value::Int32(5)));
    assert!(result.as_procedure().is_none());
    assert!(result.as_table().is_none());
}
