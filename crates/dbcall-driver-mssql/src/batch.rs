//! Translation of a command into a T-SQL batch
//!
//! tiberius binds values positionally (`@P1`, `@P2`, ...), while commands
//! refer to parameters by name. Each named parameter therefore becomes a local
//! variable initialised from its positional value:
//!
//! ```sql
//! DECLARE @__return_value INT;
//! DECLARE @value INT = @P1;
//! DECLARE @result INT;
//! EXEC @__return_value = dbo.Double @value = @value, @result = @result OUTPUT;
//! SELECT @__return_value, @result;
//! ```
//!
//! The trailing `SELECT` returns whatever the server assigned to output and
//! return-value parameters; the connection consumes that row and never hands
//! it out as a result table.

use crate::connection::{MssqlConnectionError, TiberiusParam};
use dbcall_core::names::parameter_variable;
use dbcall_core::{Command, CommandKind};
use std::fmt::Write;

/// Variable that receives a stored procedure's return code
pub(crate) const RETURN_VALUE_VARIABLE: &str = "@__return_value";

#[derive(Debug)]
pub(crate) struct Batch {
    pub sql: String,
    pub params: Vec<TiberiusParam>,
    /// Parameter indexes read back from the echo row, in column order
    pub echo: Vec<usize>,
}

pub(crate) fn build_batch(command: &Command) -> Result<Batch, MssqlConnectionError> {
    if command.parameters.is_empty() {
        let sql = match command.kind {
            CommandKind::StoredProcedure => format!("EXEC {}", command.text),
            CommandKind::Text => command.text.clone(),
        };
        return Ok(Batch {
            sql,
            params: Vec::new(),
            echo: Vec::new(),
        });
    }

    let return_index = command.return_value_index();
    let mut sql = String::new();
    let mut params = Vec::new();
    let mut echo = Vec::new();
    let mut echo_variables = Vec::new();
    let mut arguments = Vec::new();

    for (index, parameter) in command.parameters.iter().enumerate() {
        if parameter.is_return_value() {
            // Only the first return-value parameter is bound.
            if return_index == Some(index) {
                let _ = writeln!(sql, "DECLARE {} INT;", RETURN_VALUE_VARIABLE);
                echo.push(index);
                echo_variables.push(RETURN_VALUE_VARIABLE.to_string());
            }
            continue;
        }

        let variable = variable_name(parameter.name())?;
        let sql_type = parameter.effective_sql_type();
        let direction = parameter.direction();

        if direction.sends_value() {
            params.push(TiberiusParam::from_value(parameter.value(), sql_type));
            let _ = writeln!(
                sql,
                "DECLARE {} {} = @P{};",
                variable,
                sql_type,
                params.len()
            );
        } else {
            let _ = writeln!(sql, "DECLARE {} {};", variable, sql_type);
        }

        if direction.is_output() {
            arguments.push(format!("{0} = {0} OUTPUT", variable));
            echo.push(index);
            echo_variables.push(variable);
        } else {
            arguments.push(format!("{0} = {0}", variable));
        }
    }

    match command.kind {
        CommandKind::StoredProcedure => {
            sql.push_str("EXEC ");
            if return_index.is_some() {
                let _ = write!(sql, "{} = ", RETURN_VALUE_VARIABLE);
            }
            sql.push_str(&command.text);
            if !arguments.is_empty() {
                sql.push(' ');
                sql.push_str(&arguments.join(", "));
            }
            sql.push_str(";\n");
        }
        CommandKind::Text => {
            sql.push_str(&command.text);
            sql.push('\n');
        }
    }

    if !echo_variables.is_empty() {
        let _ = write!(sql, "SELECT {};", echo_variables.join(", "));
    }

    Ok(Batch { sql, params, echo })
}

/// The T-SQL variable a parameter name maps to
///
/// A missing `@` is added the same way call text built from parameter names
/// adds it. Names that are not plain identifiers, or that collide with the
/// positional `@P<n>` slots or the return-value variable, are rejected since
/// they end up in the batch text.
pub(crate) fn variable_name(name: &str) -> Result<String, MssqlConnectionError> {
    let variable = parameter_variable(name);
    let body = &variable[1..];

    let mut chars = body.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_' || first == '#')
                && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '#' | '$' | '@'))
        }
        None => false,
    };
    if !valid {
        return Err(MssqlConnectionError::InvalidParameterName(name.to_string()));
    }

    if is_reserved(&variable) {
        return Err(MssqlConnectionError::ReservedParameterName(name.to_string()));
    }
    Ok(variable)
}

fn is_reserved(variable: &str) -> bool {
    if variable.eq_ignore_ascii_case(RETURN_VALUE_VARIABLE) {
        return true;
    }
    variable
        .strip_prefix("@P")
        .or_else(|| variable.strip_prefix("@p"))
        .is_some_and(|digits| !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()))
}
