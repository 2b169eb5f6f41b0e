//! Routine invocations and the request text each kind is called with

use dbcall_core::names::{clean_scalar_function_name, join_non_blank, join_parameter_names};
use dbcall_core::{CallError, Command, Parameter, Result, ensure_not_blank};

/// The shape of a database routine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutineKind {
    /// Executed by name; returns any number of tables and a return code
    Procedure,
    /// Called from `select <name>(<args>)`; returns a single value
    ScalarFunction,
    /// Selected from; `fields` are the columns to project
    TableFunction { fields: Vec<String> },
}

/// A routine name plus the parameters it is called with
///
/// `parameters` doubles as an out-parameter: after a call it holds the values
/// the server assigned to output and return-value parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineInvocation {
    pub kind: RoutineKind,
    pub name: String,
    pub parameters: Vec<Parameter>,
}

impl RoutineInvocation {
    pub fn procedure(name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            kind: RoutineKind::Procedure,
            name: name.into(),
            parameters,
        }
    }

    pub fn scalar_function(name: impl Into<String>, parameters: Vec<Parameter>) -> Self {
        Self {
            kind: RoutineKind::ScalarFunction,
            name: name.into(),
            parameters,
        }
    }

    pub fn table_function<I, S>(name: impl Into<String>, fields: I, parameters: Vec<Parameter>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: RoutineKind::TableFunction {
                fields: fields.into_iter().map(Into::into).collect(),
            },
            name: name.into(),
            parameters,
        }
    }

    /// Check the routine name and, for table functions, the projected fields
    pub fn validate(&self) -> Result<()> {
        match &self.kind {
            RoutineKind::Procedure => {
                ensure_not_blank(&self.name, CallError::BLANK_PROCEDURE_NAME, "procedure_name")
            }
            RoutineKind::ScalarFunction => {
                ensure_not_blank(&self.name, CallError::BLANK_FUNCTION_NAME, "function_name")
            }
            RoutineKind::TableFunction { fields } => {
                ensure_not_blank(&self.name, CallError::BLANK_FUNCTION_NAME, "function_name")?;
                if join_non_blank(fields).is_empty() {
                    return Err(CallError::InvalidArgument {
                        message: CallError::EMPTY_FIELD_LIST,
                        param: "fields",
                    });
                }
                Ok(())
            }
        }
    }

    /// Build the command that calls this routine with `parameters` bound
    ///
    /// Function calls refer to their arguments by parameter name; the values
    /// still travel through parameter binding.
    pub fn build_command(&self, parameters: Vec<Parameter>) -> Result<Command> {
        let command = match &self.kind {
            RoutineKind::Procedure => Command::procedure(self.name.as_str()),
            RoutineKind::ScalarFunction => {
                let name = clean_scalar_function_name(&self.name).ok_or(
                    CallError::InvalidArgument {
                        message: CallError::BLANK_FUNCTION_NAME,
                        param: "function_name",
                    },
                )?;
                Command::text(format!(
                    "select {}({})",
                    name,
                    join_parameter_names(&parameters)
                ))
            }
            RoutineKind::TableFunction { fields } => Command::text(format!(
                "select {} from {}({})",
                join_non_blank(fields),
                self.name,
                join_parameter_names(&parameters)
            )),
        };
        Ok(command.with_parameters(parameters))
    }
}
