//! Executable requests handed to a driver

use crate::Parameter;

/// How the driver should interpret `Command::text`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `text` is the name of a stored procedure
    StoredProcedure,
    /// `text` is a SQL batch that refers to parameters by name
    Text,
}

/// A request text plus the parameters bound to it
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub text: String,
    pub kind: CommandKind,
    pub parameters: Vec<Parameter>,
}

impl Command {
    pub fn new(text: impl Into<String>, kind: CommandKind) -> Self {
        Self {
            text: text.into(),
            kind,
            parameters: Vec::new(),
        }
    }

    /// Create a stored procedure command
    pub fn procedure(name: impl Into<String>) -> Self {
        Self::new(name, CommandKind::StoredProcedure)
    }

    /// Create a text command
    pub fn text(sql: impl Into<String>) -> Self {
        Self::new(sql, CommandKind::Text)
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Index of the parameter that receives the return code
    ///
    /// When several parameters are directioned `ReturnValue`, the first wins.
    pub fn return_value_index(&self) -> Option<usize> {
        self.parameters.iter().position(Parameter::is_return_value)
    }
}
