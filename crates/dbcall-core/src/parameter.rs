//! Routine parameters: name, value, direction and declared type

use crate::Value;
use serde::{Deserialize, Serialize};

/// Which way a parameter carries data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParameterDirection {
    /// Value flows into the call
    #[default]
    Input,
    /// Value is assigned by the routine
    Output,
    /// Value flows in and is reassigned by the routine
    InputOutput,
    /// The routine's integer return code
    ReturnValue,
}

impl ParameterDirection {
    /// Whether the server writes a value back into parameters of this direction
    pub fn is_output(self) -> bool {
        !matches!(self, ParameterDirection::Input)
    }

    /// Whether the caller's value is sent to the server
    pub fn sends_value(self) -> bool {
        matches!(
            self,
            ParameterDirection::Input | ParameterDirection::InputOutput
        )
    }
}

/// Declared database type of a parameter
///
/// Length arguments of `None` mean `MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Bit,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    Real,
    Float,
    Decimal { precision: u8, scale: u8 },
    Money,
    Char(u16),
    VarChar(Option<u16>),
    NChar(u16),
    NVarChar(Option<u16>),
    Binary(u16),
    VarBinary(Option<u16>),
    UniqueIdentifier,
    Date,
    Time,
    DateTime,
    DateTime2,
    DateTimeOffset,
    Xml,
    SqlVariant,
}

impl SqlType {
    /// Pick a type for a parameter that was given a value but no declared type
    pub fn infer(value: &Value) -> SqlType {
        match value {
            Value::Null => SqlType::SqlVariant,
            Value::Bool(_) => SqlType::Bit,
            Value::UInt8(_) => SqlType::TinyInt,
            Value::Int16(_) => SqlType::SmallInt,
            Value::Int32(_) => SqlType::Int,
            Value::Int64(_) => SqlType::BigInt,
            Value::Float32(_) => SqlType::Real,
            Value::Float64(_) => SqlType::Float,
            Value::Decimal(d) => {
                let scale = d
                    .split_once('.')
                    .map(|(_, frac)| frac.len().min(38) as u8)
                    .unwrap_or(0);
                SqlType::Decimal {
                    precision: 38,
                    scale,
                }
            }
            Value::String(_) => SqlType::NVarChar(None),
            Value::Bytes(_) => SqlType::VarBinary(None),
            Value::Uuid(_) => SqlType::UniqueIdentifier,
            Value::Date(_) => SqlType::Date,
            Value::Time(_) => SqlType::Time,
            Value::DateTime(_) => SqlType::DateTime2,
            Value::DateTimeUtc(_) | Value::DateTimeOffset(_) => SqlType::DateTimeOffset,
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn len(n: &Option<u16>) -> String {
            n.map(|n| n.to_string()).unwrap_or_else(|| "MAX".to_string())
        }

        match self {
            SqlType::Bit => write!(f, "BIT"),
            SqlType::TinyInt => write!(f, "TINYINT"),
            SqlType::SmallInt => write!(f, "SMALLINT"),
            SqlType::Int => write!(f, "INT"),
            SqlType::BigInt => write!(f, "BIGINT"),
            SqlType::Real => write!(f, "REAL"),
            SqlType::Float => write!(f, "FLOAT"),
            SqlType::Decimal { precision, scale } => write!(f, "DECIMAL({}, {})", precision, scale),
            SqlType::Money => write!(f, "MONEY"),
            SqlType::Char(n) => write!(f, "CHAR({})", n),
            SqlType::VarChar(n) => write!(f, "VARCHAR({})", len(n)),
            SqlType::NChar(n) => write!(f, "NCHAR({})", n),
            SqlType::NVarChar(n) => write!(f, "NVARCHAR({})", len(n)),
            SqlType::Binary(n) => write!(f, "BINARY({})", n),
            SqlType::VarBinary(n) => write!(f, "VARBINARY({})", len(n)),
            SqlType::UniqueIdentifier => write!(f, "UNIQUEIDENTIFIER"),
            SqlType::Date => write!(f, "DATE"),
            SqlType::Time => write!(f, "TIME"),
            SqlType::DateTime => write!(f, "DATETIME"),
            SqlType::DateTime2 => write!(f, "DATETIME2"),
            SqlType::DateTimeOffset => write!(f, "DATETIMEOFFSET"),
            SqlType::Xml => write!(f, "XML"),
            SqlType::SqlVariant => write!(f, "SQL_VARIANT"),
        }
    }
}

/// A named, directioned routine parameter
///
/// Names are conventionally `@`-prefixed. A parameter list may hold at most
/// one `ReturnValue` parameter; the return-value parameter needs no name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    name: String,
    value: Value,
    direction: ParameterDirection,
    sql_type: Option<SqlType>,
}

impl Parameter {
    /// Create an input parameter
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            direction: ParameterDirection::Input,
            sql_type: None,
        }
    }

    /// Create an input parameter
    pub fn input(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(name, value)
    }

    /// Create an output parameter; the routine assigns its value
    pub fn output(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self::new(name, Value::Null)
            .with_direction(ParameterDirection::Output)
            .with_sql_type(sql_type)
    }

    /// Create a parameter that is sent in and reassigned by the routine
    pub fn input_output(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(name, value).with_direction(ParameterDirection::InputOutput)
    }

    /// Create a nameless parameter to receive the routine's return code
    pub fn return_value() -> Self {
        Self::new(String::new(), Value::Null)
            .with_direction(ParameterDirection::ReturnValue)
            .with_sql_type(SqlType::Int)
    }

    pub fn with_direction(mut self, direction: ParameterDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_sql_type(mut self, sql_type: SqlType) -> Self {
        self.sql_type = Some(sql_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    pub fn direction(&self) -> ParameterDirection {
        self.direction
    }

    pub fn is_return_value(&self) -> bool {
        self.direction == ParameterDirection::ReturnValue
    }

    /// The declared type, if the caller gave one
    pub fn sql_type(&self) -> Option<SqlType> {
        self.sql_type
    }

    /// The declared type, or one inferred from the current value
    pub fn effective_sql_type(&self) -> SqlType {
        self.sql_type.unwrap_or_else(|| SqlType::infer(&self.value))
    }
}
