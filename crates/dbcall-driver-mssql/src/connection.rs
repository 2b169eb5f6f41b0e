//! MS SQL Server connection implementation using tiberius

use crate::batch::{Batch, build_batch};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use dbcall_core::{
    CallError, Column, Command, Result, RoutineConnection, SqlType, Table, TableSet, Value,
};
use futures::TryStreamExt;
use tiberius::{Client, ColumnData, Config, FromSql, QueryItem, Row as TiberiusRow, ToSql};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

/// MS SQL Server connection errors
#[derive(Debug, thiserror::Error)]
pub enum MssqlConnectionError {
    #[error("Connection is closed")]
    ConnectionClosed,

    #[error("Invalid parameter name '{0}': expected an @-prefixed T-SQL identifier")]
    InvalidParameterName(String),

    #[error("Parameter name '{0}' is reserved by the driver")]
    ReservedParameterName(String),

    #[error(transparent)]
    Tiberius(#[from] tiberius::error::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<MssqlConnectionError> for CallError {
    fn from(err: MssqlConnectionError) -> Self {
        // Native errors travel on as themselves so callers can downcast them.
        match err {
            MssqlConnectionError::Tiberius(e) => CallError::database(e),
            MssqlConnectionError::Io(e) => CallError::database(e),
            other => CallError::database(other),
        }
    }
}

/// MS SQL Server connection using tiberius
pub struct MssqlConnection {
    client: Option<Client<Compat<TcpStream>>>,
    address: String,
}

impl MssqlConnection {
    /// Open a connection from an ADO.NET style connection string
    ///
    /// `Server=tcp:host,1433;Database=db;User Id=sa;Password=...;TrustServerCertificate=true`
    #[tracing::instrument(skip(connection_string))]
    pub async fn connect(connection_string: &str) -> std::result::Result<Self, MssqlConnectionError> {
        let config = Config::from_ado_string(connection_string)?;
        let address = config.get_addr();
        tracing::debug!("connecting to MS SQL Server at {}", address);

        let tcp = TcpStream::connect(config.get_addr()).await?;
        tcp.set_nodelay(true)?;

        let client = Client::connect(config, tcp.compat_write()).await?;

        tracing::debug!("successfully connected to MS SQL Server");

        Ok(Self {
            client: Some(client),
            address,
        })
    }

    /// Run a translated batch and collect every result set
    async fn run(
        &mut self,
        command: &mut Command,
    ) -> std::result::Result<TableSet, MssqlConnectionError> {
        let Batch { sql, params, echo } = build_batch(command)?;
        let client = self
            .client
            .as_mut()
            .ok_or(MssqlConnectionError::ConnectionClosed)?;

        let start = std::time::Instant::now();
        tracing::debug!(
            kind = ?command.kind,
            parameter_count = command.parameters.len(),
            "executing command"
        );

        let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p as &dyn ToSql).collect();
        let mut stream = client
            .query(sql.as_str(), &param_refs[..])
            .await
            .inspect_err(|e| tracing::error!(error = %e, "command failed"))?;

        let mut tables = TableSet::new();
        while let Some(item) = stream
            .try_next()
            .await
            .inspect_err(|e| tracing::error!(error = %e, "command failed"))?
        {
            match item {
                QueryItem::Metadata(meta) => {
                    let columns = meta
                        .columns()
                        .iter()
                        .enumerate()
                        .map(|(idx, col)| tiberius_column_to_meta(col, idx))
                        .collect();
                    tables.push(Table::new(columns));
                }
                QueryItem::Row(row) => {
                    let values = tiberius_row_to_values(row)?;
                    if let Some(table) = tables.last_mut() {
                        table.push_row(values);
                    }
                }
            }
        }

        if !echo.is_empty() {
            let echoed = tables.pop();
            apply_echo(command, &echo, echoed);
        }

        tracing::debug!(
            table_count = tables.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "command completed"
        );
        Ok(tables)
    }
}

#[async_trait]
impl RoutineConnection for MssqlConnection {
    fn driver_name(&self) -> &str {
        "mssql"
    }

    async fn fill(&mut self, command: &mut Command) -> Result<TableSet> {
        Ok(self.run(command).await?)
    }

    async fn execute_scalar(&mut self, command: &mut Command) -> Result<Value> {
        let tables = self.run(command).await?;
        Ok(first_scalar(tables))
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client.close().await.map_err(MssqlConnectionError::from)?;
            tracing::debug!("MS SQL Server connection closed");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.client.is_none()
    }
}

/// Assign the values of the trailing echo row to the parameters they belong to
pub(crate) fn apply_echo(command: &mut Command, echo: &[usize], echoed: Option<Table>) {
    let Some(row) = echoed.and_then(|table| table.into_rows().into_iter().next()) else {
        tracing::warn!("output parameter row missing from response");
        return;
    };

    for (&index, value) in echo.iter().zip(row.values) {
        if let Some(parameter) = command.parameters.get_mut(index) {
            parameter.set_value(value);
        }
    }
}

/// First column of the first row of the first result set, or NULL
pub(crate) fn first_scalar(tables: TableSet) -> Value {
    tables
        .into_first()
        .and_then(|table| table.into_rows().into_iter().next())
        .and_then(|row| row.values.into_iter().next())
        .unwrap_or(Value::Null)
}

/// Convert a tiberius column to column metadata
fn tiberius_column_to_meta(col: &tiberius::Column, ordinal: usize) -> Column {
    Column {
        name: col.name().to_string(),
        data_type: format!("{:?}", col.column_type()),
        ordinal,
    }
}

/// Convert a tiberius row to a vector of Values by consuming the row
fn tiberius_row_to_values(
    row: TiberiusRow,
) -> std::result::Result<Vec<Value>, MssqlConnectionError> {
    row.into_iter().map(column_data_to_value).collect()
}

/// Convert tiberius ColumnData to a Value, keeping the server's typing
pub(crate) fn column_data_to_value(
    col_data: ColumnData<'static>,
) -> std::result::Result<Value, MssqlConnectionError> {
    let value = match col_data {
        ColumnData::Bit(v) => v.map(Value::Bool),
        ColumnData::U8(v) => v.map(Value::UInt8),
        ColumnData::I16(v) => v.map(Value::Int16),
        ColumnData::I32(v) => v.map(Value::Int32),
        ColumnData::I64(v) => v.map(Value::Int64),
        ColumnData::F32(v) => v.map(Value::Float32),
        ColumnData::F64(v) => v.map(Value::Float64),
        ColumnData::String(v) => v.map(|s| Value::String(s.into_owned())),
        ColumnData::Guid(v) => v.map(Value::Uuid),
        ColumnData::Binary(v) => v.map(|b| Value::Bytes(b.into_owned())),
        ColumnData::Numeric(v) => v.map(|n| Value::Decimal(n.to_string())),
        ColumnData::Xml(v) => v.map(|x| Value::String(x.into_owned().into_string())),
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            NaiveDateTime::from_sql(&col_data)?.map(Value::DateTime)
        }
        ColumnData::Date(_) => NaiveDate::from_sql(&col_data)?.map(Value::Date),
        ColumnData::Time(_) => NaiveTime::from_sql(&col_data)?.map(Value::Time),
        // The wire value is UTC plus the stored offset; only the FixedOffset
        // conversion reads it that way.
        ColumnData::DateTimeOffset(_) => {
            DateTime::<FixedOffset>::from_sql(&col_data)?.map(Value::DateTimeOffset)
        }
    };

    Ok(value.unwrap_or(Value::Null))
}

/// Container for tiberius parameter values
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TiberiusParam {
    /// NULL typed to match the variable it initialises
    Null(SqlType),
    Bool(bool),
    U8(u8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    Bytes(Vec<u8>),
    Uuid(uuid::Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    DateTimeUtc(DateTime<Utc>),
    DateTimeOffset(DateTime<FixedOffset>),
}

impl TiberiusParam {
    pub(crate) fn from_value(value: &Value, sql_type: SqlType) -> Self {
        match value {
            Value::Null => TiberiusParam::Null(sql_type),
            Value::Bool(b) => TiberiusParam::Bool(*b),
            Value::UInt8(i) => TiberiusParam::U8(*i),
            Value::Int16(i) => TiberiusParam::I16(*i),
            Value::Int32(i) => TiberiusParam::I32(*i),
            Value::Int64(i) => TiberiusParam::I64(*i),
            Value::Float32(f) => TiberiusParam::F32(*f),
            Value::Float64(f) => TiberiusParam::F64(*f),
            Value::Decimal(d) => TiberiusParam::String(d.clone()),
            Value::String(s) => TiberiusParam::String(s.clone()),
            Value::Bytes(b) => TiberiusParam::Bytes(b.clone()),
            Value::Uuid(u) => TiberiusParam::Uuid(*u),
            Value::Date(d) => TiberiusParam::Date(*d),
            Value::Time(t) => TiberiusParam::Time(*t),
            Value::DateTime(dt) => TiberiusParam::DateTime(*dt),
            Value::DateTimeUtc(dt) => TiberiusParam::DateTimeUtc(*dt),
            Value::DateTimeOffset(dt) => TiberiusParam::DateTimeOffset(*dt),
        }
    }
}

impl ToSql for TiberiusParam {
    fn to_sql(&self) -> ColumnData<'_> {
        match self {
            TiberiusParam::Null(sql_type) => null_column_data(*sql_type),
            TiberiusParam::Bool(v) => ColumnData::Bit(Some(*v)),
            TiberiusParam::U8(v) => ColumnData::U8(Some(*v)),
            TiberiusParam::I16(v) => ColumnData::I16(Some(*v)),
            TiberiusParam::I32(v) => ColumnData::I32(Some(*v)),
            TiberiusParam::I64(v) => ColumnData::I64(Some(*v)),
            TiberiusParam::F32(v) => ColumnData::F32(Some(*v)),
            TiberiusParam::F64(v) => ColumnData::F64(Some(*v)),
            TiberiusParam::String(v) => {
                ColumnData::String(Some(std::borrow::Cow::Borrowed(v.as_str())))
            }
            TiberiusParam::Bytes(v) => {
                ColumnData::Binary(Some(std::borrow::Cow::Borrowed(v.as_slice())))
            }
            TiberiusParam::Uuid(v) => ColumnData::Guid(Some(*v)),
            TiberiusParam::Date(v) => v.to_sql(),
            TiberiusParam::Time(v) => v.to_sql(),
            TiberiusParam::DateTime(v) => v.to_sql(),
            TiberiusParam::DateTimeUtc(v) => v.to_sql(),
            TiberiusParam::DateTimeOffset(v) => v.to_sql(),
        }
    }
}

/// A NULL whose TDS type converts implicitly to `sql_type`
pub(crate) fn null_column_data(sql_type: SqlType) -> ColumnData<'static> {
    match sql_type {
        SqlType::Bit => ColumnData::Bit(None),
        SqlType::TinyInt => ColumnData::U8(None),
        SqlType::SmallInt => ColumnData::I16(None),
        SqlType::Int => ColumnData::I32(None),
        SqlType::BigInt => ColumnData::I64(None),
        SqlType::Real => ColumnData::F32(None),
        SqlType::Float => ColumnData::F64(None),
        SqlType::Binary(_) | SqlType::VarBinary(_) => ColumnData::Binary(None),
        SqlType::UniqueIdentifier => ColumnData::Guid(None),
        _ => ColumnData::String(None),
    }
}

impl std::fmt::Debug for MssqlConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MssqlConnection")
            .field("address", &self.address)
            .field("closed", &self.client.is_none())
            .finish()
    }
}
