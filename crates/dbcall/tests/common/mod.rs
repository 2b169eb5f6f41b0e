//! Common test utilities and a scripted fake driver
#![allow(dead_code)]

use async_trait::async_trait;
use dbcall::{
    CallError, Column, Command, Result, RoutineConnection, RoutineDriver, Table,
    TableSet, Value,
};
use parking_lot::Mutex;
use std::sync::{Arc, Once};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install a tracing subscriber once per test binary
pub fn init_tracing() {
    INIT.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env()
                    .add_directive("dbcall=debug".parse().expect("valid directive")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Native error raised by the fake server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeDatabaseError {
    pub number: u32,
    pub message: String,
}

impl FakeDatabaseError {
    pub fn new(number: u32, message: impl Into<String>) -> Self {
        Self {
            number,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FakeDatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FakeDatabaseError {}

type Handler = dyn Fn(&mut Command) -> Result<TableSet> + Send + Sync;

/// Connection bookkeeping shared by a driver and the connections it opened
#[derive(Debug, Default)]
pub struct FakeStats {
    pub open_attempts: usize,
    pub opened: usize,
    pub closed: usize,
    pub dropped: usize,
    /// Every command as it was received, before the server touched it
    pub commands: Vec<Command>,
}

/// Driver whose server behaviour is a plain function over the command
#[derive(Clone)]
pub struct FakeDriver {
    handler: Arc<Handler>,
    stats: Arc<Mutex<FakeStats>>,
    open_error: Option<FakeDatabaseError>,
    close_error: Option<FakeDatabaseError>,
    delay: Option<Duration>,
}

impl FakeDriver {
    pub fn new(handler: impl Fn(&mut Command) -> Result<TableSet> + Send + Sync + 'static) -> Self {
        Self {
            handler: Arc::new(handler),
            stats: Arc::new(Mutex::new(FakeStats::default())),
            open_error: None,
            close_error: None,
            delay: None,
        }
    }

    /// A driver backed by [`fake_server`]
    pub fn server() -> Self {
        Self::new(fake_server)
    }

    pub fn with_open_error(mut self, error: FakeDatabaseError) -> Self {
        self.open_error = Some(error);
        self
    }

    pub fn with_close_error(mut self, error: FakeDatabaseError) -> Self {
        self.close_error = Some(error);
        self
    }

    /// Make every command take `delay` before it completes
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn open_attempts(&self) -> usize {
        self.stats.lock().open_attempts
    }

    pub fn opened(&self) -> usize {
        self.stats.lock().opened
    }

    pub fn closed(&self) -> usize {
        self.stats.lock().closed
    }

    pub fn dropped(&self) -> usize {
        self.stats.lock().dropped
    }

    /// Connections opened and not yet released
    pub fn live_connections(&self) -> usize {
        let stats = self.stats.lock();
        stats.opened - stats.dropped
    }

    pub fn commands(&self) -> Vec<Command> {
        self.stats.lock().commands.clone()
    }

    pub fn last_command(&self) -> Option<Command> {
        self.stats.lock().commands.last().cloned()
    }
}

#[async_trait]
impl RoutineDriver for FakeDriver {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn open(&self, _connection_string: &str) -> Result<Box<dyn RoutineConnection>> {
        self.stats.lock().open_attempts += 1;
        if let Some(error) = &self.open_error {
            return Err(CallError::database(error.clone()));
        }

        self.stats.lock().opened += 1;
        Ok(Box::new(FakeConnection {
            handler: self.handler.clone(),
            stats: self.stats.clone(),
            close_error: self.close_error.clone(),
            delay: self.delay,
            closed: false,
        }))
    }
}

pub struct FakeConnection {
    handler: Arc<Handler>,
    stats: Arc<Mutex<FakeStats>>,
    close_error: Option<FakeDatabaseError>,
    delay: Option<Duration>,
    closed: bool,
}

#[async_trait]
impl RoutineConnection for FakeConnection {
    fn driver_name(&self) -> &str {
        "fake"
    }

    async fn fill(&mut self, command: &mut Command) -> Result<TableSet> {
        self.stats.lock().commands.push(command.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.handler)(command)
    }

    async fn execute_scalar(&mut self, command: &mut Command) -> Result<Value> {
        let tables = self.fill(command).await?;
        Ok(tables
            .into_first()
            .and_then(|table| table.into_rows().into_iter().next())
            .and_then(|row| row.values.into_iter().next())
            .unwrap_or(Value::Null))
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.stats.lock().closed += 1;
        match &self.close_error {
            Some(error) => Err(CallError::database(error.clone())),
            None => Ok(()),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.stats.lock().dropped += 1;
    }
}

/// Build a table with `Int4` columns
pub fn table(columns: &[&str], rows: Vec<Vec<Value>>) -> Table {
    let mut table = Table::new(
        columns
            .iter()
            .enumerate()
            .map(|(ordinal, name)| Column {
                name: name.to_string(),
                data_type: "Int4".to_string(),
                ordinal,
            })
            .collect(),
    );
    for row in rows {
        table.push_row(row);
    }
    table
}

fn argument(command: &Command, name: &str) -> Value {
    command
        .parameters
        .iter()
        .find(|p| p.name() == name)
        .map(|p| p.value().clone())
        .unwrap_or(Value::Null)
}

fn assign(command: &mut Command, name: &str, value: Value) {
    if let Some(parameter) = command.parameters.iter_mut().find(|p| p.name() == name) {
        parameter.set_value(value);
    }
}

/// Procedures write their return code into the first return-value parameter
fn set_return_value(command: &mut Command, code: i32) {
    if let Some(index) = command.return_value_index() {
        command.parameters[index].set_value(Value::Int32(code));
    }
}

/// Scripted stand-in for the `dbcalltest` fixture schema
pub fn fake_server(command: &mut Command) -> Result<TableSet> {
    let text = command.text.clone();
    match text.as_str() {
        "dbcalltest.DoNothing" => {
            set_return_value(command, 0);
            Ok(TableSet::new())
        }
        "dbcalltest.ReturnNumber" => {
            let number = argument(command, "@parameter1").as_i64().unwrap_or(0);
            set_return_value(command, number as i32);
            Ok(TableSet::new())
        }
        "dbcalltest.Double" => {
            let value = argument(command, "@value").as_i64().unwrap_or(0) as i32;
            assign(command, "@result", Value::Int32(value * 2));
            set_return_value(command, 0);
            Ok(TableSet::from(vec![table(
                &["value"],
                vec![vec![Value::Int32(value)]],
            )]))
        }
        "dbcalltest.TwoResultSets" => {
            set_return_value(command, 0);
            Ok(TableSet::from(vec![
                table(&["a"], vec![vec![Value::Int32(1)]]),
                table(&["b"], vec![]),
            ]))
        }
        "dbcalltest.ThrowDivideByZeroError" | "select dbcalltest.DivideByZero()" => Err(
            CallError::database(FakeDatabaseError::new(8134, "Divide by zero error encountered.")),
        ),
        "select getdate()" => {
            let now = chrono::Local::now().naive_local();
            Ok(TableSet::from(vec![table(&[""], vec![vec![Value::DateTime(now)]])]))
        }
        "select n from dbcalltest.Numbers(@count)" => {
            let count = argument(command, "@count").as_i64().unwrap_or(0) as i32;
            let rows = (1..=count).map(|n| vec![Value::Int32(n)]).collect();
            Ok(TableSet::from(vec![table(&["n"], rows)]))
        }
        "select n from dbcalltest.NoResult()" => Ok(TableSet::new()),
        _ => Err(CallError::database(FakeDatabaseError::new(
            2812,
            format!("Could not find stored procedure '{}'.", text),
        ))),
    }
}
