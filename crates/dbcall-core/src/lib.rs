//! DBCall Core - Core abstractions for invoking database routines
//!
//! This crate provides the types every other DBCall crate depends on:
//!
//! - `Parameter` - A named, directioned routine parameter
//! - `Value`, `Row`, `Table`, `TableSet` - Values and result tables
//! - `Command` - An executable request handed to a driver
//! - `RoutineDriver` / `RoutineConnection` - The driver boundary
//! - `CallError` - Argument-validation and database errors
//! - `CallerConfig` - Connection configuration

mod command;
mod config;
mod connection;
mod error;
pub mod names;
mod parameter;
mod types;

pub use command::*;
pub use config::*;
pub use connection::*;
pub use error::*;
pub use parameter::*;
pub use types::*;
