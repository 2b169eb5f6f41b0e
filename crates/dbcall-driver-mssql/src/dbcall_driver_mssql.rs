//! MS SQL Server driver for DBCall
//!
//! This crate implements the DBCall driver boundary for Microsoft SQL Server
//! on top of tiberius. Commands are translated into T-SQL batches that bind
//! every parameter by name and read output and return values back.

mod batch;
mod connection;
mod driver;

#[cfg(test)]
mod batch_tests;
#[cfg(test)]
mod connection_tests;
#[cfg(test)]
mod driver_tests;

pub use connection::{MssqlConnection, MssqlConnectionError};
pub use driver::MssqlDriver;
