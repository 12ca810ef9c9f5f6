//! sqlsh - interactive SQL shell
//!
//! Reads statements line by line, refuses mutating statements unless the
//! session was opened read-write, and prints results as bordered tables
//! colored by value type.

pub mod config;
pub mod driver;
pub mod error;
pub mod format;
pub mod interrupt;
pub mod output;
pub mod session;
pub mod sql;
pub mod statement;
pub mod terminal;

pub use config::{AccessMode, ConnectionConfig};
pub use error::{Error, Result};
pub use interrupt::Interrupts;
pub use session::{Session, SessionEnd};
pub use sql::{ExecutionResult, SqlEngine};
pub use statement::{CompletionMode, StatementBuilder};
