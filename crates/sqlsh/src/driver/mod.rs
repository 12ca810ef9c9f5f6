//! Database driver boundary
//!
//! The shell talks to the database only through [`Connection`] and
//! [`RowCursor`]. The SQLite implementation lives in [`sqlite`].

pub mod sqlite;

use crate::error::Result;
use std::fmt;

pub use sqlite::{Interrupter, SqliteConnection};

/// A single non-null cell as returned by the driver.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(v) => write!(f, "{}", v),
            CellValue::Real(v) => write!(f, "{}", v),
            CellValue::Text(v) => write!(f, "{}", v),
            CellValue::Blob(bytes) => {
                write!(f, "0x")?;
                for b in bytes {
                    write!(f, "{:02X}", b)?;
                }
                Ok(())
            }
        }
    }
}

/// Forward-only cursor over a result set.
///
/// `next` must be called before the first `value`. `release` may be called
/// any number of times.
pub trait RowCursor {
    fn column_count(&self) -> usize;

    fn column_name(&self, index: usize) -> Result<String>;

    /// True if the result set contains at least one row. Does not consume it.
    fn has_rows(&mut self) -> Result<bool>;

    /// Advance to the next row, returning false once exhausted.
    fn next(&mut self) -> Result<bool>;

    /// Value of column `index` in the current row; `None` is SQL NULL.
    fn value(&self, index: usize) -> Result<Option<CellValue>>;

    fn release(&mut self);
}

/// An open connection to a database.
pub trait Connection {
    /// Execute a statement for effect, returning the number of affected rows.
    fn execute(&mut self, sql: &str) -> Result<usize>;

    /// Execute a row-returning statement and hand its cursor to `reader`.
    ///
    /// The cursor is released before this returns, whether `reader`
    /// succeeded or not.
    fn query(
        &mut self,
        sql: &str,
        reader: &mut dyn FnMut(&mut dyn RowCursor) -> Result<()>,
    ) -> Result<()>;

    /// Release the connection. Safe to call more than once.
    fn close(&mut self) -> Result<()>;
}
