//! SQLite driver
//!
//! The "server" is a data directory holding one `<database>.db` file per
//! database, or `:memory:` for a throwaway in-memory database. `USE <name>`
//! re-opens the connection on `<server>/<name>.db`.

use crate::config::{AccessMode, ConnectionConfig};
use crate::driver::{CellValue, Connection, RowCursor};
use crate::error::{Error, Result};
use crate::sql::guard::split_database_switch;
use rusqlite::types::ValueRef;
use rusqlite::{Batch, InterruptHandle, OpenFlags, Row};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const IN_MEMORY_SERVER: &str = ":memory:";

pub struct SqliteConnection {
    conn: Option<rusqlite::Connection>,
    server: String,
    access_mode: AccessMode,
    interrupt: Arc<Mutex<Option<InterruptHandle>>>,
}

/// Cancels whatever statement the connection is running, from any thread.
///
/// Follows the connection across `USE` switches.
#[derive(Clone)]
pub struct Interrupter {
    slot: Arc<Mutex<Option<InterruptHandle>>>,
}

impl Interrupter {
    pub fn interrupt(&self) {
        if let Ok(slot) = self.slot.lock() {
            if let Some(handle) = slot.as_ref() {
                handle.interrupt();
            }
        }
    }
}

impl SqliteConnection {
    /// Open the configured database. Read-only sessions open the file
    /// read-only, so SQLite enforces the mode as well.
    pub fn open(config: &ConnectionConfig) -> Result<Self> {
        if let Some(credentials) = &config.credentials {
            tracing::debug!(
                user = %credentials.user,
                "sqlite has no authentication; credentials ignored"
            );
        }

        let conn = open_database(&config.server, &config.database, config.access_mode)?;
        let interrupt = Arc::new(Mutex::new(Some(conn.get_interrupt_handle())));

        Ok(Self {
            conn: Some(conn),
            server: config.server.clone(),
            access_mode: config.access_mode,
            interrupt,
        })
    }

    pub fn interrupter(&self) -> Interrupter {
        Interrupter {
            slot: Arc::clone(&self.interrupt),
        }
    }

    fn conn(&self) -> Result<&rusqlite::Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| Error::Connection("connection is closed".to_string()))
    }

    fn set_interrupt_handle(&self, handle: Option<InterruptHandle>) {
        if let Ok(mut slot) = self.interrupt.lock() {
            *slot = handle;
        }
    }

    fn switch_database(&mut self, database: &str) -> Result<()> {
        let conn = open_database(&self.server, database, self.access_mode)?;
        self.set_interrupt_handle(Some(conn.get_interrupt_handle()));
        if let Some(old) = self.conn.replace(conn) {
            if let Err((_, e)) = old.close() {
                tracing::warn!("failed to close previous database: {}", e);
            }
        }
        tracing::debug!(database, "switched database");
        Ok(())
    }

    /// Handle a leading `USE` and return the SQL left to run.
    fn apply_database_switch<'a>(&mut self, sql: &'a str) -> Result<&'a str> {
        match split_database_switch(sql) {
            Some(switch) => {
                self.switch_database(&switch.database)?;
                Ok(switch.remainder)
            }
            None => Ok(sql),
        }
    }

    /// Run every statement in `sql` in order. Rows of the last statement
    /// that returns columns are kept for the cursor; the others run for
    /// effect.
    fn run_batch(&self, sql: &str) -> Result<SqliteCursor> {
        let conn = self.conn()?;
        let mut batch = Batch::new(conn, sql);
        let mut cursor = SqliteCursor::default();
        let mut statements = 0usize;

        while let Some(mut stmt) = batch.next()? {
            statements += 1;

            if stmt.column_count() == 0 {
                stmt.execute([])?;
                continue;
            }

            let columns: Vec<String> = stmt
                .column_names()
                .into_iter()
                .map(|s| s.to_string())
                .collect();
            let column_count = columns.len();

            let mut rows = stmt.query([])?;
            let mut buffered = VecDeque::new();
            while let Some(row) = rows.next()? {
                buffered.push_back(read_row(row, column_count)?);
            }

            cursor = SqliteCursor::new(columns, buffered);
        }

        tracing::debug!(statements, "batch executed");
        Ok(cursor)
    }
}

impl Connection for SqliteConnection {
    fn execute(&mut self, sql: &str) -> Result<usize> {
        let sql = self.apply_database_switch(sql)?;
        if sql.trim().is_empty() {
            return Ok(0);
        }

        let conn = self.conn()?;
        let before = total_changes(conn)?;
        conn.execute_batch(sql)?;
        let after = total_changes(conn)?;

        Ok(usize::try_from(after - before).unwrap_or(0))
    }

    fn query(
        &mut self,
        sql: &str,
        reader: &mut dyn FnMut(&mut dyn RowCursor) -> Result<()>,
    ) -> Result<()> {
        let sql = self.apply_database_switch(sql)?;
        let mut cursor = self.run_batch(sql)?;

        let outcome = reader(&mut cursor);
        cursor.release();
        outcome
    }

    fn close(&mut self) -> Result<()> {
        if let Some(conn) = self.conn.take() {
            self.set_interrupt_handle(None);
            conn.close().map_err(|(_, e)| Error::Sql(e))?;
            tracing::debug!("connection closed");
        }
        Ok(())
    }
}

type RowValues = Vec<Option<CellValue>>;

#[derive(Default)]
struct SqliteCursor {
    columns: Vec<String>,
    rows: VecDeque<RowValues>,
    current: Option<RowValues>,
    seen_any: bool,
}

impl SqliteCursor {
    fn new(columns: Vec<String>, rows: VecDeque<RowValues>) -> Self {
        Self {
            columns,
            rows,
            ..Self::default()
        }
    }
}

impl RowCursor for SqliteCursor {
    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, index: usize) -> Result<String> {
        self.columns
            .get(index)
            .cloned()
            .ok_or(Error::Sql(rusqlite::Error::InvalidColumnIndex(index)))
    }

    fn has_rows(&mut self) -> Result<bool> {
        Ok(self.seen_any || !self.rows.is_empty())
    }

    fn next(&mut self) -> Result<bool> {
        self.current = self.rows.pop_front();
        self.seen_any |= self.current.is_some();
        Ok(self.current.is_some())
    }

    fn value(&self, index: usize) -> Result<Option<CellValue>> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| Error::Cursor("no current row".to_string()))?;
        row.get(index)
            .cloned()
            .ok_or(Error::Sql(rusqlite::Error::InvalidColumnIndex(index)))
    }

    fn release(&mut self) {
        self.rows.clear();
        self.current = None;
    }
}

fn read_row(row: &Row<'_>, column_count: usize) -> Result<RowValues> {
    (0..column_count)
        .map(|i| {
            let value = match row.get_ref(i)? {
                ValueRef::Null => None,
                ValueRef::Integer(v) => Some(CellValue::Integer(v)),
                ValueRef::Real(v) => Some(CellValue::Real(v)),
                ValueRef::Text(bytes) => {
                    Some(CellValue::Text(String::from_utf8_lossy(bytes).into_owned()))
                }
                ValueRef::Blob(bytes) => Some(CellValue::Blob(bytes.to_vec())),
            };
            Ok(value)
        })
        .collect()
}

fn total_changes(conn: &rusqlite::Connection) -> Result<i64> {
    Ok(conn.query_row("SELECT total_changes()", [], |row| row.get(0))?)
}

fn database_path(server: &str, database: &str) -> PathBuf {
    Path::new(server).join(format!("{}.db", database))
}

fn open_database(
    server: &str,
    database: &str,
    access_mode: AccessMode,
) -> Result<rusqlite::Connection> {
    if server == IN_MEMORY_SERVER {
        return Ok(rusqlite::Connection::open_in_memory()?);
    }

    if !Path::new(server).is_dir() {
        return Err(Error::Connection(format!(
            "data directory does not exist: {}",
            server
        )));
    }

    let path = database_path(server, database);
    let flags = match access_mode {
        AccessMode::ReadOnly => OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        AccessMode::ReadWrite => OpenFlags::default(),
    };

    tracing::debug!(path = %path.display(), %access_mode, "opening database");

    rusqlite::Connection::open_with_flags(&path, flags)
        .map_err(|e| Error::Connection(format!("cannot open {}: {}", path.display(), e)))
}
