use super::guard::{is_row_returning, split_database_switch, AccessGuard, GuardVerdict};
use super::ExecutionResult;
use crate::config::AccessMode;
use crate::driver::{Connection, RowCursor};
use crate::error::{Error, Result};
use crate::format;

/// How a NULL cell is shown
pub const NULL_TOKEN: &str = "<null>";

/// Executes statements against one connection under a fixed access mode
pub struct SqlEngine<C: Connection> {
    conn: C,
    guard: AccessGuard,
}

impl<C: Connection> SqlEngine<C> {
    pub fn new(conn: C, access_mode: AccessMode) -> Self {
        Self {
            conn,
            guard: AccessGuard::new(access_mode),
        }
    }

    pub fn access_mode(&self) -> AccessMode {
        self.guard.mode()
    }

    /// Run one statement. Rejections and driver failures come back as
    /// `error_message`.
    pub fn execute_command(&mut self, sql: &str) -> ExecutionResult {
        if let GuardVerdict::Rejected(reason) = self.guard.check(sql) {
            tracing::debug!(mode = %self.access_mode(), "rejected mutating statement");
            return ExecutionResult::failed(sql, Error::WriteNotAllowed(reason).to_string());
        }

        let outcome = if is_row_returning(sql) {
            self.execute_reader(sql)
        } else {
            self.execute_non_query(sql)
        };

        match outcome {
            Ok(mut result) => {
                result.database_changed = split_database_switch(sql).map(|s| s.database);
                result
            }
            Err(e) => {
                tracing::debug!(error = %e, "statement failed");
                ExecutionResult::failed(sql, e.to_string())
            }
        }
    }

    /// Release the connection. Safe to call more than once.
    pub fn close(&mut self) -> Result<()> {
        self.conn.close()
    }

    fn execute_reader(&mut self, sql: &str) -> Result<ExecutionResult> {
        let raw = self.read_raw_results(sql)?;
        Ok(format::format(raw))
    }

    fn execute_non_query(&mut self, sql: &str) -> Result<ExecutionResult> {
        let affected = self.conn.execute(sql)?;
        tracing::debug!(affected, "statement executed");

        Ok(ExecutionResult {
            command_text: sql.to_string(),
            rows_affected: Some(affected),
            ..Default::default()
        })
    }

    /// Read the whole result set: the header first, then every data row as
    /// text. A result set without rows produces no header either.
    fn read_raw_results(&mut self, sql: &str) -> Result<ExecutionResult> {
        let mut raw = ExecutionResult {
            command_text: sql.to_string(),
            ..Default::default()
        };

        self.conn.query(sql, &mut |cursor: &mut dyn RowCursor| {
            raw.column_count = cursor.column_count();
            raw.columns = (0..raw.column_count)
                .map(|i| cursor.column_name(i))
                .collect::<Result<Vec<_>>>()?;

            if !cursor.has_rows()? {
                return Ok(());
            }

            raw.rows.push(raw.columns.clone());

            while cursor.next()? {
                let values = (0..raw.column_count)
                    .map(|i| cursor.value(i))
                    .collect::<Result<Vec<_>>>()?;
                let row = values
                    .iter()
                    .map(|v| match v {
                        Some(v) => v.to_string(),
                        None => NULL_TOKEN.to_string(),
                    })
                    .collect();
                raw.rows.push(row);
                raw.values.push(values);
            }

            Ok(())
        })?;

        tracing::debug!(rows = raw.rows.len(), "result set read");
        Ok(raw)
    }
}
