//! Access guard for mutating statements
//!
//! Classification is a substring heuristic over the upper-cased statement,
//! not a parser: a string literal such as `'DROP ME'` counts as a `DROP`.

use crate::config::AccessMode;
use regex::Regex;
use std::sync::LazyLock;

pub const READ_ONLY_ADVISORY: &str = "This session can only execute SELECT queries. \
     Start another session using the '--rw' flag if DDL statements are to be executed.";

const MUTATING_MARKERS: [&str; 6] = ["INSERT ", "UPDATE ", "DELETE ", "CREATE ", "ALTER ", "DROP "];

const ROW_RETURNING_MARKER: &str = "SELECT ";

static USE_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*USE\s+([\[\]"`\w]+)\s*(?:;|$)"#).expect("valid USE pattern")
});

/// Client-side policy check, independent of anything the server enforces
#[derive(Debug, Clone, Copy)]
pub struct AccessGuard {
    mode: AccessMode,
}

/// Outcome of an access check
#[derive(Debug, PartialEq, Eq)]
pub enum GuardVerdict {
    Allowed,
    Rejected(String),
}

impl AccessGuard {
    pub fn new(mode: AccessMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn check(&self, sql: &str) -> GuardVerdict {
        if is_mutating(sql) && !self.mode.allows_writes() {
            return GuardVerdict::Rejected(READ_ONLY_ADVISORY.to_string());
        }
        GuardVerdict::Allowed
    }
}

/// A leading `USE <database>` statement and whatever follows it
#[derive(Debug, PartialEq, Eq)]
pub struct DatabaseSwitch<'a> {
    pub database: String,
    pub remainder: &'a str,
}

pub fn is_mutating(sql: &str) -> bool {
    let sql_normalized = normalize_sql(sql);
    MUTATING_MARKERS
        .iter()
        .any(|marker| sql_normalized.contains(marker))
}

pub fn is_row_returning(sql: &str) -> bool {
    normalize_sql(sql).contains(ROW_RETURNING_MARKER)
}

/// Detect a statement that starts by switching the current database.
pub fn split_database_switch(sql: &str) -> Option<DatabaseSwitch<'_>> {
    let caps = USE_STATEMENT.captures(sql)?;
    let whole = caps.get(0)?;
    let database: String = caps[1]
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | '"' | '`'))
        .collect();

    if database.is_empty() {
        return None;
    }

    Some(DatabaseSwitch {
        database,
        remainder: &sql[whole.end()..],
    })
}

/// Upper-case and collapse runs of whitespace into single spaces
fn normalize_sql(sql: &str) -> String {
    sql.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}
