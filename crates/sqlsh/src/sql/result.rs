use crate::driver::CellValue;
use std::collections::BTreeMap;

/// Outcome of running one statement.
///
/// `rows[0]` is the header whenever `rows` is non-empty. `error_message` and
/// non-empty `rows` never occur together.
///
/// `rows` holds the display text; `columns` and `values` keep what the
/// driver returned, for writers that need the real types.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    pub command_text: String,
    pub column_count: usize,
    pub rows: Vec<Vec<String>>,
    /// Column names, present even when the result set is empty
    pub columns: Vec<String>,
    /// Typed cells in row order; `None` is NULL
    pub values: Vec<Vec<Option<CellValue>>>,
    /// Column index to rendered width; filled in by [`crate::format::format`]
    pub column_padding: BTreeMap<usize, usize>,
    pub error_message: Option<String>,
    /// Set by statements executed for effect
    pub rows_affected: Option<usize>,
    /// Name of the database a successful `USE` switched to
    pub database_changed: Option<String>,
}

impl ExecutionResult {
    pub fn failed(command_text: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            command_text: command_text.into(),
            error_message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        self.error_message.is_some()
    }

    pub fn has_rows(&self) -> bool {
        !self.rows.is_empty()
    }

    pub fn is_formatted(&self) -> bool {
        !self.column_padding.is_empty()
    }

    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Every row after the header
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or(&[])
    }
}
