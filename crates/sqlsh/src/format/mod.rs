//! Result formatting
//!
//! [`format`] pads a raw result so every column lines up; [`render`] turns a
//! formatted result into styled lines:
//!
//! ```text
//! +-----+------+
//! |id   |name  |
//! +-----+------+
//! |1    |Alice |
//! +-----+------+
//! ```
//!
//! A column is as wide as its longest value (header included) plus two.

use crate::sql::ExecutionResult;
use crate::terminal::Style;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use colored::Color;
use std::collections::BTreeMap;

const COLUMN_GAP: usize = 2;

const HEADER_COLOR: Color = Color::Magenta;

const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

const TIME_FORMATS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// One run of text in a single style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub style: Style,
}

impl Segment {
    fn new(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

pub type Line = Vec<Segment>;

/// Value type guessed from a cell's text, used to pick its color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Numeric,
    Boolean,
    DateTime,
    Text,
}

impl ValueKind {
    pub fn color(self) -> Color {
        match self {
            ValueKind::Numeric => Color::Red,
            ValueKind::Boolean => Color::Green,
            ValueKind::DateTime => Color::Cyan,
            ValueKind::Text => Color::Yellow,
        }
    }
}

/// Probe in fixed order: number, boolean, date/time, text. Only finite
/// numbers count, so `NaN` and `inf` are text.
pub fn classify(value: &str) -> ValueKind {
    let value = value.trim();

    if value.parse::<f64>().is_ok_and(f64::is_finite) {
        return ValueKind::Numeric;
    }

    if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
        return ValueKind::Boolean;
    }

    if is_datetime(value) {
        return ValueKind::DateTime;
    }

    ValueKind::Text
}

fn is_datetime(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(value, f).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|f| NaiveDate::parse_from_str(value, f).is_ok())
        || TIME_FORMATS
            .iter()
            .any(|f| NaiveTime::parse_from_str(value, f).is_ok())
}

/// Width of every column: longest value plus [`COLUMN_GAP`].
pub fn column_padding(rows: &[Vec<String>], column_count: usize) -> BTreeMap<usize, usize> {
    (0..column_count)
        .map(|i| {
            let widest = rows
                .iter()
                .filter_map(|row| row.get(i))
                .map(|value| value.chars().count())
                .max()
                .unwrap_or(0);
            (i, widest + COLUMN_GAP)
        })
        .collect()
}

/// Pad every cell of a raw result to its column width.
///
/// Errors, empty results and results that already carry padding come back
/// unchanged.
pub fn format(raw: ExecutionResult) -> ExecutionResult {
    if raw.error_message.is_some() || raw.rows.is_empty() || raw.is_formatted() {
        return raw;
    }

    let column_padding = column_padding(&raw.rows, raw.column_count);

    let rows = raw
        .rows
        .iter()
        .map(|row| {
            (0..raw.column_count)
                .map(|i| {
                    let value = row.get(i).map(String::as_str).unwrap_or("");
                    format!("{:<width$}", value, width = column_padding[&i])
                })
                .collect()
        })
        .collect();

    ExecutionResult {
        rows,
        column_padding,
        ..raw
    }
}

/// Lay out a formatted result as bordered, colored lines.
pub fn render(result: &ExecutionResult) -> Vec<Line> {
    let Some((header, body)) = result.rows.split_first() else {
        return Vec::new();
    };

    let border = border_line(&result.column_padding);
    let mut lines = Vec::with_capacity(body.len() + 4);

    lines.push(border.clone());
    lines.push(row_line(header, |_| Style::fg(HEADER_COLOR)));
    lines.push(border.clone());
    for row in body {
        lines.push(row_line(row, |value| Style::fg(classify(value).color())));
    }
    lines.push(border);

    lines
}

/// Trailing summary printed under a result, if any
pub fn summary(result: &ExecutionResult) -> Option<String> {
    if result.error_message.is_some() {
        return None;
    }

    if result.has_rows() {
        let count = result.data_rows().len();
        return Some(format!("({} {})", count, plural(count, "row")));
    }

    match result.rows_affected {
        Some(count) => Some(format!(
            "Query OK, {} {} affected",
            count,
            plural(count, "row")
        )),
        None => Some("(0 rows)".to_string()),
    }
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

fn border_line(column_padding: &BTreeMap<usize, usize>) -> Line {
    let mut text = String::from("+");
    for width in column_padding.values() {
        text.push_str(&"-".repeat(*width));
        text.push('+');
    }
    vec![Segment::new(text, Style::PLAIN)]
}

fn row_line(row: &[String], style_for: impl Fn(&str) -> Style) -> Line {
    let mut line = vec![Segment::new("|", Style::PLAIN)];
    for value in row {
        line.push(Segment::new(value.clone(), style_for(value)));
        line.push(Segment::new("|", Style::PLAIN));
    }
    line
}
