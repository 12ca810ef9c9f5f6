//! One-shot output writers for `--execute`
//!
//! Table output reuses the bordered renderer. JSON and CSV are written from
//! the typed values the driver returned, so text that looks like a number
//! stays text and nothing is trimmed.

use crate::driver::CellValue;
use crate::error::Result;
use crate::format;
use crate::sql::ExecutionResult;
use crate::terminal::paint;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

pub struct OutputWriter<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    /// Write a successful result. Failed results are reported by the caller.
    pub fn write_result(&mut self, result: &ExecutionResult) -> Result<()> {
        match self.format {
            OutputFormat::Table => self.write_table(result),
            OutputFormat::Json => self.write_json(result),
            OutputFormat::Csv => self.write_csv(result),
        }
    }

    fn write_table(&mut self, result: &ExecutionResult) -> Result<()> {
        for line in format::render(result) {
            let text: String = line
                .iter()
                .map(|segment| paint(&segment.text, segment.style))
                .collect();
            writeln!(self.writer, "{}", text)?;
        }
        if let Some(summary) = format::summary(result) {
            writeln!(self.writer, "{}", summary)?;
        }
        Ok(())
    }

    fn write_json(&mut self, result: &ExecutionResult) -> Result<()> {
        let value = if !result.columns.is_empty() {
            let keys = unique_keys(&result.columns);
            let objects = result
                .values
                .iter()
                .map(|row| {
                    let object: Map<String, Value> = keys
                        .iter()
                        .cloned()
                        .zip(row.iter().map(json_value))
                        .collect();
                    Value::Object(object)
                })
                .collect();
            Value::Array(objects)
        } else if let Some(affected) = result.rows_affected {
            serde_json::json!({ "rows_affected": affected })
        } else {
            Value::Array(Vec::new())
        };

        let json = serde_json::to_string_pretty(&value)?;
        writeln!(self.writer, "{}", json)?;
        Ok(())
    }

    /// Raw column names and values; NULL is an empty field.
    fn write_csv(&mut self, result: &ExecutionResult) -> Result<()> {
        let mut csv = csv::Writer::from_writer(&mut self.writer);

        if !result.columns.is_empty() {
            csv.write_record(&result.columns)?;
            for row in &result.values {
                csv.write_record(
                    row.iter()
                        .map(|cell| cell.as_ref().map(|v| v.to_string()).unwrap_or_default()),
                )?;
            }
        } else if let Some(affected) = result.rows_affected {
            csv.write_record(["rows_affected"])?;
            csv.write_record([affected.to_string()])?;
        }

        csv.flush()?;
        Ok(())
    }
}

/// Object keys in column order. A repeated name gets `_2`, `_3`, ...
fn unique_keys(columns: &[String]) -> Vec<String> {
    let mut used = HashSet::new();
    columns
        .iter()
        .map(|name| {
            let mut key = name.clone();
            let mut n = 1;
            while !used.insert(key.clone()) {
                n += 1;
                key = format!("{}_{}", name, n);
            }
            key
        })
        .collect()
}

/// JSON for a cell, typed by what the driver returned. Blobs use their hex
/// text.
fn json_value(cell: &Option<CellValue>) -> Value {
    match cell {
        None => Value::Null,
        Some(CellValue::Integer(i)) => Value::from(*i),
        Some(CellValue::Real(f)) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        Some(CellValue::Text(s)) => Value::String(s.clone()),
        Some(blob @ CellValue::Blob(_)) => Value::String(blob.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::NULL_TOKEN;

    fn text(v: &str) -> Option<CellValue> {
        Some(CellValue::Text(v.to_string()))
    }

    /// A formatted result built the way the engine builds one
    fn result(columns: &[&str], values: Vec<Vec<Option<CellValue>>>) -> ExecutionResult {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let mut rows = Vec::new();
        if !values.is_empty() {
            rows.push(columns.clone());
            rows.extend(values.iter().map(|row| {
                row.iter()
                    .map(|v| match v {
                        Some(v) => v.to_string(),
                        None => NULL_TOKEN.to_string(),
                    })
                    .collect::<Vec<_>>()
            }));
        }

        format::format(ExecutionResult {
            command_text: "SELECT".to_string(),
            column_count: columns.len(),
            rows,
            columns,
            values,
            ..Default::default()
        })
    }

    fn write(format: OutputFormat, result: &ExecutionResult) -> String {
        let mut buf = Vec::new();
        OutputWriter::new(&mut buf, format)
            .write_result(result)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_table_output() {
        let result = result(&["id", "name"], vec![vec![Some(CellValue::Integer(1)), text("Alice")]]);
        let ansi = regex::Regex::new(r"\x1b\[[0-9;]*m").unwrap();
        let out = ansi
            .replace_all(&write(OutputFormat::Table, &result), "")
            .into_owned();

        assert_eq!(
            out,
            "+----+-------+\n|id  |name   |\n+----+-------+\n|1   |Alice  |\n+----+-------+\n(1 row)\n"
        );
    }

    #[test]
    fn test_json_output_is_typed() {
        let result = result(
            &["id", "score", "name", "note", "data"],
            vec![vec![
                Some(CellValue::Integer(1)),
                Some(CellValue::Real(2.5)),
                text("Alice"),
                None,
                Some(CellValue::Blob(vec![0xCA, 0xFE])),
            ]],
        );
        let parsed: Value = serde_json::from_str(&write(OutputFormat::Json, &result)).unwrap();

        assert_eq!(
            parsed,
            serde_json::json!([
                {"id": 1, "score": 2.5, "name": "Alice", "note": null, "data": "0xCAFE"}
            ])
        );
    }

    #[test]
    fn test_json_keeps_text_that_looks_typed() {
        let result = result(
            &["code", "s", "t", "big"],
            vec![vec![
                text("007"),
                text("abc  "),
                text("true"),
                text("9007199254740993"),
            ]],
        );
        let parsed: Value = serde_json::from_str(&write(OutputFormat::Json, &result)).unwrap();

        assert_eq!(
            parsed,
            serde_json::json!([
                {"code": "007", "s": "abc  ", "t": "true", "big": "9007199254740993"}
            ])
        );
    }

    #[test]
    fn test_json_keys_follow_columns_and_duplicates_survive() {
        let result = result(
            &["z", "a", "a", "m"],
            vec![vec![
                Some(CellValue::Integer(1)),
                Some(CellValue::Integer(2)),
                Some(CellValue::Integer(3)),
                Some(CellValue::Integer(4)),
            ]],
        );
        let parsed: Value = serde_json::from_str(&write(OutputFormat::Json, &result)).unwrap();

        let keys: Vec<&str> = parsed[0]
            .as_object()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["z", "a", "a_2", "m"]);
        assert_eq!(parsed[0]["a"], 2);
        assert_eq!(parsed[0]["a_2"], 3);
    }

    #[test]
    fn test_unique_keys_skip_names_already_taken() {
        let columns: Vec<String> = ["a", "a_2", "a"].iter().map(|c| c.to_string()).collect();
        assert_eq!(unique_keys(&columns), vec!["a", "a_2", "a_3"]);
    }

    #[test]
    fn test_json_non_query() {
        let result = ExecutionResult {
            rows_affected: Some(4),
            ..Default::default()
        };
        let parsed: Value = serde_json::from_str(&write(OutputFormat::Json, &result)).unwrap();
        assert_eq!(parsed, serde_json::json!({"rows_affected": 4}));
    }

    #[test]
    fn test_json_empty_result() {
        let result = result(&["a"], Vec::new());
        assert_eq!(write(OutputFormat::Json, &result).trim(), "[]");
    }

    #[test]
    fn test_csv_output_keeps_values_untrimmed() {
        let result = result(
            &["id", "name", "note"],
            vec![vec![Some(CellValue::Integer(1)), text("Smith, Jo  "), None]],
        );
        assert_eq!(
            write(OutputFormat::Csv, &result),
            "id,name,note\n1,\"Smith, Jo  \",\n"
        );
    }

    #[test]
    fn test_csv_empty_result_has_header_only() {
        let result = result(&["a", "b"], Vec::new());
        assert_eq!(write(OutputFormat::Csv, &result), "a,b\n");
    }

    #[test]
    fn test_csv_non_query() {
        let result = ExecutionResult {
            rows_affected: Some(2),
            ..Default::default()
        };
        assert_eq!(write(OutputFormat::Csv, &result), "rows_affected\n2\n");
    }
}
