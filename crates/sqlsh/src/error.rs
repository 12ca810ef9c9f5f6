//! Error types for sqlsh

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {}", .0.join("; "))]
    Config(Vec<String>),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("{0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Cursor error: {0}")]
    Cursor(String),

    #[error("{0}")]
    WriteNotAllowed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Input error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Interrupted")]
    Interrupted,
}
