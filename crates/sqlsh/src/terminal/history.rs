//! History file location
//!
//! Defaults to `~/.sqlsh_history`. `SQLSH_HISTORY` overrides the path; an
//! empty value disables history.

use std::env;
use std::path::PathBuf;

const DEFAULT_HISTORY_FILE: &str = ".sqlsh_history";
const HISTORY_ENV_VAR: &str = "SQLSH_HISTORY";

pub fn history_path() -> Option<PathBuf> {
    resolve(env::var(HISTORY_ENV_VAR).ok(), dirs::home_dir())
}

fn resolve(custom: Option<String>, home: Option<PathBuf>) -> Option<PathBuf> {
    match custom {
        Some(path) if path.is_empty() => None,
        Some(path) => Some(PathBuf::from(path)),
        None => home.map(|home| home.join(DEFAULT_HISTORY_FILE)),
    }
}
