//! Connection configuration built from the command line.

use crate::error::{Error, Result};
use std::fmt;

pub const DEFAULT_DATABASE: &str = "main";

/// Whether the session may dispatch mutating statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessMode {
    #[default]
    ReadOnly,
    ReadWrite,
}

impl AccessMode {
    pub fn from_read_write_flag(read_write: bool) -> Self {
        if read_write {
            AccessMode::ReadWrite
        } else {
            AccessMode::ReadOnly
        }
    }

    pub fn allows_writes(self) -> bool {
        self == AccessMode::ReadWrite
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::ReadOnly => write!(f, "ReadOnly"),
            AccessMode::ReadWrite => write!(f, "ReadWrite"),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// A validated set of connection parameters.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Data directory holding the database files, or `:memory:`
    pub server: String,
    pub database: String,
    /// `None` means integrated (trusted) authentication
    pub credentials: Option<Credentials>,
    pub access_mode: AccessMode,
}

impl ConnectionConfig {
    /// Validate raw parameters, collecting every problem instead of stopping
    /// at the first one.
    pub fn new(
        server: Option<String>,
        database: Option<String>,
        user: Option<String>,
        password: Option<String>,
        access_mode: AccessMode,
    ) -> Result<Self> {
        let server = non_blank(server);
        let database = non_blank(database);
        let user = non_blank(user);
        let password = non_blank(password);

        let mut errors = Vec::new();

        if server.is_none() {
            errors.push("missing server name".to_string());
        }

        if database.is_none() {
            errors.push("missing database name".to_string());
        }

        if user.is_some() && password.is_none() {
            errors.push("a password is required if supplying a user name".to_string());
        }

        if user.is_none() && password.is_some() {
            errors.push("a user name is required if supplying a password".to_string());
        }

        match (server, database) {
            (Some(server), Some(database)) if errors.is_empty() => Ok(Self {
                server,
                database,
                credentials: user
                    .zip(password)
                    .map(|(user, password)| Credentials { user, password }),
                access_mode,
            }),
            _ => Err(Error::Config(errors)),
        }
    }

    pub fn uses_integrated_auth(&self) -> bool {
        self.credentials.is_none()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
