use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Configuration for a [`DatabaseDriver`](crate::DatabaseDriver).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database directory. `None` opens a temporary database removed on drop.
    pub path: Option<PathBuf>,
    /// Name of the tree holding payloads.
    pub table: String,
    /// Flush to disk after every write instead of relying on background flushes.
    pub flush_on_write: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            table: "storage".into(),
            flush_on_write: false,
        }
    }
}

impl DatabaseConfig {
    /// Persistent database at `path`, flushing on every write.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            flush_on_write: true,
            ..Default::default()
        }
    }
}

/// Configuration for a [`SqlDriver`](crate::SqlDriver).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SqlConfig {
    /// SQLite database file. `None` opens an in-memory database.
    pub path: Option<PathBuf>,
    /// Upper bound on pooled connections to a file database.
    pub max_connections: u32,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_connections: 4,
        }
    }
}

impl SqlConfig {
    /// Database file at `path`.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            ..Default::default()
        }
    }
}
