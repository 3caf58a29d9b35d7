//! Error types for the anonymization engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can abort an anonymization run.
///
/// Any value of this type surfacing out of the run orchestrator means the
/// enclosing transaction has been rolled back: no partial rewrite is ever
/// committed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScrubError {
    /// Database error from `SQLite`.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O error on a descriptor or template file.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// The file being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error on the audit channel.
    #[error("audit channel error: {0}")]
    Audit(#[source] std::io::Error),

    /// The storage name computed for a domain collides with an existing
    /// table. Re-running requires manual cleanup: this is a destructive
    /// one-shot tool.
    #[error("storage name conflict: table {table} already exists")]
    StorageConflict {
        /// The conflicting table name.
        table: String,
    },

    /// A runtime-computed storage name contains characters that cannot be
    /// used as an SQL identifier.
    #[error("invalid storage name: {name}")]
    InvalidStorageName {
        /// The rejected name.
        name: String,
    },

    /// Invalid settings.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ScrubError {
    /// Wraps an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
