//! File domain error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::security::PathSecurityError;

/// Errors that can occur while serving a file.
#[derive(Debug, Error)]
pub enum FileError {
    /// The caller-supplied path was rejected before any filesystem access.
    #[error(transparent)]
    InvalidPath(#[from] PathSecurityError),

    /// The validated path does not name an existing regular file.
    #[error("File not found: {0}")]
    NotFound(String),

    /// The file exists but the process may not read it.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// The path matched the whitelist but resolved outside the data directory.
    #[error("Path '{path}' resolves outside the data directory")]
    OutsideRoot { path: String, resolved: PathBuf },

    /// Any other read failure.
    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl FileError {
    /// Create a new "not found" error.
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Create a new "access denied" error.
    pub fn access_denied(path: impl Into<String>) -> Self {
        Self::AccessDenied(path.into())
    }

    /// Translate an I/O failure for `path` into the matching error kind.
    pub fn from_io(path: impl Into<String>, error: io::Error) -> Self {
        let path = path.into();
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path),
            io::ErrorKind::PermissionDenied => Self::AccessDenied(path),
            _ => Self::Io {
                path,
                source: error,
            },
        }
    }
}
