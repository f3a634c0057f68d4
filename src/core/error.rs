//! Error types and handling for the file API.
//!
//! [`Error`] covers configuration and startup failures. [`ReadError`] is the
//! taxonomy a read request can end in; the HTTP layer maps each kind to its
//! own status code.

use thiserror::Error;

use crate::domains::files::FileError;

/// A specialized Result type for file API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading configuration or starting the server.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configuration file is not valid YAML for [`Config`](crate::core::Config).
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O errors from file operations or network communication.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Terminal failure states of a read request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    /// The path failed validation or resolved outside the data directory.
    #[error("{0}")]
    InvalidPath(String),

    /// Credentials were missing or did not match, whichever field was wrong.
    #[error("Unauthorized")]
    Unauthorized,

    /// The validated path does not resolve to an existing file.
    #[error("File not found: {0}")]
    NotFound(String),

    /// The file exists but cannot be read by this process.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Any other read failure.
    #[error("I/O failure: {0}")]
    IoFailure(String),
}

impl From<FileError> for ReadError {
    fn from(err: FileError) -> Self {
        match err {
            FileError::InvalidPath(e) => Self::InvalidPath(e.to_string()),
            e @ FileError::OutsideRoot { .. } => Self::InvalidPath(e.to_string()),
            FileError::NotFound(path) => Self::NotFound(path),
            FileError::AccessDenied(path) => Self::AccessDenied(path),
            e @ FileError::Io { .. } => Self::IoFailure(e.to_string()),
        }
    }
}
