//! The guarded entry point to file reads.
//!
//! [`FileService`] runs every path through the [`PathValidator`] before a
//! [`FileReader`] is allowed to see it.

use std::sync::Arc;
use tracing::{debug, error, warn};

use super::error::FileError;
use super::reader::FileReader;
use crate::core::security::PathValidator;

/// Validates a path and then reads it.
#[derive(Clone)]
pub struct FileService {
    validator: PathValidator,
    reader: Arc<dyn FileReader>,
}

impl FileService {
    pub fn new(validator: PathValidator, reader: Arc<dyn FileReader>) -> Self {
        Self { validator, reader }
    }

    /// Read the file behind a caller-supplied relative path.
    ///
    /// Invalid paths are rejected without touching the filesystem.
    pub async fn read(&self, path: Option<&str>) -> Result<Vec<u8>, FileError> {
        let validated = match self.validator.check(path) {
            Ok(p) => p,
            Err(e) => {
                debug!("Rejected path {:?}: {}", path, e);
                return Err(e.into());
            }
        };

        let result = self.reader.read(&validated).await;
        match &result {
            Ok(bytes) => debug!("Read {} bytes from {}", bytes.len(), validated),
            Err(e @ FileError::Io { .. }) => error!("Failed to read {}: {}", validated, e),
            Err(e) => warn!("Cannot serve {}: {}", validated, e),
        }
        result
    }
}
