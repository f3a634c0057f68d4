//! Reading validated paths from the data directory.

use async_trait::async_trait;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use super::error::FileError;
use crate::core::security::{DATA_DIR, PathSecurityError, ValidatedPath, ensure_within_root};

/// Something that can produce the bytes behind a validated path.
#[async_trait]
pub trait FileReader: Send + Sync {
    /// Read the full contents of `path`.
    async fn read(&self, path: &ValidatedPath) -> Result<Vec<u8>, FileError>;
}

/// Reads files beneath a fixed root directory.
///
/// The target is canonicalized and must stay inside `<root>/data` after
/// symlinks and `..` segments are resolved. The blocking open/read runs on
/// the tokio blocking pool.
#[derive(Debug, Clone)]
pub struct SecureFileReader {
    root: PathBuf,
}

impl SecureFileReader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read_blocking(root: &Path, path: &ValidatedPath) -> Result<Vec<u8>, FileError> {
        let data_dir = root.join(DATA_DIR);
        let target = path.resolve(root);

        let resolved = ensure_within_root(&target, &data_dir).map_err(|e| match e {
            PathSecurityError::PathNotFound { .. } => FileError::not_found(path.as_str()),
            PathSecurityError::OutsideRootDirectory { path: resolved, .. } => {
                FileError::OutsideRoot {
                    path: path.to_string(),
                    resolved,
                }
            }
            PathSecurityError::CannotCanonicalize { error, .. } => {
                FileError::from_io(path.as_str(), error)
            }
            other => FileError::InvalidPath(other),
        })?;

        debug!("Resolved {} to {}", path, resolved.display());

        // Only regular files are opened; opening a FIFO would block the thread.
        let metadata =
            std::fs::metadata(&resolved).map_err(|e| FileError::from_io(path.as_str(), e))?;
        if !metadata.is_file() {
            return Err(FileError::not_found(path.as_str()));
        }

        // The handle is closed when `file` drops, on success and on every error return.
        let mut file = File::open(&resolved).map_err(|e| FileError::from_io(path.as_str(), e))?;
        let metadata = file
            .metadata()
            .map_err(|e| FileError::from_io(path.as_str(), e))?;

        // Re-checked on the handle that is actually read.
        if !metadata.is_file() {
            return Err(FileError::not_found(path.as_str()));
        }

        let mut contents = Vec::with_capacity(metadata.len() as usize);
        file.read_to_end(&mut contents)
            .map_err(|e| FileError::from_io(path.as_str(), e))?;

        Ok(contents)
    }
}

#[async_trait]
impl FileReader for SecureFileReader {
    #[instrument(skip_all, fields(path = %path))]
    async fn read(&self, path: &ValidatedPath) -> Result<Vec<u8>, FileError> {
        let root = self.root.clone();
        let owned = path.clone();

        tokio::task::spawn_blocking(move || Self::read_blocking(&root, &owned))
            .await
            .map_err(|e| FileError::Io {
                path: path.to_string(),
                source: io::Error::other(e),
            })?
    }
}
