use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Directory, relative to the service root, that holds every readable file.
pub const DATA_DIR: &str = "data";

/// Anchored whitelist for caller-supplied relative paths.
const DATA_PATH_PATTERN: &str = r"^data/[\w\-./]+$";

static DATA_PATH_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DATA_PATH_PATTERN).expect("data path pattern is a valid regex"));

/// Errors that can occur during path validation
#[derive(Debug, thiserror::Error)]
pub enum PathSecurityError {
    #[error("Missing path")]
    MissingPath,

    #[error("Invalid path")]
    InvalidPath { path: String },

    #[error("Invalid path: parent directory segments are not allowed")]
    ParentSegment { path: String },

    #[error("Path '{path}' is outside allowed root directory '{root}'")]
    OutsideRootDirectory { path: PathBuf, root: PathBuf },

    #[error("Cannot canonicalize path '{path}': {error}")]
    CannotCanonicalize { path: PathBuf, error: io::Error },

    #[error("Path does not exist: '{path}'")]
    PathNotFound { path: PathBuf },
}

/// How the validator treats `..` segments that the character whitelist lets through.
///
/// The whitelist admits `.` and `/`, so `data/../../etc/passwd` matches it.
/// `Literal` keeps that behaviour; `RejectParentSegments` refuses any `..`
/// segment before the filesystem is touched. Either way the reader still
/// checks containment after resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalPolicy {
    /// Whitelist pattern only.
    Literal,

    /// Whitelist pattern, and no `..` segments.
    #[default]
    RejectParentSegments,
}

impl fmt::Display for TraversalPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal => f.write_str("literal"),
            Self::RejectParentSegments => f.write_str("reject_parent_segments"),
        }
    }
}

/// A relative path that has been accepted by [`PathValidator`].
///
/// Only the validator can build one, which keeps the file reader
/// unreachable for strings that skipped validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPath(String);

impl ValidatedPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Join this path onto `root`.
    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.0)
    }
}

impl fmt::Display for ValidatedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pure predicate deciding whether a caller-supplied path may be resolved
/// beneath the service root. Never touches the filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathValidator {
    policy: TraversalPolicy,
}

impl PathValidator {
    pub fn new(policy: TraversalPolicy) -> Self {
        Self { policy }
    }

    /// Returns `true` when `path` would be accepted by [`check`](Self::check).
    pub fn is_valid(&self, path: &str) -> bool {
        self.check(Some(path)).is_ok()
    }

    /// Validates a possibly missing path argument.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use data_file_api::core::security::{PathValidator, TraversalPolicy};
    ///
    /// let validator = PathValidator::new(TraversalPolicy::Literal);
    /// assert!(validator.check(Some("data/config.yaml")).is_ok());
    /// assert!(validator.check(Some("/etc/passwd")).is_err());
    /// assert!(validator.check(None).is_err());
    /// ```
    pub fn check(&self, path: Option<&str>) -> Result<ValidatedPath, PathSecurityError> {
        let path = path.ok_or(PathSecurityError::MissingPath)?;

        if !DATA_PATH_REGEX.is_match(path) {
            return Err(PathSecurityError::InvalidPath {
                path: path.to_string(),
            });
        }

        if self.policy == TraversalPolicy::RejectParentSegments && has_parent_segment(path) {
            return Err(PathSecurityError::ParentSegment {
                path: path.to_string(),
            });
        }

        Ok(ValidatedPath(path.to_string()))
    }
}

fn has_parent_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment == "..")
}

/// Canonicalizes `path` and verifies it lies within (or equals) `root`.
///
/// Both sides are canonicalized so symlinks and `..` segments are resolved
/// before the comparison. Returns the canonical path on success.
pub fn ensure_within_root(path: &Path, root: &Path) -> Result<PathBuf, PathSecurityError> {
    let canonical_root = canonicalize_path(root)?;
    let canonical_path = canonicalize_path(path)?;

    if !is_within_root(&canonical_path, &canonical_root) {
        return Err(PathSecurityError::OutsideRootDirectory {
            path: canonical_path,
            root: canonical_root,
        });
    }

    Ok(canonical_path)
}

/// Checks if a path is within (or equal to) a root directory
fn is_within_root(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

fn canonicalize_path(path: &Path) -> Result<PathBuf, PathSecurityError> {
    path.canonicalize().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            PathSecurityError::PathNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PathSecurityError::CannotCanonicalize {
                path: path.to_path_buf(),
                error: e,
            }
        }
    })
}
