//! The composed read operation.
//!
//! [`FileApi`] owns the three components and runs them in a fixed order for
//! every request:
//!
//! ```text
//! RECEIVED → AUTHENTICATING ─┬─ UNAUTHORIZED
//!                            └─ AUTHORIZED → VALIDATING_PATH ─┬─ INVALID_PATH
//!                                                             └─ VALID → READING → SUCCESS | READ_ERROR
//! ```
//!
//! Transports call [`FileApi::read_file`] and never reach the validator or
//! the reader directly.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::config::Config;
use super::error::{ReadError, Result};
use super::security::{
    Authenticator, AuthorizedSubject, Credentials, IdentityProvider, PathValidator,
    StaticIdentityProvider, TraversalPolicy,
};
use crate::domains::files::{FileReader, FileService, SecureFileReader};

/// The authenticated file reader behind the HTTP endpoint.
#[derive(Clone)]
pub struct FileApi {
    /// Server configuration.
    config: Arc<Config>,

    /// Credential gate.
    authenticator: Authenticator,

    /// Validates and reads paths.
    files: FileService,
}

impl FileApi {
    /// Create the API with the built-in identity and the filesystem reader.
    pub fn new(config: Config) -> Result<Self> {
        let root_dir = config.resolve_root_dir()?;
        let reader = Arc::new(SecureFileReader::new(&root_dir));
        Ok(Self::with_components(
            config,
            root_dir,
            Arc::new(StaticIdentityProvider::default()),
            reader,
        ))
    }

    /// Create the API from explicit collaborators.
    pub fn with_components(
        config: Config,
        root_dir: PathBuf,
        identities: Arc<dyn IdentityProvider>,
        reader: Arc<dyn FileReader>,
    ) -> Self {
        let policy = config.security.traversal_policy;
        if policy == TraversalPolicy::Literal {
            warn!(
                "Traversal policy is 'literal': '..' segments pass validation and are only \
                 stopped by the containment check after resolution"
            );
        }

        info!(
            "Serving {}/data with traversal policy '{}'",
            root_dir.display(),
            policy
        );

        Self {
            config: Arc::new(config),
            authenticator: Authenticator::new(identities),
            files: FileService::new(PathValidator::new(policy), reader),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Authenticate, validate, then read.
    ///
    /// Authentication always runs first, so an unauthorized caller learns
    /// nothing about the path, including whether it is well formed.
    #[instrument(skip_all)]
    pub async fn read_file(
        &self,
        credentials: Option<&Credentials>,
        path: Option<&str>,
    ) -> std::result::Result<Vec<u8>, ReadError> {
        let subject = self.authorize(credentials).await?;
        info!("Read requested by '{}' for {:?}", subject.sub, path);

        Ok(self.files.read(path).await?)
    }

    async fn authorize(
        &self,
        credentials: Option<&Credentials>,
    ) -> std::result::Result<AuthorizedSubject, ReadError> {
        match self.authenticator.authorize(credentials).await {
            Some(subject) if subject.active => Ok(subject),
            _ => {
                warn!("Unauthorized read attempt");
                Err(ReadError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::security::ValidatedPath;
    use crate::domains::files::FileError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingReader {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl FileReader for RecordingReader {
        async fn read(&self, path: &ValidatedPath) -> std::result::Result<Vec<u8>, FileError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match path.as_str() {
                "data/exists.txt" => Ok(b"contents".to_vec()),
                "data/locked.txt" => Err(FileError::access_denied(path.as_str())),
                _ => Err(FileError::not_found(path.as_str())),
            }
        }
    }

    fn build_api(policy: TraversalPolicy) -> (FileApi, Arc<RecordingReader>) {
        let mut config = Config::default();
        config.security.traversal_policy = policy;
        let reader = Arc::new(RecordingReader::default());
        let api = FileApi::with_components(
            config,
            PathBuf::from("/srv/app"),
            Arc::new(StaticIdentityProvider::default()),
            reader.clone(),
        );
        (api, reader)
    }

    fn valid_creds() -> Credentials {
        Credentials::new("wazuh", "test")
    }

    #[tokio::test]
    async fn test_authorized_read_succeeds() {
        let (api, reader) = build_api(TraversalPolicy::RejectParentSegments);

        let bytes = api
            .read_file(Some(&valid_creds()), Some("data/exists.txt"))
            .await
            .unwrap();

        assert_eq!(bytes, b"contents");
        assert_eq!(reader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_never_validates_or_reads() {
        let (api, reader) = build_api(TraversalPolicy::RejectParentSegments);
        let wrong = Credentials::new("wazuh", "wrong");

        for path in [Some("data/exists.txt"), Some("data/missing.txt"), Some("/etc/passwd"), None] {
            assert_eq!(
                api.read_file(Some(&wrong), path).await,
                Err(ReadError::Unauthorized)
            );
            assert_eq!(api.read_file(None, path).await, Err(ReadError::Unauthorized));
        }

        assert_eq!(reader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_path_is_rejected_before_reading() {
        let (api, reader) = build_api(TraversalPolicy::RejectParentSegments);

        let result = api.read_file(Some(&valid_creds()), Some("data/a;b")).await;

        assert!(matches!(result, Err(ReadError::InvalidPath(_))));
        assert_eq!(reader.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_traversal_policy_is_taken_from_config() {
        let (hardened, hardened_reader) = build_api(TraversalPolicy::RejectParentSegments);
        let (literal, literal_reader) = build_api(TraversalPolicy::Literal);
        let path = Some("data/../../etc/passwd");

        assert!(matches!(
            hardened.read_file(Some(&valid_creds()), path).await,
            Err(ReadError::InvalidPath(_))
        ));
        assert_eq!(hardened_reader.calls.load(Ordering::SeqCst), 0);

        // Literal lets the path through to the reader.
        assert!(matches!(
            literal.read_file(Some(&valid_creds()), path).await,
            Err(ReadError::NotFound(_))
        ));
        assert_eq!(literal_reader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_reader_errors_keep_their_kind() {
        let (api, _) = build_api(TraversalPolicy::RejectParentSegments);

        assert_eq!(
            api.read_file(Some(&valid_creds()), Some("data/missing.txt")).await,
            Err(ReadError::NotFound("data/missing.txt".to_string()))
        );
        assert_eq!(
            api.read_file(Some(&valid_creds()), Some("data/locked.txt")).await,
            Err(ReadError::AccessDenied("data/locked.txt".to_string()))
        );
    }
}
