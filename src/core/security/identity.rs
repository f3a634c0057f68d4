//! Credential checking for the read endpoint.
//!
//! Identities are looked up through the [`IdentityProvider`] trait so the
//! built-in account can be swapped for a real credential store without
//! touching the request path.

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Username of the built-in identity.
pub const DEFAULT_USERNAME: &str = "wazuh";

/// Password of the built-in identity.
pub const DEFAULT_PASSWORD: &str = "test";

/// A username/password pair supplied by a caller.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Parse an HTTP `Authorization` header value using the Basic scheme.
    ///
    /// Returns `None` for any other scheme or for a malformed payload.
    pub fn from_basic_auth(header_value: &str) -> Option<Self> {
        let (scheme, encoded) = header_value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (username, password) = decoded.split_once(':')?;

        Some(Self::new(username, password))
    }
}

/// Custom Debug implementation to redact secrets from logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// The identity record returned after a successful credential match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizedSubject {
    /// Subject identifier (the username).
    pub sub: String,

    /// Whether the subject is active.
    pub active: bool,
}

/// Source of identities that can be checked against supplied credentials.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Returns the subject for a matching pair, `None` otherwise.
    ///
    /// Implementations must not reveal which field failed to match.
    async fn verify(&self, username: &str, password: &str) -> Option<AuthorizedSubject>;
}

/// An identity provider holding exactly one fixed account.
pub struct StaticIdentityProvider {
    username: String,
    password: String,
}

impl StaticIdentityProvider {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Default for StaticIdentityProvider {
    fn default() -> Self {
        Self::new(DEFAULT_USERNAME, DEFAULT_PASSWORD)
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn verify(&self, username: &str, password: &str) -> Option<AuthorizedSubject> {
        // Evaluate both comparisons so the outcome takes the same path
        // whichever field is wrong.
        let username_matches = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let password_matches = constant_time_eq(password.as_bytes(), self.password.as_bytes());

        (username_matches & password_matches).then(|| AuthorizedSubject {
            sub: username.to_string(),
            active: true,
        })
    }
}

/// Gate in front of the read operation.
#[derive(Clone)]
pub struct Authenticator {
    provider: Arc<dyn IdentityProvider>,
}

impl Authenticator {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    /// Check a credential pair. `None` means unauthorized.
    pub async fn authenticate(&self, username: &str, password: &str) -> Option<AuthorizedSubject> {
        let subject = self.provider.verify(username, password).await;
        if subject.is_none() {
            debug!("Credential check failed");
        }
        subject
    }

    /// Like [`authenticate`](Self::authenticate), treating absent credentials as a mismatch.
    pub async fn authorize(&self, credentials: Option<&Credentials>) -> Option<AuthorizedSubject> {
        match credentials {
            Some(c) => self.authenticate(&c.username, &c.password).await,
            None => {
                debug!("No credentials supplied");
                None
            }
        }
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new(Arc::new(StaticIdentityProvider::default()))
    }
}

/// Compares two byte strings without short-circuiting on the first mismatch.
///
/// The length of the inputs is not hidden.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
