// Security module for path validation and access control
//
// This module keeps caller-supplied paths inside the data directory and
// gates every read behind a credential check.

pub mod identity;
pub mod path_validator;

pub use identity::{
    Authenticator, AuthorizedSubject, Credentials, IdentityProvider, StaticIdentityProvider,
};
pub use path_validator::{
    DATA_DIR, PathSecurityError, PathValidator, TraversalPolicy, ValidatedPath, ensure_within_root,
};
