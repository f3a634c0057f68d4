//! Core module containing shared infrastructure components.
//!
//! This module provides the foundational building blocks for the file API,
//! including error handling, configuration, the security gate, the composed
//! read operation and the HTTP transport.

pub mod config;
pub mod error;
pub mod security;
pub mod server;
pub mod transport;

pub use config::Config;
pub use error::{Error, ReadError, Result};
pub use security::{Authenticator, Credentials, PathSecurityError, PathValidator, TraversalPolicy};
pub use server::FileApi;
pub use transport::{HttpConfig, HttpTransport};
