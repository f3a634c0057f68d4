//! Transport layer for the file API.
//!
//! Serves the read endpoint over HTTP with axum. Request handling is
//! delegated to [`FileApi`](crate::core::FileApi); this layer only extracts
//! credentials and the path argument and serializes the outcome.

mod config;
mod error;
pub mod http;

pub use config::HttpConfig;
pub use error::{TransportError, TransportResult};
pub use http::HttpTransport;
