//! Data File API Library
//!
//! This crate serves the contents of files under a fixed `data/` directory
//! over HTTP, behind Basic authentication and a path whitelist that keeps
//! callers from escaping the root directory.
//!
//! # Architecture
//!
//! - **core**: configuration, error taxonomy, the security gate
//!   (path validation and authentication), the composed [`FileApi`] and the
//!   HTTP transport
//! - **domains**: business logic organized by bounded contexts
//!   - **files**: validated, root-contained file reads
//!
//! # Example
//!
//! ```rust,no_run
//! use data_file_api::core::{Config, FileApi, HttpTransport};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (config, _source) = Config::from_env()?;
//!     let transport = HttpTransport::new(config.http.clone());
//!     let api = FileApi::new(config)?;
//!     transport.run(api).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, FileApi, ReadError, Result};
