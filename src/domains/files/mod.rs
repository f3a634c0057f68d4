//! Files domain module.
//!
//! This module serves the contents of files that live beneath the service's
//! `data/` directory.
//!
//! ## Architecture
//!
//! - `reader.rs` - [`FileReader`] trait and the filesystem-backed [`SecureFileReader`]
//! - `service.rs` - [`FileService`], the only entry point that validates before reading
//! - `error.rs` - [`FileError`] taxonomy

mod error;
mod reader;
mod service;

pub use error::FileError;
pub use reader::{FileReader, SecureFileReader};
pub use service::FileService;
