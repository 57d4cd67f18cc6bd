//! Object storage access.
//!
//! The pipeline reads backgrounds and logos from, and writes mockups to, an
//! object store reached through the [`ObjectStore`] trait:
//!
//! - [`S3ObjectStore`]: AWS S3 (or any S3-compatible endpoint such as LocalStack)
//! - [`MockObjectStore`]: in-memory storage used by tests and `--dry-run`
//!
//! [`StorageLocation`] recognises references that point into S3.

pub mod backend;
mod error;
pub mod location;
pub mod mock_backend;
pub mod s3_backend;

pub use backend::ObjectStore;
pub use error::StorageError;
pub use location::StorageLocation;
pub use mock_backend::{MockObjectStore, PresignRecord, StoredObject};
pub use s3_backend::S3ObjectStore;
