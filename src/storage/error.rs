//! Error types for object storage operations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Failed to read object body: {0}")]
    Body(String),

    #[error("Failed to sign URL: {0}")]
    Presign(String),
}
