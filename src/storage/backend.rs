//! Backend trait for object storage operations

use super::error::StorageError;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::Duration;

/// Abstraction over the object store so the pipeline can run against S3,
/// LocalStack, or the in-memory backend used by tests and dry runs.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the entire object body
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError>;

    /// Write an object, replacing any existing object under the same key
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// Mint a signed GET URL for `bucket/key` valid for `expires_in`
    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError>;
}
