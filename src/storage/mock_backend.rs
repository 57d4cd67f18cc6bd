//! In-memory object store (HashMap storage) for tests and dry runs

use super::backend::ObjectStore;
use super::error::StorageError;
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// A stored object together with the content type it was written with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: String,
}

/// One signed URL request, recorded so callers can inspect expiry windows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresignRecord {
    pub bucket: String,
    pub key: String,
    pub expires_in: Duration,
}

/// Mock store that keeps objects in memory.
///
/// Signed URLs use the virtual-hosted S3 form
/// (`https://{bucket}.s3.amazonaws.com/{key}?X-Amz-Expires=..`) so that a
/// URL handed back to the pipeline resolves to this store again.
#[derive(Clone, Default)]
pub struct MockObjectStore {
    objects: Arc<RwLock<HashMap<(String, String), StoredObject>>>,
    writes: Arc<RwLock<Vec<(String, String)>>>,
    presigns: Arc<RwLock<Vec<PresignRecord>>>,
    /// Simulate errors if true
    simulate_read_failure: Arc<RwLock<bool>>,
    simulate_write_failure: Arc<RwLock<bool>>,
    simulate_presign_failure: Arc<RwLock<bool>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object without recording it as a pipeline write
    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>, content_type: &str) {
        self.objects.write().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                body: body.into(),
                content_type: content_type.to_string(),
            },
        );
    }

    /// Fetch a stored object, if present
    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Keys written through `put_object`, in write order
    pub fn written_keys(&self) -> Vec<String> {
        self.writes.read().iter().map(|(_, key)| key.clone()).collect()
    }

    /// Signed URL requests, in request order
    pub fn presign_requests(&self) -> Vec<PresignRecord> {
        self.presigns.read().clone()
    }

    /// Make every `get_object` fail with a backend error
    pub fn set_read_failure(&self, enabled: bool) {
        *self.simulate_read_failure.write() = enabled;
    }

    /// Make every `put_object` fail with a backend error
    pub fn set_write_failure(&self, enabled: bool) {
        *self.simulate_write_failure.write() = enabled;
    }

    /// Make every `presign_get` fail
    pub fn set_presign_failure(&self, enabled: bool) {
        *self.simulate_presign_failure.write() = enabled;
    }

    /// Get number of stored objects
    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        if *self.simulate_read_failure.read() {
            return Err(StorageError::Backend("Simulated read failure".to_string()));
        }

        self.object(bucket, key)
            .map(|object| object.body)
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if *self.simulate_write_failure.read() {
            return Err(StorageError::Backend("Simulated write failure".to_string()));
        }

        self.insert(bucket, key, body, content_type);
        self.writes
            .write()
            .push((bucket.to_string(), key.to_string()));
        Ok(())
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        if *self.simulate_presign_failure.read() {
            return Err(StorageError::Presign("Simulated signing failure".to_string()));
        }

        self.presigns.write().push(PresignRecord {
            bucket: bucket.to_string(),
            key: key.to_string(),
            expires_in,
        });

        Ok(format!(
            "https://{}.s3.amazonaws.com/{}?X-Amz-Expires={}&X-Amz-Signature=mock",
            bucket,
            urlencoding::encode(key).replace("%2F", "/"),
            expires_in.as_secs()
        ))
    }
}
