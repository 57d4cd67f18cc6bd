//! Encoding and publishing of generated images.
//!
//! Every write is followed by a presign request for the same object, so the
//! caller always receives a time-limited URL rather than a raw key.

use crate::constants::{LOGOS_PREFIX, MOCKUPS_PREFIX, PNG_CONTENT_TYPE};
use crate::error::MockupError;
use crate::storage::ObjectStore;
use bytes::Bytes;
use image::{ImageOutputFormat, RgbImage};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

/// A stored object together with its signed retrieval URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifact {
    pub storage_key: String,
    pub signed_url: String,
    pub expiry_offset_seconds: u64,
}

/// Writes objects to the configured bucket and signs them
#[derive(Clone)]
pub struct ResultPublisher {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    expiry: Duration,
}

impl ResultPublisher {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>, expiry: Duration) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            expiry,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Write `bytes` at exactly `bucket/key` (overwriting) and return a signed
    /// URL valid for the configured expiry. Single attempt.
    pub async fn publish(
        &self,
        bytes: Bytes,
        bucket: &str,
        key: &str,
        content_type: &str,
    ) -> Result<String, MockupError> {
        let size = bytes.len();
        self.store
            .put_object(bucket, key, bytes, content_type)
            .await
            .map_err(MockupError::publish)?;

        tracing::debug!(bucket = %bucket, key = %key, size = size, "Object written");

        self.store
            .presign_get(bucket, key, self.expiry)
            .await
            .map_err(MockupError::publish)
    }

    /// Publish an encoded mockup under the identity's key
    pub async fn publish_mockup(
        &self,
        png: Vec<u8>,
        email: &str,
        timestamp: i64,
    ) -> Result<PublishedArtifact, MockupError> {
        let key = mockup_key(email, timestamp);
        self.publish_artifact(png, key).await
    }

    /// Publish a rasterized logo under a fresh random key
    pub async fn publish_logo(
        &self,
        png: Vec<u8>,
        timestamp: i64,
    ) -> Result<PublishedArtifact, MockupError> {
        let key = logo_key(&uuid::Uuid::new_v4().to_string(), timestamp);
        self.publish_artifact(png, key).await
    }

    async fn publish_artifact(
        &self,
        bytes: Vec<u8>,
        key: String,
    ) -> Result<PublishedArtifact, MockupError> {
        let signed_url = self
            .publish(Bytes::from(bytes), &self.bucket, &key, PNG_CONTENT_TYPE)
            .await?;

        Ok(PublishedArtifact {
            storage_key: key,
            signed_url,
            expiry_offset_seconds: self.expiry.as_secs(),
        })
    }
}

/// Make an email usable as a key fragment: `@` becomes `-at-`, then every
/// `.` becomes `-dot-`. Other characters are kept as is.
pub fn sanitize_identity(email: &str) -> String {
    email.replace('@', "-at-").replace('.', "-dot-")
}

/// `mockups/{sanitized email}-{timestamp}.png`
pub fn mockup_key(email: &str, timestamp: i64) -> String {
    format!(
        "{}/{}-{}.png",
        MOCKUPS_PREFIX,
        sanitize_identity(email),
        timestamp
    )
}

/// `logos/{id}-{timestamp}.png`
pub fn logo_key(id: &str, timestamp: i64) -> String {
    format!("{}/{}-{}.png", LOGOS_PREFIX, id, timestamp)
}

/// Encode an RGB image as PNG
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, MockupError> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .map_err(|e| MockupError::Publish(format!("PNG encoding failed: {}", e)))?;
    Ok(buffer.into_inner())
}
