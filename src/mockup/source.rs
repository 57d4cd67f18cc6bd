//! Logo source acquisition.
//!
//! Resolves a logo reference into raw bytes. References that point into S3
//! are read through the object store, other HTTP(S) URLs are downloaded, and
//! anything else is treated as a key in the configured bucket.
//!
//! # Supported References
//!
//! - `s3://bucket/key` and public S3 URLs - read through the object store
//! - `https://example.com/logo.png` - plain HTTP GET, body fully buffered
//! - `logos/abc.png` - key in the default bucket

use crate::config::FetchConfig;
use crate::error::MockupError;
use crate::storage::{ObjectStore, StorageLocation};
use bytes::{Bytes, BytesMut};
use std::sync::Arc;

/// Per-request logo input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogoSource {
    /// URL or storage key of the logo
    pub reference: String,
    /// Caller's claim that the logo is a PDF
    pub is_vector_hint: bool,
}

impl LogoSource {
    pub fn new(reference: impl Into<String>, is_vector_hint: bool) -> Self {
        Self {
            reference: reference.into(),
            is_vector_hint,
        }
    }
}

/// Where a reference is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Object in storage
    Storage(StorageLocation),
    /// Generic HTTP(S) URL
    Http(String),
}

impl ImageSource {
    /// Classify a reference. Never fails: unknown shapes are storage keys in
    /// `default_bucket`.
    pub fn resolve(reference: &str, default_bucket: &str) -> Self {
        if let Some(location) = StorageLocation::parse(reference) {
            return ImageSource::Storage(location);
        }

        let lower = reference.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            return ImageSource::Http(reference.to_string());
        }

        ImageSource::Storage(StorageLocation::new(
            default_bucket,
            reference.trim_start_matches('/'),
        ))
    }
}

/// Fetcher for source images (backgrounds and logos)
#[derive(Clone)]
pub struct SourceFetcher {
    store: Arc<dyn ObjectStore>,
    http_client: reqwest::Client,
    default_bucket: String,
    max_http_bytes: usize,
}

impl SourceFetcher {
    /// Create a new fetcher.
    ///
    /// # Errors
    ///
    /// Returns `MockupError::Config` if the HTTP client cannot be created
    /// (e.g., TLS configuration issues).
    pub fn new(
        store: Arc<dyn ObjectStore>,
        default_bucket: impl Into<String>,
        config: &FetchConfig,
    ) -> Result<Self, MockupError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| MockupError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            store,
            http_client,
            default_bucket: default_bucket.into(),
            max_http_bytes: config.max_logo_bytes,
        })
    }

    /// Fetch the bytes behind a reference. No retries.
    pub async fn fetch(&self, reference: &str) -> Result<Bytes, MockupError> {
        match ImageSource::resolve(reference, &self.default_bucket) {
            ImageSource::Storage(location) => {
                tracing::debug!(
                    bucket = %location.bucket,
                    key = %location.key,
                    "Fetching image from storage"
                );
                self.fetch_object(&location.bucket, &location.key).await
            }
            ImageSource::Http(url) => {
                tracing::debug!(url = %url, "Fetching image over HTTP");
                self.fetch_from_http(&url).await
            }
        }
    }

    /// Read an object from storage
    pub async fn fetch_object(&self, bucket: &str, key: &str) -> Result<Bytes, MockupError> {
        self.store
            .get_object(bucket, key)
            .await
            .map_err(MockupError::fetch)
    }

    async fn fetch_from_http(&self, url: &str) -> Result<Bytes, MockupError> {
        let mut response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| MockupError::Fetch(format!("HTTP fetch of {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(MockupError::Fetch(format!(
                "HTTP request for {} failed with status: {}",
                url,
                response.status()
            )));
        }

        if let Some(length) = response.content_length() {
            if length as usize > self.max_http_bytes {
                return Err(self.too_large(url));
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| MockupError::Fetch(format!("Failed to read HTTP body: {}", e)))?
        {
            if body.len() + chunk.len() > self.max_http_bytes {
                return Err(self.too_large(url));
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body.freeze())
    }

    fn too_large(&self, url: &str) -> MockupError {
        MockupError::Fetch(format!(
            "Response from {} exceeds {} bytes",
            url, self.max_http_bytes
        ))
    }
}
