//! Storage configuration types.
//!
//! This module defines where the service reads its background template and
//! writes its output:
//! - Bucket, region and background key
//! - Optional endpoint override (LocalStack, MinIO) and static credentials
//! - Signed URL lifetime
//!
//! Default values are sourced from `crate::constants`.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::constants::{
    DEFAULT_BACKGROUND_KEY, DEFAULT_BUCKET, DEFAULT_REGION, DEFAULT_URL_EXPIRATION_SECS,
};

fn default_bucket() -> String {
    DEFAULT_BUCKET.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_background_key() -> String {
    DEFAULT_BACKGROUND_KEY.to_string()
}

fn default_url_expiration_secs() -> u64 {
    DEFAULT_URL_EXPIRATION_SECS
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default = "default_bucket")]
    pub bucket: String,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_background_key")]
    pub background_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,
    /// Lifetime of signed retrieval URLs in seconds (default: 7 days)
    #[serde(default = "default_url_expiration_secs")]
    pub url_expiration_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            bucket: default_bucket(),
            region: default_region(),
            background_key: default_background_key(),
            endpoint: None,
            access_key: None,
            secret_key: None,
            url_expiration_secs: default_url_expiration_secs(),
        }
    }
}

impl StorageConfig {
    pub fn url_expiration(&self) -> Duration {
        Duration::from_secs(self.url_expiration_secs)
    }
}
