//! Recognising references that point into S3.
//!
//! Logo references arrive as arbitrary strings. Those that name an S3 object,
//! either as `s3://bucket/key` or as one of the public S3 URL forms, are read
//! through the storage client instead of plain HTTP so private buckets work
//! with the service's own credentials.
//!
//! Supported URL forms:
//!
//! - `https://{bucket}.s3.amazonaws.com/{key}`
//! - `https://{bucket}.s3.{region}.amazonaws.com/{key}`
//! - `https://{bucket}.s3-{region}.amazonaws.com/{key}` (legacy)
//! - `https://s3.amazonaws.com/{bucket}/{key}`
//! - `https://s3.{region}.amazonaws.com/{bucket}/{key}`
//!
//! Query strings (for example a previous signature) are ignored and keys
//! are percent-decoded.

use reqwest::Url;

/// Suffix shared by every public S3 endpoint host
const AWS_HOST_SUFFIX: &str = ".amazonaws.com";

/// Bucket and key of an object in storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    pub bucket: String,
    pub key: String,
}

impl StorageLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse an `s3://bucket/key` reference
    pub fn from_s3_uri(reference: &str) -> Option<Self> {
        let rest = reference.strip_prefix("s3://")?;
        let (bucket, key) = rest.split_once('/')?;
        if bucket.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self::new(bucket, key))
    }

    /// Parse an HTTP(S) URL whose host is an S3 endpoint
    pub fn from_s3_url(reference: &str) -> Option<Self> {
        let url = Url::parse(reference).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }

        let host = url.host_str()?.to_ascii_lowercase();
        let service_host = host.strip_suffix(AWS_HOST_SUFFIX)?;
        let labels: Vec<&str> = service_host.split('.').collect();
        let s3_index = labels.iter().rposition(|label| is_s3_label(label))?;

        let path = url.path().trim_start_matches('/');
        let (bucket, raw_key) = if s3_index == 0 {
            // Path-style: bucket is the first path segment
            path.split_once('/')?
        } else {
            // Virtual-hosted: bucket names may themselves contain dots
            let bucket_len = labels[..s3_index].iter().map(|l| l.len() + 1).sum::<usize>() - 1;
            (&service_host[..bucket_len], path)
        };

        if bucket.is_empty() || raw_key.is_empty() {
            return None;
        }

        let key = urlencoding::decode(raw_key).ok()?.into_owned();
        Some(Self::new(bucket, key))
    }

    /// Parse either supported form
    pub fn parse(reference: &str) -> Option<Self> {
        Self::from_s3_uri(reference).or_else(|| Self::from_s3_url(reference))
    }
}

impl std::fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "s3://{}/{}", self.bucket, self.key)
    }
}

fn is_s3_label(label: &str) -> bool {
    label == "s3" || label.starts_with("s3-")
}
