// Error types module

use thiserror::Error;

use crate::storage::StorageError;

/// Centralized error type for the mockup pipeline
///
/// Each variant corresponds to one stage of a request so failures can be
/// mapped to an HTTP status and logged with the stage that produced them.
/// Rasterization failures never appear here: the normalizer recovers from
/// them locally (see [`crate::mockup::RasterizationError`]).
#[derive(Debug, Error)]
pub enum MockupError {
    /// Required request fields are missing (logoUrl, email)
    #[error("Missing required parameters: {0}")]
    Validation(String),

    /// Network or storage read failure while acquiring an image
    #[error("Failed to fetch image: {0}")]
    Fetch(String),

    /// Bytes are not a decodable image, or the image has zero dimensions
    #[error("Failed to decode image: {0}")]
    Decode(String),

    /// Encoding, storage write or signed URL generation failed
    #[error("Failed to publish mockup: {0}")]
    Publish(String),

    /// Invalid configuration (startup only)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MockupError {
    /// HTTP status code reported to the caller for this error
    pub fn status_code(&self) -> u16 {
        match self {
            MockupError::Validation(_) => 400,
            MockupError::Fetch(_)
            | MockupError::Decode(_)
            | MockupError::Publish(_)
            | MockupError::Config(_) => 500,
        }
    }

    /// Short stage label used as a structured logging field
    pub fn kind(&self) -> &'static str {
        match self {
            MockupError::Validation(_) => "validation",
            MockupError::Fetch(_) => "fetch",
            MockupError::Decode(_) => "decode",
            MockupError::Publish(_) => "publish",
            MockupError::Config(_) => "config",
        }
    }

    /// Wrap a storage failure that happened while reading a source image
    pub fn fetch(err: StorageError) -> Self {
        MockupError::Fetch(err.to_string())
    }

    /// Wrap a storage failure that happened while writing or signing
    pub fn publish(err: StorageError) -> Self {
        MockupError::Publish(err.to_string())
    }
}
