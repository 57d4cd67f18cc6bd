// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.
// Using constants instead of magic numbers keeps the storage conventions
// and template geometry in one place.

// =============================================================================
// Storage defaults
// =============================================================================

/// Default bucket holding backgrounds, rasterized logos and mockups
pub const DEFAULT_BUCKET: &str = "mockup-hudlab";

/// Default object key of the mockup background template
pub const DEFAULT_BACKGROUND_KEY: &str = "backgrounds/default-bg.png";

/// Default AWS region
pub const DEFAULT_REGION: &str = "us-east-1";

/// Signed URL lifetime in seconds (7 days)
pub const DEFAULT_URL_EXPIRATION_SECS: u64 = 7 * 24 * 60 * 60;

/// Longest lifetime S3 accepts for a SigV4 presigned URL
pub const MAX_URL_EXPIRATION_SECS: u64 = 604_800;

/// Key namespace for finished mockups
pub const MOCKUPS_PREFIX: &str = "mockups";

/// Key namespace for rasterized PDF logos
pub const LOGOS_PREFIX: &str = "logos";

/// Content type of every object this service writes
pub const PNG_CONTENT_TYPE: &str = "image/png";

// =============================================================================
// Fetch defaults
// =============================================================================

/// Default logo download timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Default maximum logo download size (20 MB)
pub const DEFAULT_MAX_LOGO_BYTES: usize = 20 * 1024 * 1024;

/// Path segment used by the upload form for original (uncompressed) logos
pub const UNCOMPRESSED_LOGO_SEGMENT: &str = "logo-uncompressed";

// =============================================================================
// Server defaults
// =============================================================================

/// Default listen address
pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0";

/// Default listen port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Default maximum request body size (1 MB)
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 1024 * 1024;

// =============================================================================
// Template geometry
// =============================================================================

/// Bounding box for the logo printed on each slipper strap
pub const SLIPPER_BOX: (u32, u32) = (163, 100);

/// Bounding box for the logo printed on each packaging label
pub const LABEL_BOX: (u32, u32) = (64, 60);

/// Fallback display name when the request carries none
pub const DEFAULT_DISPLAY_NAME: &str = "Unknown";
