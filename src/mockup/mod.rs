//! Logo mockup pipeline.
//!
//! # Architecture
//!
//! ```text
//! MockupService
//!   ├── FormatNormalizer   PDF detection, rasterization fallback
//!   ├── SourceFetcher      S3 or HTTP reads
//!   ├── Compositor         resize into two size classes, blend at 18 anchors
//!   └── ResultPublisher    PNG encode, store, presign
//! ```

pub mod compositor;
pub mod coordinator;
pub mod layout;
pub mod normalize;
pub mod publisher;
pub mod source;

pub use compositor::Compositor;
pub use coordinator::{Clock, MockupOutcome, MockupRequest, MockupService, RequestState};
pub use layout::{Anchor, AnchorGroup, AnchorLayout, BoundingBox, PlacementPosition};
pub use normalize::{detect_pdf, FormatNormalizer, RasterizationError};
pub use publisher::{mockup_key, PublishedArtifact, ResultPublisher};
pub use source::{ImageSource, LogoSource, SourceFetcher};
