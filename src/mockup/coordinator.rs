//! Request coordination.
//!
//! `MockupService` owns the per-process collaborators (fetcher, publisher,
//! layout, configuration) and runs one request through
//! validate → fetch background → normalize → fetch logo → composite → publish.
//! Stages are awaited strictly one after another; nothing is shared mutably
//! between requests. Decoding, resizing and encoding run on the blocking pool.

use super::compositor::Compositor;
use super::layout::AnchorLayout;
use super::normalize::FormatNormalizer;
use super::publisher::{encode_png, ResultPublisher};
use super::source::{LogoSource, SourceFetcher};
use crate::config::Config;
use crate::constants::DEFAULT_DISPLAY_NAME;
use crate::error::MockupError;
use crate::storage::ObjectStore;
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use tracing::Instrument;

/// Request fields as received. Presence is checked by the coordinator, not
/// by deserialization, so a missing field maps to a validation error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MockupRequest {
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// `null` and absent both mean no hint
    #[serde(default)]
    pub is_pdf: Option<bool>,
}

impl MockupRequest {
    pub fn new(logo_url: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            logo_url: Some(logo_url.into()),
            email: Some(email.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_pdf_hint(mut self, is_pdf: bool) -> Self {
        self.is_pdf = Some(is_pdf);
        self
    }
}

/// Result of a successful request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockupOutcome {
    pub mockup_url: String,
    pub storage_key: String,
    pub email: String,
    pub name: String,
    pub expires_in: u64,
}

/// Lifecycle of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    Validated,
    SourceResolved,
    Composited,
    Published,
    Responded,
    Failed,
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestState::Received => "received",
            RequestState::Validated => "validated",
            RequestState::SourceResolved => "source_resolved",
            RequestState::Composited => "composited",
            RequestState::Published => "published",
            RequestState::Responded => "responded",
            RequestState::Failed => "failed",
        };
        f.write_str(name)
    }
}

struct ValidatedRequest {
    logo: LogoSource,
    email: String,
    name: String,
}

/// Source of unix timestamps used in storage keys
pub type Clock = fn() -> i64;

fn system_clock() -> i64 {
    chrono::Utc::now().timestamp()
}

/// The mockup pipeline with its process-wide collaborators
pub struct MockupService {
    config: Arc<Config>,
    layout: AnchorLayout,
    fetcher: SourceFetcher,
    publisher: ResultPublisher,
    clock: Clock,
}

impl MockupService {
    pub fn new(config: Arc<Config>, store: Arc<dyn ObjectStore>) -> Result<Self, MockupError> {
        let fetcher = SourceFetcher::new(store.clone(), &config.storage.bucket, &config.fetch)?;
        let publisher = ResultPublisher::new(
            store,
            &config.storage.bucket,
            config.storage.url_expiration(),
        );

        Ok(Self {
            config,
            layout: AnchorLayout::standard(),
            fetcher,
            publisher,
            clock: system_clock,
        })
    }

    /// Replace the timestamp source (tests use a fixed clock)
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn layout(&self) -> &AnchorLayout {
        &self.layout
    }

    /// Run one request through the pipeline
    pub async fn create_mockup(
        &self,
        request: MockupRequest,
    ) -> Result<MockupOutcome, MockupError> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "mockup_request",
            request_id = %request_id,
            email = tracing::field::Empty,
        );

        async move {
            let mut state = RequestState::Received;
            match self.run(request, &mut state).await {
                Ok(outcome) => {
                    tracing::info!(
                        key = %outcome.storage_key,
                        state = %RequestState::Responded,
                        "Mockup created"
                    );
                    Ok(outcome)
                }
                Err(e) => {
                    if matches!(e, MockupError::Validation(_)) {
                        tracing::warn!(error = %e, "Rejected mockup request");
                    } else {
                        tracing::error!(
                            failed_after = %state,
                            state = %RequestState::Failed,
                            kind = e.kind(),
                            error = %e,
                            "Mockup request failed"
                        );
                    }
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        request: MockupRequest,
        state: &mut RequestState,
    ) -> Result<MockupOutcome, MockupError> {
        let request = validate(request)?;
        tracing::Span::current().record("email", request.email.as_str());
        *state = RequestState::Validated;

        let timestamp = (self.clock)();
        let storage = &self.config.storage;

        let background = self
            .fetcher
            .fetch_object(&storage.bucket, &storage.background_key)
            .await?;

        let effective_reference = FormatNormalizer::new(&self.fetcher, &self.publisher)
            .normalize(&request.logo, timestamp)
            .await?;
        let logo = self.fetcher.fetch(&effective_reference).await?;
        *state = RequestState::SourceResolved;
        tracing::debug!(
            background_bytes = background.len(),
            logo_bytes = logo.len(),
            "Sources fetched"
        );

        let layout = self.layout;
        let png = tokio::task::spawn_blocking(move || {
            let composite = Compositor::new(&layout).composite(&background, &logo)?;
            encode_png(&composite)
        })
        .await
        .map_err(|e| MockupError::Decode(format!("compositing task failed: {}", e)))??;
        *state = RequestState::Composited;

        let artifact = self
            .publisher
            .publish_mockup(png, &request.email, timestamp)
            .await?;
        *state = RequestState::Published;

        Ok(MockupOutcome {
            mockup_url: artifact.signed_url,
            storage_key: artifact.storage_key,
            email: request.email,
            name: request.name,
            expires_in: artifact.expiry_offset_seconds,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn validate(request: MockupRequest) -> Result<ValidatedRequest, MockupError> {
    let (Some(reference), Some(email)) = (present(request.logo_url), present(request.email))
    else {
        return Err(MockupError::Validation(
            "logoUrl and email are required".to_string(),
        ));
    };

    Ok(ValidatedRequest {
        logo: LogoSource::new(reference, request.is_pdf.unwrap_or(false)),
        email,
        name: present(request.name).unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
    })
}
