// Mockup pipeline tests
// Drive the whole request path (handler -> coordinator -> storage) against
// the in-memory object store.

use async_trait::async_trait;
use bytes::Bytes;
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage, Rgba, RgbaImage};
use mockup_forge::config::Config;
use mockup_forge::error::MockupError;
use mockup_forge::handler::{handle_event, ResponseEnvelope, MESSAGE_MISSING_PARAMETERS};
use mockup_forge::mockup::{MockupRequest, MockupService};
use mockup_forge::storage::{MockObjectStore, ObjectStore, StorageError};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

const BUCKET: &str = "mockup-hudlab";
const BACKGROUND_KEY: &str = "backgrounds/default-bg.png";
const LOGO_KEY: &str = "logos/brand.png";
const LOGO_URL: &str = "https://mockup-hudlab.s3.amazonaws.com/logos/brand.png";
const PDF_KEY: &str = "logo-uncompressed/brand.pdf";
const PDF_URL: &str = "https://mockup-hudlab.s3.amazonaws.com/logo-uncompressed/brand.pdf";
const TIMESTAMP: i64 = 1_700_000_000;

fn fixed_clock() -> i64 {
    TIMESTAMP
}

fn encode(image: DynamicImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageOutputFormat::Png)
        .expect("PNG encoding should succeed");
    buffer.into_inner()
}

fn background_png() -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(RgbImage::from_pixel(
        1800,
        880,
        Rgb([255, 255, 255]),
    )))
}

fn logo_png() -> Vec<u8> {
    encode(DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        326,
        200,
        Rgba([220, 0, 0, 255]),
    )))
}

fn seeded_store() -> MockObjectStore {
    let store = MockObjectStore::new();
    store.insert(BUCKET, BACKGROUND_KEY, background_png(), "image/png");
    store.insert(BUCKET, LOGO_KEY, logo_png(), "image/png");
    store
}

fn service(store: &MockObjectStore) -> MockupService {
    MockupService::new(Arc::new(Config::default()), Arc::new(store.clone()))
        .expect("service should build")
        .with_clock(fixed_clock)
}

/// Records read order and rejects writes under one key prefix
#[derive(Clone)]
struct RecordingStore {
    inner: MockObjectStore,
    reads: Arc<Mutex<Vec<String>>>,
    denied_prefix: Option<&'static str>,
}

impl RecordingStore {
    fn new(inner: MockObjectStore) -> Self {
        Self {
            inner,
            reads: Arc::new(Mutex::new(Vec::new())),
            denied_prefix: None,
        }
    }

    fn deny_writes_under(mut self, prefix: &'static str) -> Self {
        self.denied_prefix = Some(prefix);
        self
    }

    fn reads(&self) -> Vec<String> {
        self.reads.lock().clone()
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        self.reads.lock().push(key.to_string());
        self.inner.get_object(bucket, key).await
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.denied_prefix.is_some_and(|prefix| key.starts_with(prefix)) {
            return Err(StorageError::Backend("AccessDenied".to_string()));
        }
        self.inner.put_object(bucket, key, body, content_type).await
    }

    async fn presign_get(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> Result<String, StorageError> {
        self.inner.presign_get(bucket, key, expires_in).await
    }
}

fn recording_service(store: &RecordingStore) -> MockupService {
    MockupService::new(Arc::new(Config::default()), Arc::new(store.clone()))
        .expect("service should build")
        .with_clock(fixed_clock)
}

fn body(envelope: &ResponseEnvelope) -> Value {
    envelope.body_json().expect("body should be JSON")
}

fn is_logo_red(pixel: &Rgb<u8>) -> bool {
    pixel[0] >= 215 && pixel[1] <= 5 && pixel[2] <= 5
}

#[tokio::test]
async fn test_successful_request_publishes_mockup() {
    let store = seeded_store();
    let envelope = handle_event(
        &service(&store),
        json!({"logoUrl": LOGO_URL, "email": "a@b.com", "name": "Ana"}),
    )
    .await;

    assert_eq!(envelope.status_code, 200, "body: {}", envelope.body);
    let body = body(&envelope);
    assert_eq!(body["message"], "Mockup created successfully");
    assert_eq!(body["email"], "a@b.com");
    assert_eq!(body["name"], "Ana");
    assert_eq!(body["expiresIn"], 604_800);

    let key = "mockups/a-at-b-dot-com-1700000000.png";
    assert_eq!(store.written_keys(), vec![key.to_string()]);
    assert!(body["mockupUrl"].as_str().unwrap().contains(key));

    let stored = store.object(BUCKET, key).expect("mockup should be stored");
    assert_eq!(stored.content_type, "image/png");

    let mockup = image::load_from_memory(&stored.body).unwrap();
    assert_eq!(mockup.color(), image::ColorType::Rgb8);
    let mockup = mockup.to_rgb8();
    assert_eq!(mockup.dimensions(), (1800, 880));

    // Slipper and label anchors carry the logo, the margin stays untouched
    assert!(is_logo_red(mockup.get_pixel(306, 330)));
    assert!(is_logo_red(mockup.get_pixel(1713, 789)));
    assert!(is_logo_red(mockup.get_pixel(154, 367)));
    assert!(is_logo_red(mockup.get_pixel(1377, 825)));
    assert_eq!(mockup.get_pixel(5, 5), &Rgb([255, 255, 255]));
    assert_eq!(mockup.get_pixel(600, 560), &Rgb([255, 255, 255]));
}

#[tokio::test]
async fn test_every_presign_uses_configured_expiry() {
    let store = seeded_store();
    store.insert(BUCKET, PDF_KEY, logo_png(), "application/pdf");

    let envelope = handle_event(
        &service(&store),
        json!({"logoUrl": PDF_URL, "email": "a@b.com"}),
    )
    .await;
    assert_eq!(envelope.status_code, 200, "body: {}", envelope.body);

    let presigns = store.presign_requests();
    assert_eq!(presigns.len(), 2);
    for presign in presigns {
        assert_eq!(presign.expires_in, Duration::from_secs(604_800));
        assert_eq!(presign.bucket, BUCKET);
    }
}

#[tokio::test]
async fn test_missing_email_is_400() {
    let store = seeded_store();
    let envelope = handle_event(&service(&store), json!({"logoUrl": LOGO_URL})).await;

    assert_eq!(envelope.status_code, 400);
    assert_eq!(body(&envelope)["message"], MESSAGE_MISSING_PARAMETERS);
    assert!(store.written_keys().is_empty());
}

#[tokio::test]
async fn test_missing_logo_url_is_400() {
    let store = seeded_store();
    let envelope = handle_event(
        &service(&store),
        json!({"body": "{\"email\":\"a@b.com\"}"}),
    )
    .await;

    assert_eq!(envelope.status_code, 400);
}

#[tokio::test]
async fn test_background_failure_is_500_without_mockup_write() {
    let store = MockObjectStore::new();
    store.insert(BUCKET, LOGO_KEY, logo_png(), "image/png");

    let envelope = handle_event(
        &service(&store),
        json!({"logoUrl": LOGO_URL, "email": "a@b.com"}),
    )
    .await;

    assert_eq!(envelope.status_code, 500);
    let message = body(&envelope)["message"].as_str().unwrap().to_string();
    assert!(message.starts_with("Error creating mockup: "), "{}", message);
    assert!(message.contains(BACKGROUND_KEY), "{}", message);
    assert!(store.written_keys().is_empty());
    assert!(store.presign_requests().is_empty());
}

#[tokio::test]
async fn test_storage_read_failure_is_500() {
    let store = seeded_store();
    store.set_read_failure(true);

    let envelope = handle_event(
        &service(&store),
        json!({"logoUrl": LOGO_URL, "email": "a@b.com"}),
    )
    .await;

    assert_eq!(envelope.status_code, 500);
    assert!(store.written_keys().is_empty());
}

#[tokio::test]
async fn test_png_reference_passes_through() {
    let store = seeded_store();
    let outcome = service(&store)
        .create_mockup(MockupRequest::new(LOGO_URL, "a@b.com"))
        .await
        .unwrap();

    assert_eq!(outcome.name, "Unknown");
    assert_eq!(outcome.storage_key, "mockups/a-at-b-dot-com-1700000000.png");
    assert!(store
        .written_keys()
        .iter()
        .all(|key| !key.starts_with("logos/")));
}

#[tokio::test]
async fn test_uppercase_pdf_is_rasterized_without_hint() {
    let store = seeded_store();
    store.insert(BUCKET, "logo-uncompressed/file.PDF", logo_png(), "application/pdf");

    let outcome = service(&store)
        .create_mockup(MockupRequest::new(
            "https://mockup-hudlab.s3.amazonaws.com/logo-uncompressed/file.PDF",
            "a@b.com",
        ))
        .await
        .unwrap();

    let written = store.written_keys();
    assert_eq!(written.len(), 2);
    assert!(written[0].starts_with("logos/"));
    assert!(written[0].ends_with("-1700000000.png"));
    assert_eq!(written[1], outcome.storage_key);
}

#[tokio::test]
async fn test_unrasterizable_pdf_falls_back_then_fails_decode() {
    let store = seeded_store();
    store.insert(BUCKET, "logos/vector.pdf", b"%PDF-1.4 vector only".to_vec(), "application/pdf");

    let err = service(&store)
        .create_mockup(MockupRequest::new("logos/vector.pdf", "a@b.com").with_pdf_hint(true))
        .await
        .unwrap_err();

    assert!(matches!(err, MockupError::Decode(_)), "{:?}", err);
    assert_eq!(err.status_code(), 500);
    assert!(store.written_keys().is_empty());
}

#[tokio::test]
async fn test_publish_failure_is_500() {
    let store = seeded_store();
    store.set_write_failure(true);

    let envelope = handle_event(
        &service(&store),
        json!({"logoUrl": LOGO_URL, "email": "a@b.com"}),
    )
    .await;

    assert_eq!(envelope.status_code, 500);
    assert!(body(&envelope)["message"]
        .as_str()
        .unwrap()
        .contains("Failed to publish mockup"));
}

#[tokio::test]
async fn test_undecodable_body_is_processing_error() {
    let store = seeded_store();
    let envelope = handle_event(&service(&store), json!({"body": "not json"})).await;

    assert_eq!(envelope.status_code, 500);
    assert!(body(&envelope)["message"]
        .as_str()
        .unwrap()
        .starts_with("Error processing request: "));
}

#[tokio::test]
async fn test_identical_requests_produce_identical_mockups() {
    let first = seeded_store();
    let second = seeded_store();
    let key = "mockups/a-at-b-dot-com-1700000000.png";

    for store in [&first, &second] {
        service(store)
            .create_mockup(MockupRequest::new(LOGO_URL, "a@b.com"))
            .await
            .unwrap();
    }

    assert_eq!(
        first.object(BUCKET, key).unwrap().body,
        second.object(BUCKET, key).unwrap().body
    );
}

#[tokio::test]
async fn test_custom_bucket_and_expiry_are_used() {
    let mut config = Config::default();
    config.storage.bucket = "other-bucket".to_string();
    config.storage.background_key = "bg/alt.png".to_string();
    config.storage.url_expiration_secs = 3_600;

    let store = MockObjectStore::new();
    store.insert("other-bucket", "bg/alt.png", background_png(), "image/png");
    store.insert("other-bucket", LOGO_KEY, logo_png(), "image/png");

    let service = MockupService::new(Arc::new(config), Arc::new(store.clone()))
        .unwrap()
        .with_clock(fixed_clock);

    // A bare key resolves against the configured bucket
    let outcome = service
        .create_mockup(MockupRequest::new(LOGO_KEY, "x@y.org"))
        .await
        .unwrap();

    assert_eq!(outcome.expires_in, 3_600);
    assert!(store
        .object("other-bucket", "mockups/x-at-y-dot-org-1700000000.png")
        .is_some());
    assert_eq!(
        store.presign_requests()[0].expires_in,
        Duration::from_secs(3_600)
    );
}

#[tokio::test]
async fn test_rasterized_logo_write_failure_is_500() {
    let inner = seeded_store();
    inner.insert(BUCKET, PDF_KEY, logo_png(), "application/pdf");
    let store = RecordingStore::new(inner.clone()).deny_writes_under("logos/");

    let envelope = handle_event(
        &recording_service(&store),
        json!({"logoUrl": PDF_URL, "email": "a@b.com"}),
    )
    .await;

    assert_eq!(envelope.status_code, 500);
    let message = body(&envelope)["message"].as_str().unwrap().to_string();
    assert!(message.contains("Failed to publish mockup"), "{}", message);
    assert!(message.contains("AccessDenied"), "{}", message);
    assert!(inner.written_keys().is_empty());
    assert!(inner.presign_requests().is_empty());
}

#[tokio::test]
async fn test_background_is_read_before_pdf_logo() {
    let inner = seeded_store();
    inner.insert(BUCKET, PDF_KEY, logo_png(), "application/pdf");
    let store = RecordingStore::new(inner.clone());

    recording_service(&store)
        .create_mockup(MockupRequest::new(PDF_URL, "a@b.com"))
        .await
        .unwrap();

    let reads = store.reads();
    assert_eq!(reads.len(), 3, "{:?}", reads);
    assert_eq!(reads[0], BACKGROUND_KEY);
    assert_eq!(reads[1], PDF_KEY);
    assert!(reads[2].starts_with("logos/"), "{:?}", reads);
}

#[tokio::test]
async fn test_missing_background_with_pdf_logo_writes_nothing() {
    let store = MockObjectStore::new();
    store.insert(BUCKET, PDF_KEY, logo_png(), "application/pdf");

    let err = service(&store)
        .create_mockup(MockupRequest::new(PDF_URL, "a@b.com"))
        .await
        .unwrap_err();

    assert!(matches!(err, MockupError::Fetch(_)), "{:?}", err);
    assert!(store.written_keys().is_empty());
    assert!(store.presign_requests().is_empty());
}

#[tokio::test]
async fn test_null_pdf_hint_is_accepted() {
    let store = seeded_store();
    let envelope = handle_event(
        &service(&store),
        json!({"logoUrl": LOGO_URL, "email": "a@b.com", "isPdf": null, "name": null}),
    )
    .await;

    assert_eq!(envelope.status_code, 200, "body: {}", envelope.body);
    assert_eq!(body(&envelope)["name"], "Unknown");
    assert_eq!(
        store.written_keys(),
        vec!["mockups/a-at-b-dot-com-1700000000.png".to_string()]
    );
}
