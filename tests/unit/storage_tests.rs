// Object store tests
// In-memory backend behaviour relied on by the pipeline tests

use bytes::Bytes;
use mockup_forge::storage::{MockObjectStore, ObjectStore, StorageError, StorageLocation};
use std::time::Duration;

#[tokio::test]
async fn test_mock_store_through_trait_object() {
    let store: Box<dyn ObjectStore> = Box::new(MockObjectStore::new());

    store
        .put_object("bucket", "mockups/a.png", Bytes::from_static(b"png"), "image/png")
        .await
        .unwrap();
    let body = store.get_object("bucket", "mockups/a.png").await.unwrap();
    assert_eq!(&body[..], b"png");

    let err = store.get_object("other", "mockups/a.png").await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound { .. }));
}

#[tokio::test]
async fn test_mock_presigned_url_points_back_to_object() {
    let store = MockObjectStore::new();
    store.insert("mockup-hudlab", "logos/a b.png", b"x".to_vec(), "image/png");

    let url = store
        .presign_get("mockup-hudlab", "logos/a b.png", Duration::from_secs(60))
        .await
        .unwrap();

    assert!(url.contains("X-Amz-Expires=60"));
    assert_eq!(
        StorageLocation::parse(&url),
        Some(StorageLocation::new("mockup-hudlab", "logos/a b.png"))
    );
}

#[tokio::test]
async fn test_mock_put_overwrites_existing_key() {
    let store = MockObjectStore::new();
    store
        .put_object("b", "k", Bytes::from_static(b"first"), "image/png")
        .await
        .unwrap();
    store
        .put_object("b", "k", Bytes::from_static(b"second"), "image/png")
        .await
        .unwrap();

    assert_eq!(&store.object("b", "k").unwrap().body[..], b"second");
    assert_eq!(store.object_count(), 1);
    assert_eq!(store.written_keys().len(), 2);
}

#[tokio::test]
async fn test_mock_presign_failure() {
    let store = MockObjectStore::new();
    store.set_presign_failure(true);

    let err = store
        .presign_get("b", "k", Duration::from_secs(1))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Presign(_)));
    assert!(store.presign_requests().is_empty());
}
