//! API integration tests for facedex-server.
//!
//! These tests run the full pipeline over the HTTP surface with in-memory
//! backends: upload hook -> detection -> queue -> indexing -> claim ->
//! naming -> search -> gateway read path.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use facedex_core::{BoundingBox, FaceDetector, FacedexError, StaticDetector};
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use facedex_server::{
    create_router, AppState, ClaimedFace, Config, FaceRecord, FaceStore, MemoryFaceStore,
    MemoryObjectStore, MemoryTaskQueue, NewFace, ObjectStore,
};

/// A small decodable photo for the indexing path.
fn test_photo(width: u32, height: u32) -> Vec<u8> {
    let img: ImageBuffer<Rgb<u8>, _> = ImageBuffer::from_pixel(width, height, Rgb([120, 30, 60]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Build the test router plus handles to the backing stores.
fn create_test_app(
    detector: Arc<dyn FaceDetector>,
) -> (Router, Arc<MemoryObjectStore>, Arc<MemoryFaceStore>) {
    let object_store = Arc::new(MemoryObjectStore::new());
    let faces = Arc::new(MemoryFaceStore::new());
    let queue = Arc::new(MemoryTaskQueue::new());
    let state = AppState::new(
        object_store.clone(),
        faces.clone(),
        queue,
        detector,
        Config::default(),
    );
    (create_router(state), object_store, faces)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

fn bot_update(chat_id: i64, text: &str) -> Value {
    json!({ "message": { "chat": { "id": chat_id }, "text": text } })
}

// ============================================================================
// Health & Readiness
// ============================================================================

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let (app, _store, _faces) = create_test_app(Arc::new(StaticDetector::none()));

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["service"], "facedex-server");
    assert_eq!(json["database_ok"], true);
}

#[tokio::test]
async fn test_ready_endpoint_returns_ok() {
    let (app, _store, _faces) = create_test_app(Arc::new(StaticDetector::none()));
    let (status, body) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["ready"], true);
}

// ============================================================================
// Image gateway
// ============================================================================

#[tokio::test]
async fn test_gateway_serves_stored_face_bytes() {
    let (app, store, _faces) = create_test_app(Arc::new(StaticDetector::none()));
    store.put("faces/f1.jpg", b"jpeg-bytes").await.unwrap();

    let (status, body) = get(&app, "/image?face=f1.jpg").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"jpeg-bytes");
}

#[tokio::test]
async fn test_gateway_missing_object_is_404() {
    let (app, _store, _faces) = create_test_app(Arc::new(StaticDetector::none()));
    let (status, _body) = get(&app, "/image?face=missing.jpg").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_gateway_rejects_bad_suffix_before_storage() {
    let (app, store, _faces) = create_test_app(Arc::new(StaticDetector::none()));

    let (status, _body) = get(&app, "/image?face=f1.png").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    // Validation happened before any storage access.
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_gateway_rejects_traversal_keys() {
    let (app, _store, _faces) = create_test_app(Arc::new(StaticDetector::none()));
    // URL-encoded "../secret.jpg"
    let (status, _body) = get(&app, "/image?face=..%2Fsecret.jpg").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_gateway_requires_exactly_one_key() {
    let (app, _store, _faces) = create_test_app(Arc::new(StaticDetector::none()));

    let (status, _body) = get(&app, "/image").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _body) = get(&app, "/image?face=a.jpg&photo=b.jpg").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Pipeline triggers
// ============================================================================

#[tokio::test]
async fn test_upload_hook_requires_records() {
    let (app, _store, _faces) = create_test_app(Arc::new(StaticDetector::none()));
    let (status, _json) = post_json(&app, "/hooks/photo-uploaded", json!({ "records": [] })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_rejects_shapeless_update() {
    let (app, _store, _faces) = create_test_app(Arc::new(StaticDetector::none()));
    let (status, _json) = post_json(&app, "/bot/webhook", json!({ "something": "else" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// End-to-end scenario
// ============================================================================

#[tokio::test]
async fn test_full_pipeline_upload_to_search() {
    let bbox = BoundingBox::new(10, 10, 50, 50);
    let (app, store, faces) = create_test_app(Arc::new(StaticDetector::single(bbox)));

    store
        .put("photos/trip1.jpg", &test_photo(100, 100))
        .await
        .unwrap();

    // Upload notification -> one detection task published.
    let (status, outcome) = post_json(
        &app,
        "/hooks/photo-uploaded",
        json!({ "records": [ { "object_key": "trip1.jpg" } ] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["published"], 1);

    // Drain the queue -> one face indexed.
    let (status, outcome) = post_json(&app, "/hooks/process-tasks", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["indexed"], 1);
    assert_eq!(outcome["dropped"], 0);
    assert_eq!(faces.count_unnamed().await.unwrap(), 1);

    // The conversational flow offers the face with a gateway link.
    let (status, reply) = post_json(&app, "/bot/webhook", bot_update(7, "/getface")).await;
    assert_eq!(status, StatusCode::OK);
    let photo_url = reply["photo_urls"][0].as_str().unwrap();
    let face_segment = photo_url.split("face=").nth(1).unwrap();

    // The gateway serves the crop the indexing worker wrote.
    let (status, crop) = get(&app, &format!("/image?face={face_segment}")).await;
    assert_eq!(status, StatusCode::OK);
    let expected = store.get(&format!("faces/{face_segment}")).await.unwrap();
    assert_eq!(crop, expected);
    let decoded = image::load_from_memory(&crop).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (40, 40));

    // Reply with a name.
    let (status, reply) = post_json(&app, "/bot/webhook", bot_update(7, "Bob")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(reply["reply"].as_str().unwrap().contains("Bob"));

    // Search by name returns the owning photo.
    let (status, reply) = post_json(&app, "/bot/webhook", bot_update(7, "/find Bob")).await;
    assert_eq!(status, StatusCode::OK);
    let urls = reply["photo_urls"].as_array().unwrap();
    assert_eq!(urls.len(), 1);
    assert!(urls[0].as_str().unwrap().contains("photo=trip1.jpg"));

    // The named face is never offered again.
    let (status, reply) = post_json(&app, "/bot/webhook", bot_update(8, "/getface")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reply["reply"], "No unnamed faces available.");
}

/// Face store standing in for an unreachable database.
struct DownFaceStore;

#[async_trait::async_trait]
impl FaceStore for DownFaceStore {
    async fn insert_face(&self, _face: &NewFace) -> facedex_core::Result<()> {
        Err(FacedexError::Unavailable("database down".into()))
    }

    async fn claim_unnamed(
        &self,
        _lease_ttl: Duration,
    ) -> facedex_core::Result<Option<ClaimedFace>> {
        Err(FacedexError::Unavailable("database down".into()))
    }

    async fn assign_name(&self, _face_id: Uuid, _name: &str) -> facedex_core::Result<()> {
        Err(FacedexError::Unavailable("database down".into()))
    }

    async fn find_by_name(&self, _name: &str) -> facedex_core::Result<Vec<String>> {
        Err(FacedexError::Unavailable("database down".into()))
    }

    async fn get_face(&self, _face_id: Uuid) -> facedex_core::Result<Option<FaceRecord>> {
        Err(FacedexError::Unavailable("database down".into()))
    }

    async fn count_unnamed(&self) -> facedex_core::Result<i64> {
        Err(FacedexError::Unavailable("database down".into()))
    }

    async fn check_health(&self) -> facedex_core::Result<()> {
        Err(FacedexError::Unavailable("database down".into()))
    }
}

#[tokio::test]
async fn test_failed_indexing_batch_goes_back_on_the_queue() {
    let bbox = BoundingBox::new(10, 10, 50, 50);
    let object_store = Arc::new(MemoryObjectStore::new());
    let queue = Arc::new(MemoryTaskQueue::new());
    let state = AppState::new(
        object_store.clone(),
        Arc::new(DownFaceStore),
        queue.clone(),
        Arc::new(StaticDetector::single(bbox)),
        Config::default(),
    );
    let app = create_router(state);

    object_store
        .put("photos/trip1.jpg", &test_photo(100, 100))
        .await
        .unwrap();
    let (status, _json) = post_json(
        &app,
        "/hooks/photo-uploaded",
        json!({ "records": [ { "object_key": "trip1.jpg" } ] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(queue.pending().await, 1);

    // The drain fails on the row insert; the message must be back on the
    // queue, not lost with the crop.
    let (status, _json) = post_json(&app, "/hooks/process-tasks", json!({})).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(queue.pending().await, 1);
}

#[tokio::test]
async fn test_duplicate_task_delivery_creates_duplicate_rows() {
    let bbox = BoundingBox::new(0, 0, 20, 20);
    let (app, store, faces) = create_test_app(Arc::new(StaticDetector::single(bbox)));

    store
        .put("photos/trip1.jpg", &test_photo(40, 40))
        .await
        .unwrap();

    // Deliver the same upload notification twice: at-least-once semantics.
    for _ in 0..2 {
        let (status, _json) = post_json(
            &app,
            "/hooks/photo-uploaded",
            json!({ "records": [ { "object_key": "trip1.jpg" } ] }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_status, outcome) = post_json(&app, "/hooks/process-tasks", json!({})).await;
    assert_eq!(outcome["indexed"], 2);

    // Two rows with distinct ids, same photo - documented duplication.
    assert_eq!(faces.count_unnamed().await.unwrap(), 2);
}

#[tokio::test]
async fn test_no_face_found_indexes_full_image() {
    let (app, store, faces) = create_test_app(Arc::new(StaticDetector::none()));

    store
        .put("photos/empty.jpg", &test_photo(32, 24))
        .await
        .unwrap();

    post_json(
        &app,
        "/hooks/photo-uploaded",
        json!({ "records": [ { "object_key": "empty.jpg" } ] }),
    )
    .await;
    let (_status, outcome) = post_json(&app, "/hooks/process-tasks", json!({})).await;
    assert_eq!(outcome["indexed"], 1);
    assert_eq!(faces.count_unnamed().await.unwrap(), 1);

    let face_key = store
        .keys()
        .into_iter()
        .find(|k| k.starts_with("faces/"))
        .unwrap();
    let decoded = image::load_from_memory(&store.get(&face_key).await.unwrap()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (32, 24));
}
