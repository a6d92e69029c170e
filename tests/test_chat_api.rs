//! Router-level tests for the axum channel.
//!
//! Run with:
//!   cargo test --test test_chat_api

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use tempfile::TempDir;
use tower::ServiceExt;

use sarah_bot::subsystems::agents::chat::ChatService;
use sarah_bot::subsystems::comms::{AxumState, build_router};
use sarah_bot::subsystems::documents::RateSheetGenerator;
use sarah_bot::subsystems::knowledge::KnowledgeBase;
use sarah_bot::subsystems::memory::InteractionLog;

// ── helpers ──────────────────────────────────────────────────────────────────

fn router() -> (TempDir, Router) {
    let tmp = TempDir::new().expect("tempdir");
    let log = InteractionLog::open(tmp.path().join("chat.db")).expect("open log");
    let downloads: PathBuf = tmp.path().join("downloads");
    let documents = RateSheetGenerator::new(downloads.clone());
    documents.ensure_dir().expect("create downloads dir");

    let state = AxumState {
        channel_id: Arc::from("test"),
        service: Arc::new(ChatService::new(KnowledgeBase::default(), log, documents)),
        downloads_dir: Arc::new(downloads),
    };
    (tmp, build_router(state))
}

fn get(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(session) = session {
        builder = builder.header("x-session-id", session);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_message(message: &str, session: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/v1/chat/message")
        .header("x-session-id", session)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!(r#"{{"message":{}}}"#, serde_json::to_string(message).unwrap())))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// ── welcome ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn welcome_requires_session_header() {
    let (_tmp, router) = router();

    let response = router.oneshot(get("/api/v1/chat/welcome", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn welcome_transitions_new_to_returning() {
    let (_tmp, router) = router();

    let response = router
        .clone()
        .oneshot(get("/api/v1/chat/welcome", Some("sess-api")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["intent"], "proactive_welcome");
    assert!(body["file_url"].is_null());

    let response = router
        .oneshot(get("/api/v1/chat/welcome", Some("sess-api")))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["intent"], "returning_user");
}

// ── message ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn message_resolves_and_returns_chips() {
    let (_tmp, router) = router();

    let response = router
        .oneshot(post_message("fha versus conventional", "sess-api"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["intent"], "loan_comparison");
    assert_eq!(body["recommendations"][0], "Compare Rates");
    assert!(body["file_url"].is_null());
}

#[tokio::test]
async fn pdf_message_links_a_downloadable_file() {
    let (_tmp, router) = router();

    let response = router
        .clone()
        .oneshot(post_message("rate sheet pdf please", "sess-api"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["intent"], "download_pdf");

    let file_url = body["file_url"].as_str().expect("file_url expected");
    assert!(file_url.starts_with("/api/v1/chat/download/"));

    // The linked file is servable.
    let response = router.oneshot(get(file_url, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn message_without_session_header_is_rejected() {
    let (_tmp, router) = router();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/chat/message")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"message":"hello"}"#))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let (_tmp, router) = router();

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/chat/message")
        .header("x-session-id", "sess-api")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

// ── analytics ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn analytics_limits_rows_newest_first() {
    let (_tmp, router) = router();

    for i in 0..3 {
        let response = router
            .clone()
            .oneshot(post_message(&format!("mystery {i}"), "sess-api"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = router
        .oneshot(get("/api/v1/chat/analytics?limit=2", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    let rows = body.as_array().expect("array expected");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["user_message"], "mystery 2");
    assert_eq!(rows[1]["user_message"], "mystery 1");
    assert!(rows[0]["timestamp"].is_string());
}

// ── download ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn absent_file_is_not_found() {
    let (_tmp, router) = router();

    let response = router
        .oneshot(get("/api/v1/chat/download/nope.pdf", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn traversal_filenames_are_not_found() {
    let (_tmp, router) = router();

    let response = router
        .clone()
        .oneshot(get("/api/v1/chat/download/..", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = router
        .oneshot(get("/api/v1/chat/download/..%2Fchat.db", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ── health & root ────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_storage_ready() {
    let (_tmp, router) = router();

    let response = router.oneshot(get("/api/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["status"], "Online");
    assert_eq!(body["storage_check"], "Ready");
}

#[tokio::test]
async fn root_serves_status_page() {
    let (_tmp, router) = router();

    let response = router.oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
