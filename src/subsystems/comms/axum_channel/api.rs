//! Axum handlers for the chat API routes.
//!
//! Each handler receives [`AxumState`] via [`axum::extract::State`] and
//! returns an axum [`Response`]. Resolver and log work is synchronous
//! SQLite/file I/O, so it runs on the blocking pool.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use crate::subsystems::agents::chat::ResolutionResult;

use super::AxumState;

/// Default number of rows for the analytics view.
const DEFAULT_ANALYTICS_LIMIT: usize = 50;

// ── Request / response types ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct MessageRequest {
    message: String,
}

#[derive(Deserialize)]
pub(super) struct AnalyticsParams {
    limit: Option<usize>,
}

/// Wire shape of a resolved message. `file_url` is present only when a rate
/// sheet was generated.
#[derive(Serialize)]
pub(super) struct ChatResponse {
    response: String,
    recommendations: Vec<String>,
    intent: String,
    file_url: Option<String>,
}

impl ChatResponse {
    fn from_result(result: ResolutionResult) -> Self {
        let file_url = result
            .file_download
            .map(|filename| format!("/api/v1/chat/download/{filename}"));
        Self {
            response: result.response,
            recommendations: result.recommendations,
            intent: result.intent,
            file_url,
        }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

/// Extract the required `x-session-id` header.
fn session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-session-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /api/health
pub(super) async fn health(State(state): State<AxumState>) -> Response {
    let storage_check = if state.downloads_dir.is_dir() {
        "Ready"
    } else {
        "Storage Error"
    };
    let body = json!({
        "status": "Online",
        "service": "Sarah AI Engine",
        "storage_check": storage_check,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/v1/chat/welcome
pub(super) async fn welcome(State(state): State<AxumState>, headers: HeaderMap) -> Response {
    let Some(session_id) = session_id(&headers) else {
        return (
            StatusCode::BAD_REQUEST,
            json_error("bad_request", "missing x-session-id header"),
        )
            .into_response();
    };

    let service = state.service.clone();
    match tokio::task::spawn_blocking(move || service.welcome(&session_id)).await {
        Ok(result) => (StatusCode::OK, Json(ChatResponse::from_result(result))).into_response(),
        Err(e) => {
            warn!(channel_id = %state.channel_id, "welcome task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, json_error("internal", e)).into_response()
        }
    }
}

/// POST /api/v1/chat/message
pub(super) async fn message(
    State(state): State<AxumState>,
    headers: HeaderMap,
    Json(req): Json<MessageRequest>,
) -> Response {
    let Some(session_id) = session_id(&headers) else {
        return (
            StatusCode::BAD_REQUEST,
            json_error("bad_request", "missing x-session-id header"),
        )
            .into_response();
    };

    let service = state.service.clone();
    let task =
        tokio::task::spawn_blocking(move || service.resolve(&req.message, &session_id)).await;

    match task {
        Ok(result) => (StatusCode::OK, Json(ChatResponse::from_result(result))).into_response(),
        Err(e) => {
            warn!(channel_id = %state.channel_id, "message task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, json_error("internal", e)).into_response()
        }
    }
}

/// GET /api/v1/chat/analytics?limit=50
pub(super) async fn analytics(
    State(state): State<AxumState>,
    Query(params): Query<AnalyticsParams>,
) -> Response {
    let limit = params.limit.unwrap_or(DEFAULT_ANALYTICS_LIMIT);

    let service = state.service.clone();
    match tokio::task::spawn_blocking(move || service.analytics(limit)).await {
        Ok(rows) => (StatusCode::OK, Json(rows)).into_response(),
        Err(e) => {
            warn!(channel_id = %state.channel_id, "analytics task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, json_error("internal", e)).into_response()
        }
    }
}

/// GET /api/v1/chat/download/{filename}
///
/// Serves a previously generated rate sheet. The filename is a single path
/// segment; anything that smells like traversal is treated as absent.
pub(super) async fn download(
    State(state): State<AxumState>,
    Path(filename): Path<String>,
) -> Response {
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return (StatusCode::NOT_FOUND, json_error("not_found", "file not found")).into_response();
    }

    let path = state.downloads_dir.join(&filename);
    match tokio::fs::read(&path).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "application/pdf".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, json_error("not_found", "file not found")).into_response(),
    }
}
