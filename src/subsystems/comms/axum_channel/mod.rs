//! Axum HTTP channel — serves the chat API under `/api/`.
//!
//! `run` drives the axum event loop; the shared [`CancellationToken`] is
//! wired to axum's graceful shutdown.
//!
//! ## URL layout
//!
//! ```text
//! GET  /api/health
//! GET  /api/v1/chat/welcome                — requires x-session-id header
//! POST /api/v1/chat/message                — requires x-session-id header
//! GET  /api/v1/chat/analytics?limit=50
//! GET  /api/v1/chat/download/{filename}
//! GET  /favicon.ico                        → 204
//! GET  /                                   → root HTML status card
//! ```

mod api;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    http::StatusCode,
    response::Html,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::core::error::AppError;
use crate::subsystems::agents::chat::ChatService;

/// Simple status page served at the root path.
const ROOT_INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Sarah</title>
  <style>
    *, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
    body {
      font-family: system-ui, -apple-system, sans-serif;
      background: #0a1128; color: #e0e0e0;
      display: flex; align-items: center; justify-content: center;
      height: 100vh;
    }
    .card {
      text-align: center; padding: 2rem 3rem;
      border: 1px solid #2a3a5a; border-radius: 12px;
      background: #101a38;
    }
    h1 { font-size: 1.5rem; margin-bottom: 0.5rem; }
    p  { font-size: 0.9rem; color: #8899bb; }
  </style>
</head>
<body>
  <div class="card">
    <h1>Sarah</h1>
    <p>Mortgage assistant is running.</p>
  </div>
</body>
</html>
"#;

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone — all fields are reference-counted.
#[derive(Clone)]
pub struct AxumState {
    /// Channel identifier used in log spans.
    pub channel_id: Arc<str>,
    /// The assistant's decision engine.
    pub service: Arc<ChatService>,
    /// Where generated rate sheets live, for the download route.
    pub downloads_dir: Arc<PathBuf>,
}

// ── AxumChannel ───────────────────────────────────────────────────────────────

pub struct AxumChannel {
    channel_id: String,
    bind_addr: String,
    service: Arc<ChatService>,
    downloads_dir: PathBuf,
}

impl AxumChannel {
    pub fn new(
        channel_id: impl Into<String>,
        bind_addr: impl Into<String>,
        service: Arc<ChatService>,
        downloads_dir: PathBuf,
    ) -> Self {
        Self {
            channel_id: channel_id.into(),
            bind_addr: bind_addr.into(),
            service,
            downloads_dir,
        }
    }

    /// Bind and serve until the token is cancelled.
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), AppError> {
        let state = AxumState {
            channel_id: Arc::from(self.channel_id.as_str()),
            service: self.service,
            downloads_dir: Arc::new(self.downloads_dir),
        };

        let router = build_router(state);

        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(|e| AppError::Comms(format!("axum bind failed on {}: {e}", self.bind_addr)))?;

        info!(channel_id = %self.channel_id, bind_addr = %self.bind_addr, "axum channel listening");

        axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await })
            .await
            .map_err(|e| AppError::Comms(format!("axum server error: {e}")))?;

        info!(channel_id = %self.channel_id, "axum channel shut down");
        Ok(())
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AxumState) -> Router {
    Router::new()
        .route("/api/health", get(api::health))
        .route("/api/v1/chat/welcome", get(api::welcome))
        .route("/api/v1/chat/message", post(api::message))
        .route("/api/v1/chat/analytics", get(api::analytics))
        .route("/api/v1/chat/download/{filename}", get(api::download))
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .route("/", get(|| async { Html(ROOT_INDEX_HTML) }))
        .with_state(state)
}
