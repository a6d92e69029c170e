//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw TOML shape — serde target before resolution.
#[derive(Deserialize)]
pub(super) struct RawConfig {
    pub assistant: RawAssistant,
    #[serde(default)]
    pub comms: RawComms,
    #[serde(default)]
    pub memory: RawMemory,
    #[serde(default)]
    pub documents: RawDocuments,
}

#[derive(Deserialize)]
pub(super) struct RawAssistant {
    pub bot_name: String,
    pub work_dir: String,
    pub log_level: String,
}

// ── Comms ───────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawComms {
    #[serde(default)]
    pub axum_channel: RawAxumChannel,
}

#[derive(Deserialize)]
pub(super) struct RawAxumChannel {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_http_bind")]
    pub bind: String,
}

impl Default for RawAxumChannel {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: default_http_bind(),
        }
    }
}

// ── Memory ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawMemory {
    #[serde(default = "default_db_file")]
    pub db_file: String,
}

impl Default for RawMemory {
    fn default() -> Self {
        Self {
            db_file: default_db_file(),
        }
    }
}

// ── Documents ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawDocuments {
    #[serde(default = "default_documents_dir")]
    pub dir: String,
}

impl Default for RawDocuments {
    fn default() -> Self {
        Self {
            dir: default_documents_dir(),
        }
    }
}

// ── Default functions (used by serde) ────────────────────────────────────────

fn default_true() -> bool {
    true
}

pub(super) fn default_http_bind() -> String {
    "127.0.0.1:8000".to_string()
}

pub(super) fn default_db_file() -> String {
    "chat_history.db".to_string()
}

pub(super) fn default_documents_dir() -> String {
    "downloads".to_string()
}
