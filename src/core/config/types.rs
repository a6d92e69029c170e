//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs that subsystems consume.
//! Raw TOML deserialization types live in `raw.rs`.

use std::path::PathBuf;

// ── Comms ───────────────────────────────────────────────────────────────────

/// Axum HTTP channel configuration.
#[derive(Debug, Clone)]
pub struct AxumChannelConfig {
    /// Whether the HTTP channel is explicitly enabled.
    pub enabled: bool,
    /// Socket address to bind the listener to.
    pub bind: String,
}

/// Comms subsystem configuration.
#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub axum_channel: AxumChannelConfig,
}

// ── Memory ───────────────────────────────────────────────────────────────────

/// Interaction-log configuration.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    /// SQLite database file, relative to `work_dir` unless absolute.
    pub db_file: PathBuf,
}

// ── Documents ────────────────────────────────────────────────────────────────

/// Rate-sheet generator configuration.
#[derive(Debug, Clone)]
pub struct DocumentsConfig {
    /// Directory for generated PDFs, relative to `work_dir` unless absolute.
    pub dir: PathBuf,
}

// ── Assistant (root) ─────────────────────────────────────────────────────────

/// `[assistant]` section values.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub bot_name: String,
    /// Working directory for all persistent data (already expanded, no `~`).
    pub work_dir: PathBuf,
    pub log_level: String,
}

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub assistant: AssistantConfig,
    pub comms: CommsConfig,
    pub memory: MemoryConfig,
    pub documents: DocumentsConfig,
}

impl Config {
    /// Returns `true` if the HTTP channel should be started.
    pub fn comms_axum_should_load(&self) -> bool {
        self.comms.axum_channel.enabled
    }

    /// Absolute path of the SQLite database file.
    pub fn db_path(&self) -> PathBuf {
        if self.memory.db_file.is_absolute() {
            self.memory.db_file.clone()
        } else {
            self.assistant.work_dir.join(&self.memory.db_file)
        }
    }

    /// Absolute path of the downloads directory.
    pub fn downloads_dir(&self) -> PathBuf {
        if self.documents.dir.is_absolute() {
            self.documents.dir.clone()
        } else {
            self.assistant.work_dir.join(&self.documents.dir)
        }
    }
}
