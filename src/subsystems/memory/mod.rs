//! Interaction log — append-only SQLite store of chat interactions.
//!
//! Every resolved message (including synthetic welcome events) becomes one
//! row. Connections are opened per operation with WAL + busy-timeout pragmas;
//! concurrent appends rely on SQLite's own locking, no locking of our own.

use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use rusqlite::{Connection, params};

use crate::core::error::AppError;

/// Schema version stored in `PRAGMA user_version`.
/// Increment when the DDL changes; add a migration path in `open`.
const SCHEMA_VERSION: i64 = 1;

/// One logged interaction, as read back from the store.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Interaction {
    /// Sequential row id assigned by SQLite.
    pub id: i64,
    pub session_id: String,
    pub user_message: String,
    pub bot_response: String,
    pub intent: String,
    /// RFC 3339 UTC, or `None` on legacy rows with no timestamp.
    pub timestamp: Option<String>,
}

/// Append-only interaction store backed by a single SQLite file.
pub struct InteractionLog {
    db_path: PathBuf,
}

impl InteractionLog {
    /// Open (creating if necessary) the log at `db_path`.
    /// The parent directory must already exist.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let log = Self { db_path: db_path.into() };

        let conn = log.open_conn()?;
        let version: i64 = conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .map_err(|e| AppError::Memory(format!("interaction log: read user_version: {e}")))?;
        if version < SCHEMA_VERSION {
            init_schema(&conn)?;
        }

        Ok(log)
    }

    /// Append one interaction; assigns the row id and a UTC timestamp.
    /// Durable once this returns.
    pub fn append(
        &self,
        session_id: &str,
        user_message: &str,
        bot_response: &str,
        intent: &str,
    ) -> Result<i64, AppError> {
        let conn = self.open_conn()?;
        conn.execute(
            "INSERT INTO interactions (session_id, user_message, bot_response, intent, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![session_id, user_message, bot_response, intent, now_iso8601()],
        )
        .map_err(|e| AppError::Memory(format!("interaction log: insert: {e}")))?;

        Ok(conn.last_insert_rowid())
    }

    /// Most recent interactions for one session, newest first.
    pub fn recent_by_session(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<Interaction>, AppError> {
        let conn = self.open_conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, session_id, user_message, bot_response, intent, timestamp
                 FROM interactions
                 WHERE session_id = ?1
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?2",
            )
            .map_err(|e| AppError::Memory(format!("interaction log: prepare by-session: {e}")))?;

        let rows = stmt
            .query_map(params![session_id, limit as i64], row_to_interaction)
            .map_err(|e| AppError::Memory(format!("interaction log: query by-session: {e}")))?;

        collect_rows(rows)
    }

    /// Most recent interactions across all sessions, newest first.
    /// Feeds the admin analytics view.
    pub fn recent_global(&self, limit: usize) -> Result<Vec<Interaction>, AppError> {
        let conn = self.open_conn()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, session_id, user_message, bot_response, intent, timestamp
                 FROM interactions
                 ORDER BY timestamp DESC, id DESC
                 LIMIT ?1",
            )
            .map_err(|e| AppError::Memory(format!("interaction log: prepare global: {e}")))?;

        let rows = stmt
            .query_map(params![limit as i64], row_to_interaction)
            .map_err(|e| AppError::Memory(format!("interaction log: query global: {e}")))?;

        collect_rows(rows)
    }

    /// Whether any interaction exists for `session_id`.
    pub fn has_session(&self, session_id: &str) -> Result<bool, AppError> {
        let conn = self.open_conn()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM interactions WHERE session_id = ?1",
                params![session_id],
                |row| row.get(0),
            )
            .map_err(|e| AppError::Memory(format!("interaction log: count session: {e}")))?;
        Ok(count > 0)
    }

    /// Open a connection to the log and apply recommended pragmas.
    ///
    /// - `journal_mode = WAL` — concurrent readers alongside a writer.
    /// - `foreign_keys = ON` — enforce FK constraints.
    /// - `busy_timeout = 5000` — wait up to 5 s before `SQLITE_BUSY`.
    fn open_conn(&self) -> Result<Connection, AppError> {
        let conn = Connection::open(&self.db_path).map_err(|e| {
            AppError::Memory(format!("interaction log: open {}: {e}", self.db_path.display()))
        })?;

        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| AppError::Memory(format!("interaction log: set journal_mode WAL: {e}")))?;
        conn.pragma_update(None, "foreign_keys", "ON")
            .map_err(|e| AppError::Memory(format!("interaction log: set foreign_keys ON: {e}")))?;
        conn.pragma_update(None, "busy_timeout", 5000)
            .map_err(|e| AppError::Memory(format!("interaction log: set busy_timeout: {e}")))?;

        Ok(conn)
    }
}

/// Execute the v1 schema DDL on a freshly-opened connection.
fn init_schema(conn: &Connection) -> Result<(), AppError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS interactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id TEXT NOT NULL,
            user_message TEXT NOT NULL,
            bot_response TEXT NOT NULL,
            intent TEXT NOT NULL,
            timestamp TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_interactions_session
            ON interactions (session_id, timestamp);

        PRAGMA user_version = 1;
        ",
    )
    .map_err(|e| AppError::Memory(format!("interaction log: initialize schema: {e}")))
}

fn row_to_interaction(row: &rusqlite::Row<'_>) -> rusqlite::Result<Interaction> {
    Ok(Interaction {
        id: row.get(0)?,
        session_id: row.get(1)?,
        user_message: row.get(2)?,
        bot_response: row.get(3)?,
        intent: row.get(4)?,
        timestamp: row.get(5)?,
    })
}

fn collect_rows<I>(rows: I) -> Result<Vec<Interaction>, AppError>
where
    I: Iterator<Item = rusqlite::Result<Interaction>>,
{
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| AppError::Memory(format!("interaction log: map row: {e}")))?);
    }
    Ok(out)
}

/// Current UTC time as an RFC 3339 string with second precision, e.g.
/// `"2025-04-01T12:00:00Z"`.
fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
