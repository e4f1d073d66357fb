//! Database repository layer
//!
//! SQLite implementation of [`CompletionStore`] and [`MessageLog`].

use super::store::{CompletionStore, MessageLog};
use crate::error::{Error, Result};
use crate::types::{ChatEvent, CompletionEvent};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Mutex;

/// SQLite-backed completion store and message log.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL lets the stats binary read while a chat session is writing
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    fn row_to_completion(row: &Row) -> rusqlite::Result<CompletionEvent> {
        let created_at_str: String = row.get("created_at")?;
        Ok(CompletionEvent {
            id: row.get("id")?,
            user: row.get("user")?,
            stage: row.get("stage")?,
            created_at: parse_timestamp(&created_at_str),
        })
    }

    fn row_to_chat(row: &Row) -> rusqlite::Result<ChatEvent> {
        let created_at_str: String = row.get("created_at")?;
        Ok(ChatEvent {
            id: row.get("id")?,
            message: row.get("message")?,
            created_at: parse_timestamp(&created_at_str),
        })
    }
}

/// Parse a stored RFC 3339 timestamp, falling back to the epoch for rows
/// written before timestamps were recorded.
fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

// ============================================
// Completion operations
// ============================================

impl CompletionStore for Database {
    fn append_completion(&self, user: &str, stage: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO progress (user, stage, created_at) VALUES (?1, ?2, ?3)",
            params![user, stage, Utc::now().to_rfc3339()],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, user, stage, "Completion recorded");
        Ok(id)
    }

    fn completions_for_user(&self, user: &str) -> Result<Vec<CompletionEvent>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, user, stage, created_at FROM progress WHERE user = ? ORDER BY id",
        )?;
        let events = stmt
            .query_map([user], Self::row_to_completion)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(events)
    }

    fn completion_counts_by_stage(&self) -> Result<BTreeMap<String, i64>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT stage, COUNT(*) FROM progress GROUP BY stage")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get(1)?)))?;

        let mut counts = BTreeMap::new();
        for row in rows {
            let (stage, count) = row?;
            counts.insert(stage, count);
        }
        Ok(counts)
    }

    fn count_distinct_users(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 =
            conn.query_row("SELECT COUNT(DISTINCT user) FROM progress", [], |r| r.get(0))?;
        Ok(count)
    }

    fn latest_completion_at(&self) -> Result<Option<DateTime<Utc>>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT created_at FROM progress ORDER BY id DESC LIMIT 1",
            [],
            |r| r.get::<_, String>(0),
        )
        .optional()
        .map(|ts| ts.map(|s| parse_timestamp(&s)))
        .map_err(Error::from)
    }
}

// ============================================
// Chat operations
// ============================================

impl MessageLog for Database {
    fn append_chat(&self, message: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO chats (message, created_at) VALUES (?1, ?2)",
            params![message, Utc::now().to_rfc3339()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn count_chats(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM chats", [], |r| r.get(0))?;
        Ok(count)
    }

    fn recent_chats(&self, limit: usize) -> Result<Vec<ChatEvent>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt =
            conn.prepare("SELECT id, message, created_at FROM chats ORDER BY id DESC LIMIT ?")?;
        let chats = stmt
            .query_map([limit as i64], Self::row_to_chat)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(chats)
    }
}
