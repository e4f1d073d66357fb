//! Database schema and migrations
//!
//! Uses SQLite with embedded migrations managed via PRAGMA user_version.

use crate::error::Result;
use rusqlite::Connection;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// SQL migrations, indexed by version number
const MIGRATIONS: &[&str] = &[
    // Version 1: completion and chat logs
    r#"
    CREATE TABLE IF NOT EXISTS progress (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        user             TEXT NOT NULL,
        stage            TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS chats (
        id               INTEGER PRIMARY KEY AUTOINCREMENT,
        message          TEXT NOT NULL
    );
    "#,
    // Version 2: timestamps for the admin view, lookup indexes
    r#"
    ALTER TABLE progress ADD COLUMN created_at DATETIME NOT NULL DEFAULT '1970-01-01T00:00:00+00:00';
    ALTER TABLE chats ADD COLUMN created_at DATETIME NOT NULL DEFAULT '1970-01-01T00:00:00+00:00';

    CREATE INDEX IF NOT EXISTS idx_progress_user ON progress(user);
    CREATE INDEX IF NOT EXISTS idx_progress_stage ON progress(stage);
    "#,
];

/// Bring the database up to [`SCHEMA_VERSION`].
///
/// Each step runs in its own transaction together with the `user_version`
/// bump, so an interrupted upgrade resumes from the last finished step.
/// Databases at or beyond the current version are left alone.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let from = schema_version(conn)?;
    if from >= SCHEMA_VERSION {
        tracing::debug!(version = from, "Schema up to date");
        return Ok(());
    }

    for (version, sql) in pending(from) {
        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        tx.commit()?;
        tracing::info!(version, "Applied migration");
    }

    tracing::info!(from, to = SCHEMA_VERSION, "Schema upgraded");
    Ok(())
}

/// Migrations newer than `from`, paired with the version they produce.
fn pending(from: i32) -> impl Iterator<Item = (i32, &'static str)> {
    MIGRATIONS
        .iter()
        .enumerate()
        .map(|(i, sql)| (i as i32 + 1, *sql))
        .filter(move |(version, _)| *version > from)
}

/// Schema version recorded in the database header.
pub fn schema_version(conn: &Connection) -> Result<i32> {
    Ok(conn.query_row("PRAGMA user_version", [], |r| r.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_tables_created() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        for table in ["progress", "chats"] {
            let exists: i32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?",
                    [table],
                    |r| r.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "Table {} should exist", table);
        }
    }

    #[test]
    fn test_upgrades_version_one_database() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(MIGRATIONS[0]).unwrap();
        conn.execute_batch("PRAGMA user_version = 1").unwrap();
        conn.execute(
            "INSERT INTO progress (user, stage) VALUES ('demo_user', 'Dough - Create Account')",
            [],
        )
        .unwrap();

        run_migrations(&conn).unwrap();

        let created_at: String = conn
            .query_row("SELECT created_at FROM progress", [], |r| r.get(0))
            .unwrap();
        assert!(created_at.starts_with("1970-01-01"));
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_newer_database_is_untouched() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA user_version = 99").unwrap();

        run_migrations(&conn).unwrap();

        assert_eq!(schema_version(&conn).unwrap(), 99);
        let tables: i32 = conn
            .query_row("SELECT COUNT(*) FROM sqlite_master WHERE type='table'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(tables, 0);
    }

    #[test]
    fn test_pending_skips_applied_steps() {
        let versions: Vec<i32> = pending(1).map(|(v, _)| v).collect();
        assert_eq!(versions, vec![2]);
        assert_eq!(pending(SCHEMA_VERSION).count(), 0);
    }
}
