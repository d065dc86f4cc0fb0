//! Schema migrations for the Linkstash SQLite database.
//!
//! Uses a `schema_version` table to track which migrations have been applied.
//! Each migration runs exactly once and is recorded with a timestamp.

use rusqlite::Connection;

/// Current schema version. Bump this when adding a new migration.
pub const CURRENT_SCHEMA_VERSION: i32 = 2;

/// Returns the current schema version from the database (0 if table doesn't exist).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )
    .unwrap_or(0)
}

/// Runs all pending schema migrations against the provided connection.
///
/// Migrations are versioned — each runs exactly once and is recorded in
/// the `schema_version` table. Safe to call on every startup.
pub fn run_all(conn: &Connection) -> Result<(), rusqlite::Error> {
    // Enable WAL and foreign keys (always, not versioned)
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA foreign_keys = ON;
         CREATE TABLE IF NOT EXISTS schema_version (
             version INTEGER PRIMARY KEY,
             applied_at INTEGER NOT NULL,
             description TEXT NOT NULL
         );",
    )?;

    let current = get_schema_version(conn);

    if current < 1 {
        migration_v1(conn)?;
        record_version(conn, 1, "Initial schema: collections, bookmarks, tags")?;
    }

    if current < 2 {
        migration_v2(conn)?;
        record_version(conn, 2, "Add author and published_at to bookmarks")?;
    }

    Ok(())
}

fn record_version(conn: &Connection, version: i32, description: &str) -> Result<(), rusqlite::Error> {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version, applied_at, description) VALUES (?1, ?2, ?3)",
        rusqlite::params![version, now, description],
    )?;
    Ok(())
}

/// V1: Create all core tables.
///
/// Note: per-user URL uniqueness is enforced by the persistence gate, not by
/// a UNIQUE constraint, so a failed import batch never aborts on a race.
fn migration_v1(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS collections (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            name TEXT NOT NULL,
            color TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_collections_user ON collections(user_id);

        CREATE TABLE IF NOT EXISTS bookmarks (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            url TEXT NOT NULL,
            title TEXT NOT NULL,
            favicon TEXT NOT NULL DEFAULT '',
            collection_id TEXT,
            is_favorite INTEGER NOT NULL DEFAULT 0,
            description TEXT,
            thumbnail_url TEXT,
            domain TEXT NOT NULL DEFAULT '',
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            FOREIGN KEY (collection_id) REFERENCES collections(id)
        );

        CREATE INDEX IF NOT EXISTS idx_bookmarks_user ON bookmarks(user_id);
        CREATE INDEX IF NOT EXISTS idx_bookmarks_user_url ON bookmarks(user_id, url);

        CREATE TABLE IF NOT EXISTS bookmark_tags (
            bookmark_id TEXT NOT NULL,
            tag TEXT NOT NULL,
            PRIMARY KEY (bookmark_id, tag),
            FOREIGN KEY (bookmark_id) REFERENCES bookmarks(id) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_bookmark_tags_tag ON bookmark_tags(tag);
        ",
    )
}

/// V2: Add metadata columns for databases created before they existed.
fn migration_v2(conn: &Connection) -> Result<(), rusqlite::Error> {
    if conn.prepare("SELECT author FROM bookmarks LIMIT 0").is_err() {
        let _ = conn.execute_batch("ALTER TABLE bookmarks ADD COLUMN author TEXT;");
    }
    if conn.prepare("SELECT published_at FROM bookmarks LIMIT 0").is_err() {
        let _ = conn.execute_batch("ALTER TABLE bookmarks ADD COLUMN published_at TEXT;");
    }
    Ok(())
}
