//! Collection Manager for Linkstash.
//!
//! Implements `CollectionManagerTrait` — per-user CRUD for collections,
//! backed by SQLite via `rusqlite`.

use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::types::bookmark::Collection;
use crate::types::errors::CollectionError;
use crate::types::import::COLLECTION_PALETTE;

/// Trait defining collection management operations.
pub trait CollectionManagerTrait {
    /// Creates a collection with a palette color picked from the user's
    /// current collection count. Returns the stored row.
    fn create_collection(&mut self, user_id: &str, name: &str) -> Result<Collection, CollectionError>;
    /// Creates a collection with an explicit color. Used by the import gate,
    /// which assigns colors from the registry instead of the row count.
    fn create_with_color(
        &mut self,
        user_id: &str,
        name: &str,
        color: &str,
    ) -> Result<Collection, CollectionError>;
    fn list_collections(&self, user_id: &str) -> Result<Vec<Collection>, CollectionError>;
    /// Deletes a collection; its bookmarks become uncategorized.
    fn delete_collection(&mut self, user_id: &str, id: &str) -> Result<(), CollectionError>;
}

/// Collection manager backed by a SQLite connection.
pub struct CollectionManager<'a> {
    conn: &'a Connection,
}

impl<'a> CollectionManager<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn row_to_collection(row: &rusqlite::Row) -> rusqlite::Result<Collection> {
        Ok(Collection {
            id: row.get(0)?,
            user_id: row.get(1)?,
            name: row.get(2)?,
            color: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}

impl<'a> CollectionManagerTrait for CollectionManager<'a> {
    fn create_collection(&mut self, user_id: &str, name: &str) -> Result<Collection, CollectionError> {
        let count: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM collections WHERE user_id = ?1",
                params![user_id],
                |row| row.get(0),
            )
            .map_err(|e| CollectionError::DatabaseError(e.to_string()))?;

        let color = COLLECTION_PALETTE[(count as usize) % COLLECTION_PALETTE.len()];
        self.create_with_color(user_id, name, color)
    }

    fn create_with_color(
        &mut self,
        user_id: &str,
        name: &str,
        color: &str,
    ) -> Result<Collection, CollectionError> {
        let id = Uuid::new_v4().to_string();
        let now = Self::now();

        self.conn
            .execute(
                "INSERT INTO collections (id, user_id, name, color, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, user_id, name, color, now],
            )
            .map_err(|e| CollectionError::DatabaseError(e.to_string()))?;

        Ok(Collection {
            id,
            user_id: user_id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            created_at: now,
        })
    }

    fn list_collections(&self, user_id: &str) -> Result<Vec<Collection>, CollectionError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, name, color, created_at FROM collections \
                 WHERE user_id = ?1 ORDER BY created_at ASC",
            )
            .map_err(|e| CollectionError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], Self::row_to_collection)
            .map_err(|e| CollectionError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| CollectionError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }

    fn delete_collection(&mut self, user_id: &str, id: &str) -> Result<(), CollectionError> {
        // Move contained bookmarks to uncategorized before deleting
        self.conn
            .execute(
                "UPDATE bookmarks SET collection_id = NULL WHERE collection_id = ?1 AND user_id = ?2",
                params![id, user_id],
            )
            .map_err(|e| CollectionError::DatabaseError(e.to_string()))?;

        let affected = self
            .conn
            .execute(
                "DELETE FROM collections WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )
            .map_err(|e| CollectionError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(CollectionError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
