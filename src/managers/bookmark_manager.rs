//! Bookmark Manager for Linkstash.
//!
//! Implements `BookmarkManagerTrait` — per-user CRUD for bookmarks and their
//! tags, backed by SQLite via `rusqlite`.

use std::collections::HashSet;
use std::time::{SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection};
use url::Url;
use uuid::Uuid;

use crate::types::bookmark::{Bookmark, BookmarkFilter, TagCount};
use crate::types::errors::BookmarkError;
use crate::types::import::NormalizedBookmark;

/// Window for the "recent" filter, in seconds (7 days).
const RECENT_WINDOW_SECS: i64 = 7 * 86_400;

/// Trait defining bookmark management operations.
pub trait BookmarkManagerTrait {
    /// Adds a bookmark with optional metadata and tags. Returns the stored row.
    fn add_bookmark(
        &mut self,
        user_id: &str,
        url: &str,
        title: &str,
        tags: &[String],
        description: Option<&str>,
        thumbnail_url: Option<&str>,
    ) -> Result<Bookmark, BookmarkError>;
    fn remove_bookmark(&mut self, user_id: &str, id: &str) -> Result<(), BookmarkError>;
    /// Flips the favorite flag. Returns the new state.
    fn toggle_favorite(&mut self, user_id: &str, id: &str) -> Result<bool, BookmarkError>;
    /// Replaces the bookmark's tag set (lowercased, trimmed, deduplicated).
    fn set_tags(&mut self, user_id: &str, id: &str, tags: &[String]) -> Result<(), BookmarkError>;
    fn list_bookmarks(&self, user_id: &str, filter: &BookmarkFilter) -> Result<Vec<Bookmark>, BookmarkError>;
    fn search_bookmarks(&self, user_id: &str, query: &str) -> Result<Vec<Bookmark>, BookmarkError>;
    /// All URLs currently stored for the user. Used by the import gate.
    fn existing_urls(&self, user_id: &str) -> Result<HashSet<String>, BookmarkError>;
    /// Tag usage counts across the user's bookmarks, most-used first.
    fn tag_counts(&self, user_id: &str) -> Result<Vec<TagCount>, BookmarkError>;
}

/// Bookmark manager backed by a SQLite connection.
pub struct BookmarkManager<'a> {
    conn: &'a Connection,
}

/// Lowercases, trims, drops empties, and deduplicates a tag list, preserving
/// first-seen order.
pub fn sanitize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for tag in tags {
        let t = tag.trim().to_lowercase();
        if t.is_empty() {
            continue;
        }
        if seen.insert(t.clone()) {
            out.push(t);
        }
    }
    out
}

impl<'a> BookmarkManager<'a> {
    /// Creates a new `BookmarkManager` using the provided database connection.
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Returns the current UNIX timestamp in seconds.
    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    /// Hostname of a URL, falling back to the URL itself when it won't parse.
    fn hostname_of(url: &str) -> String {
        Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_else(|| url.to_string())
    }

    /// Reads a single bookmark row into a struct (tags loaded separately).
    fn row_to_bookmark(row: &rusqlite::Row) -> rusqlite::Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            user_id: row.get(1)?,
            url: row.get(2)?,
            title: row.get(3)?,
            favicon: row.get(4)?,
            collection_id: row.get(5)?,
            is_favorite: row.get::<_, i64>(6)? != 0,
            description: row.get(7)?,
            thumbnail_url: row.get(8)?,
            domain: row.get(9)?,
            tags: Vec::new(),
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    const SELECT_COLUMNS: &'static str =
        "id, user_id, url, title, favicon, collection_id, is_favorite, \
         description, thumbnail_url, domain, created_at, updated_at";

    /// Loads the tag set for each bookmark in the slice.
    fn attach_tags(&self, bookmarks: &mut [Bookmark]) -> Result<(), BookmarkError> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag FROM bookmark_tags WHERE bookmark_id = ?1 ORDER BY tag")
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        for bm in bookmarks.iter_mut() {
            let rows = stmt
                .query_map(params![bm.id], |row| row.get::<_, String>(0))
                .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
            let mut tags = Vec::new();
            for tag in rows {
                tags.push(tag.map_err(|e| BookmarkError::DatabaseError(e.to_string()))?);
            }
            bm.tags = tags;
        }
        Ok(())
    }

    fn write_tags(&self, bookmark_id: &str, tags: &[String]) -> Result<(), BookmarkError> {
        for tag in tags {
            self.conn
                .execute(
                    "INSERT OR IGNORE INTO bookmark_tags (bookmark_id, tag) VALUES (?1, ?2)",
                    params![bookmark_id, tag],
                )
                .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        }
        Ok(())
    }

    /// Inserts a batch of import rows in a single transaction.
    ///
    /// Each element pairs a normalized bookmark with its resolved collection
    /// id (already rewritten from the folder name, None if unmapped). Returns
    /// the ids of the inserted rows; the whole batch commits or rolls back as
    /// one store-level call.
    pub fn insert_batch(
        &self,
        rows: &[(NormalizedBookmark, Option<String>)],
    ) -> Result<Vec<String>, BookmarkError> {
        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let now = Self::now();
        let mut ids = Vec::with_capacity(rows.len());
        for (bm, collection_id) in rows {
            let id = Uuid::new_v4().to_string();
            tx.execute(
                "INSERT INTO bookmarks (id, user_id, url, title, favicon, collection_id, \
                 is_favorite, domain, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    id,
                    bm.user_id,
                    bm.url,
                    bm.title,
                    bm.favicon,
                    collection_id,
                    bm.is_favorite as i64,
                    bm.domain,
                    now,
                    now
                ],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
            ids.push(id);
        }

        tx.commit()
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        Ok(ids)
    }
}

impl<'a> BookmarkManagerTrait for BookmarkManager<'a> {
    fn add_bookmark(
        &mut self,
        user_id: &str,
        url: &str,
        title: &str,
        tags: &[String],
        description: Option<&str>,
        thumbnail_url: Option<&str>,
    ) -> Result<Bookmark, BookmarkError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(BookmarkError::InvalidUrl(url.to_string()));
        }

        // URL uniqueness is per user, checked at persistence time
        let existing: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM bookmarks WHERE user_id = ?1 AND url = ?2",
                params![user_id, url],
                |row| row.get(0),
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        if existing > 0 {
            return Err(BookmarkError::DuplicateUrl(url.to_string()));
        }

        let hostname = Self::hostname_of(url);
        let title = if title.trim().is_empty() { hostname.as_str() } else { title };
        let favicon = format!(
            "https://www.google.com/s2/favicons?domain={}&sz=128",
            hostname
        );

        let id = Uuid::new_v4().to_string();
        let now = Self::now();

        self.conn
            .execute(
                "INSERT INTO bookmarks (id, user_id, url, title, favicon, collection_id, \
                 is_favorite, description, thumbnail_url, domain, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, NULL, 0, ?6, ?7, ?8, ?9, ?10)",
                params![id, user_id, url, title, favicon, description, thumbnail_url, hostname, now, now],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let tags = sanitize_tags(tags);
        self.write_tags(&id, &tags)?;

        Ok(Bookmark {
            id,
            user_id: user_id.to_string(),
            url: url.to_string(),
            title: title.to_string(),
            favicon,
            collection_id: None,
            is_favorite: false,
            description: description.map(|s| s.to_string()),
            thumbnail_url: thumbnail_url.map(|s| s.to_string()),
            domain: hostname,
            tags,
            created_at: now,
            updated_at: now,
        })
    }

    fn remove_bookmark(&mut self, user_id: &str, id: &str) -> Result<(), BookmarkError> {
        let affected = self
            .conn
            .execute(
                "DELETE FROM bookmarks WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }
        // Tag rows cascade via the foreign key
        Ok(())
    }

    fn toggle_favorite(&mut self, user_id: &str, id: &str) -> Result<bool, BookmarkError> {
        let now = Self::now();
        let affected = self
            .conn
            .execute(
                "UPDATE bookmarks SET is_favorite = 1 - is_favorite, updated_at = ?1 \
                 WHERE id = ?2 AND user_id = ?3",
                params![now, id, user_id],
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        if affected == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }

        let is_favorite: i64 = self
            .conn
            .query_row(
                "SELECT is_favorite FROM bookmarks WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        Ok(is_favorite != 0)
    }

    fn set_tags(&mut self, user_id: &str, id: &str, tags: &[String]) -> Result<(), BookmarkError> {
        let owned: i64 = self
            .conn
            .query_row(
                "SELECT COUNT(*) FROM bookmarks WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                |row| row.get(0),
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        if owned == 0 {
            return Err(BookmarkError::NotFound(id.to_string()));
        }

        self.conn
            .execute("DELETE FROM bookmark_tags WHERE bookmark_id = ?1", params![id])
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;
        self.write_tags(id, &sanitize_tags(tags))
    }

    fn list_bookmarks(&self, user_id: &str, filter: &BookmarkFilter) -> Result<Vec<Bookmark>, BookmarkError> {
        let base = format!(
            "SELECT {} FROM bookmarks WHERE user_id = ?1",
            Self::SELECT_COLUMNS
        );
        let (sql, extra): (String, Option<String>) = match filter {
            BookmarkFilter::All => (format!("{} ORDER BY created_at DESC", base), None),
            BookmarkFilter::Favorites => (
                format!("{} AND is_favorite = 1 ORDER BY created_at DESC", base),
                None,
            ),
            BookmarkFilter::Recent => (
                format!("{} AND created_at > ?2 ORDER BY created_at DESC", base),
                Some((Self::now() - RECENT_WINDOW_SECS).to_string()),
            ),
            BookmarkFilter::Collection(id) => (
                format!("{} AND collection_id = ?2 ORDER BY created_at DESC", base),
                Some(id.clone()),
            ),
        };

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let rows = match &extra {
            Some(arg) => stmt.query_map(params![user_id, arg], Self::row_to_bookmark),
            None => stmt.query_map(params![user_id], Self::row_to_bookmark),
        }
        .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| BookmarkError::DatabaseError(e.to_string()))?);
        }
        self.attach_tags(&mut results)?;
        Ok(results)
    }

    fn search_bookmarks(&self, user_id: &str, query: &str) -> Result<Vec<Bookmark>, BookmarkError> {
        let pattern = format!("%{}%", query);
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {} FROM bookmarks WHERE user_id = ?1 AND (title LIKE ?2 OR url LIKE ?2) \
                 ORDER BY created_at DESC",
                Self::SELECT_COLUMNS
            ))
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id, pattern], Self::row_to_bookmark)
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| BookmarkError::DatabaseError(e.to_string()))?);
        }
        self.attach_tags(&mut results)?;
        Ok(results)
    }

    fn existing_urls(&self, user_id: &str) -> Result<HashSet<String>, BookmarkError> {
        let mut stmt = self
            .conn
            .prepare("SELECT url FROM bookmarks WHERE user_id = ?1")
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let mut urls = HashSet::new();
        for url in rows {
            urls.insert(url.map_err(|e| BookmarkError::DatabaseError(e.to_string()))?);
        }
        Ok(urls)
    }

    fn tag_counts(&self, user_id: &str) -> Result<Vec<TagCount>, BookmarkError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT t.tag, COUNT(*) FROM bookmark_tags t \
                 JOIN bookmarks b ON b.id = t.bookmark_id \
                 WHERE b.user_id = ?1 \
                 GROUP BY t.tag ORDER BY COUNT(*) DESC, t.tag ASC",
            )
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok(TagCount {
                    tag: row.get(0)?,
                    count: row.get(1)?,
                })
            })
            .map_err(|e| BookmarkError::DatabaseError(e.to_string()))?;

        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|e| BookmarkError::DatabaseError(e.to_string()))?);
        }
        Ok(results)
    }
}
