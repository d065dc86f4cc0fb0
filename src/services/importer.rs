//! Import pipeline orchestration: deduplication and the two-phase commit.
//!
//! `import_file` runs the whole pipeline for one uploaded export file:
//! format detection → parse → normalize → commit. The commit is two ordered
//! phases (collections, then a batched bookmark insert) that are *not*
//! wrapped in a cross-phase transaction: a failed bookmark batch after
//! collections were committed leaves empty collections behind, reported via
//! counts rather than an error.

use std::collections::HashMap;

use rusqlite::Connection;

use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::collection_manager::{CollectionManager, CollectionManagerTrait};
use crate::types::errors::ImportError;
use crate::types::import::{CollectionRegistry, ImportFormat, ImportSummary, NormalizedBookmark};

use super::{import_normalizer, import_parser};

/// Result of one import run: the caller-visible counts plus the row ids
/// written in each phase (used for change notification).
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub summary: ImportSummary,
    pub bookmark_ids: Vec<String>,
    pub collection_ids: Vec<String>,
}

/// Maps a file name to an import format by extension.
pub fn detect_format(filename: &str) -> Result<ImportFormat, ImportError> {
    let lower = filename.to_lowercase();
    if lower.ends_with(".html") {
        Ok(ImportFormat::Html)
    } else if lower.ends_with(".json") {
        Ok(ImportFormat::Json)
    } else {
        Err(ImportError::UnsupportedFormat(filename.to_string()))
    }
}

/// Runs the full import pipeline for one file.
pub fn import_file(
    conn: &Connection,
    user_id: &str,
    filename: &str,
    content: &str,
) -> Result<ImportOutcome, ImportError> {
    let format = detect_format(filename)?;
    let tree = import_parser::parse(content, format)?;
    let (bookmarks, registry) = import_normalizer::normalize(&tree, user_id);
    commit(conn, user_id, &bookmarks, &registry)
}

/// Deduplication and persistence gate.
///
/// 1. Load the user's stored URL set.
/// 2. Partition into new vs duplicate by exact string equality — no URL
///    normalization of trailing slashes or query order.
/// 3. Insert collections one row at a time, in registry order; a failed
///    insert is silently omitted from the name→id map.
/// 4. Rewrite each new bookmark's collection name to an id; unmapped names
///    become NULL (the bookmark lands uncategorized).
/// 5. One batched bookmark insert; if it errors, `imported` is 0 and the
///    request still succeeds.
pub fn commit(
    conn: &Connection,
    user_id: &str,
    bookmarks: &[NormalizedBookmark],
    registry: &CollectionRegistry,
) -> Result<ImportOutcome, ImportError> {
    let bookmark_mgr = BookmarkManager::new(conn);
    let existing = bookmark_mgr
        .existing_urls(user_id)
        .map_err(|e| ImportError::DatabaseError(e.to_string()))?;

    let total = bookmarks.len();
    let new_bookmarks: Vec<&NormalizedBookmark> = bookmarks
        .iter()
        .filter(|b| !existing.contains(&b.url))
        .collect();
    let skipped = total - new_bookmarks.len();

    // Phase 1: collections, one insert per registered name
    let mut collection_mgr = CollectionManager::new(conn);
    let mut name_to_id: HashMap<String, String> = HashMap::new();
    let mut collection_ids = Vec::new();
    for seed in registry.iter() {
        if let Ok(created) = collection_mgr.create_with_color(user_id, &seed.name, &seed.color) {
            name_to_id.insert(seed.name.clone(), created.id.clone());
            collection_ids.push(created.id);
        }
    }

    // Phase 2: one batched bookmark insert
    let rows: Vec<(NormalizedBookmark, Option<String>)> = new_bookmarks
        .iter()
        .map(|b| {
            let collection_id = b
                .collection
                .as_ref()
                .and_then(|name| name_to_id.get(name).cloned());
            ((*b).clone(), collection_id)
        })
        .collect();

    let bookmark_ids = if rows.is_empty() {
        Vec::new()
    } else {
        bookmark_mgr.insert_batch(&rows).unwrap_or_default()
    };

    Ok(ImportOutcome {
        summary: ImportSummary {
            imported: bookmark_ids.len(),
            skipped,
            total,
        },
        bookmark_ids,
        collection_ids,
    })
}
