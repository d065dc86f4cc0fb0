use serde::{Deserialize, Serialize};

/// Fixed 6-entry palette for collection colors, assigned round-robin by
/// registry insertion order.
pub const COLLECTION_PALETTE: [&str; 6] = [
    "hsl(220, 70%, 50%)",
    "hsl(150, 60%, 40%)",
    "hsl(340, 70%, 50%)",
    "hsl(38, 92%, 50%)",
    "hsl(270, 60%, 55%)",
    "hsl(180, 55%, 42%)",
];

/// Declared format of an uploaded browser export file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// Netscape-style nested definition-list export (Chrome, Firefox, Safari).
    Html,
    /// Firefox JSON places export.
    Json,
}

/// A bookmark as captured straight from the export file. Not yet validated
/// or user-scoped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBookmark {
    pub title: String,
    pub url: String,
    pub add_date: Option<String>,
    pub icon: Option<String>,
}

/// A node in the transient folder tree produced by the import parser.
///
/// The tree is rooted at an implicit node with `name == "root"`; the root's
/// own name is never treated as a collection name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub name: String,
    pub bookmarks: Vec<RawBookmark>,
    pub subfolders: Vec<FolderNode>,
}

impl FolderNode {
    pub fn root() -> Self {
        Self::named("root")
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bookmarks: Vec::new(),
            subfolders: Vec::new(),
        }
    }
}

/// A bookmark record ready for deduplication and persistence. The
/// `collection` field still holds the folder *name*; it is rewritten to a
/// collection id by the persistence gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedBookmark {
    pub user_id: String,
    pub url: String,
    pub title: String,
    pub favicon: String,
    pub collection: Option<String>,
    pub is_favorite: bool,
    pub domain: String,
}

/// A collection pending creation, named by its source folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionSeed {
    pub name: String,
    pub color: String,
}

/// Ordered table mapping folder names to pending collections during one
/// import run.
///
/// First-seen insertion order is significant: the k-th registered name
/// (0-indexed) receives `COLLECTION_PALETTE[k % 6]`. Backed by a Vec rather
/// than a hash map so iteration order is the registration order.
#[derive(Debug, Clone, Default)]
pub struct CollectionRegistry {
    entries: Vec<CollectionSeed>,
}

impl CollectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a folder name, first-seen-wins. The color is fixed at the
    /// moment of first registration and never reassigned.
    pub fn register(&mut self, name: &str) {
        if self.entries.iter().any(|e| e.name == name) {
            return;
        }
        let color = COLLECTION_PALETTE[self.entries.len() % COLLECTION_PALETTE.len()];
        self.entries.push(CollectionSeed {
            name: name.to_string(),
            color: color.to_string(),
        });
    }

    pub fn get(&self, name: &str) -> Option<&CollectionSeed> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates seeds in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &CollectionSeed> {
        self.entries.iter()
    }
}

/// Counts reported back to the caller after an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Rows actually written by the bookmark batch insert.
    pub imported: usize,
    /// Normalized bookmarks dropped as duplicates of stored URLs.
    pub skipped: usize,
    /// All normalized bookmarks before duplicate filtering.
    pub total: usize,
}
