use serde::{Deserialize, Serialize};

/// Represents a saved bookmark, owned by exactly one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: String,
    pub user_id: String,
    pub url: String,
    pub title: String,
    pub favicon: String,
    pub collection_id: Option<String>,
    pub is_favorite: bool,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub domain: String,
    pub tags: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A user-defined named grouping of bookmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub color: String,
    pub created_at: i64,
}

/// Tag usage count, returned by the analytics aggregation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCount {
    pub tag: String,
    pub count: i64,
}

/// Listing filter for bookmarks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookmarkFilter {
    All,
    Favorites,
    /// Bookmarks created within the last 7 days.
    Recent,
    /// Bookmarks in a specific collection.
    Collection(String),
}
