use serde::{Deserialize, Serialize};

/// Metadata scraped from a web page for a single bookmark.
///
/// Every field is extracted independently via a prioritized fallback chain;
/// fields with no match fall back to an empty string (or a synthesized
/// favicon-service URL for `favicon`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageMetadata {
    pub url: String,
    pub domain: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub favicon: String,
    pub author: String,
    pub published_at: String,
}

/// AI-generated bookmark metadata: a short description plus suggested tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiMetadata {
    pub description: String,
    pub tags: Vec<String>,
}
