//! Page metadata extractor.
//!
//! Fetches a web page and extracts bookmark metadata (title, description,
//! thumbnail, favicon, author, published date) via prioritized selector
//! fallback chains. Fetch only — persistence is the caller's responsibility.

use std::time::Duration;

use scraper::{Html, Selector};
use url::Url;

use crate::types::errors::MetadataError;
use crate::types::metadata::PageMetadata;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; LinkstashBot/1.0)";
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_DESCRIPTION_LEN: usize = 500;

/// Metadata extractor holding a preconfigured HTTP client.
#[derive(Clone)]
pub struct MetadataExtractor {
    client: reqwest::Client,
}

impl MetadataExtractor {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { client }
    }

    /// Fetches `url` and extracts page metadata.
    ///
    /// The outbound fetch is bounded by a hard 10-second timeout and is not
    /// retried. A non-success response yields `UpstreamStatus` with the
    /// status clamped to [200, 599].
    pub async fn extract(&self, url: &str) -> Result<PageMetadata, MetadataError> {
        let page_url = Url::parse(url).map_err(|_| MetadataError::InvalidUrl(url.to_string()))?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MetadataError::from_status(status.as_u16()));
        }

        let html = response
            .text()
            .await
            .map_err(|e| MetadataError::Network(e.to_string()))?;

        Ok(extract_from_html(&html, &page_url))
    }
}

impl Default for MetadataExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extracts metadata from an already-fetched HTML document.
///
/// Each field is resolved independently: the first non-empty value in its
/// fallback chain wins. Relative thumbnail/favicon URLs are resolved against
/// the page's origin.
pub fn extract_from_html(html: &str, page_url: &Url) -> PageMetadata {
    let doc = Html::parse_document(html);
    let hostname = page_url.host_str().unwrap_or_default().to_string();

    // Title: og:title > twitter:title > <title> > first <h1> > hostname
    let title = attr_of(&doc, "meta[property=\"og:title\"]", "content")
        .or_else(|| attr_of(&doc, "meta[name=\"twitter:title\"]", "content"))
        .or_else(|| text_of(&doc, "title"))
        .or_else(|| text_of(&doc, "h1"))
        .unwrap_or_else(|| hostname.clone());

    let description = attr_of(&doc, "meta[property=\"og:description\"]", "content")
        .or_else(|| attr_of(&doc, "meta[name=\"twitter:description\"]", "content"))
        .or_else(|| attr_of(&doc, "meta[name=\"description\"]", "content"))
        .unwrap_or_default();

    let thumbnail_url = attr_of(&doc, "meta[property=\"og:image\"]", "content")
        .or_else(|| attr_of(&doc, "meta[name=\"twitter:image\"]", "content"))
        .or_else(|| attr_of(&doc, "meta[name=\"thumbnail\"]", "content"))
        .unwrap_or_default();

    let favicon = attr_of(&doc, "link[rel=\"icon\"]", "href")
        .or_else(|| attr_of(&doc, "link[rel=\"shortcut icon\"]", "href"))
        .unwrap_or_else(|| fallback_favicon(&hostname));

    let author = attr_of(&doc, "meta[name=\"author\"]", "content")
        .or_else(|| attr_of(&doc, "meta[property=\"article:author\"]", "content"))
        .unwrap_or_default();

    let published_at = attr_of(&doc, "meta[property=\"article:published_time\"]", "content")
        .or_else(|| attr_of(&doc, "meta[name=\"publish_date\"]", "content"))
        .or_else(|| attr_of(&doc, "meta[name=\"date\"]", "content"))
        .unwrap_or_default();

    PageMetadata {
        url: page_url.to_string(),
        domain: hostname,
        title: collapse_whitespace(&title),
        description: truncate_description(&description),
        thumbnail_url: absolutize(&thumbnail_url, page_url),
        favicon: absolutize(&favicon, page_url),
        author,
        published_at,
    }
}

/// Synthesized favicon-service URL for a hostname.
pub fn fallback_favicon(hostname: &str) -> String {
    format!("https://www.google.com/s2/favicons?domain={}&sz=64", hostname)
}

/// First non-empty attribute value matching the selector.
fn attr_of(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .filter_map(|el| el.value().attr(attr))
        .map(|v| v.to_string())
        .find(|v| !v.trim().is_empty())
}

/// First non-empty text content matching the selector.
fn text_of(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    doc.select(&sel)
        .map(|el| el.text().collect::<String>())
        .find(|t| !t.trim().is_empty())
}

/// Collapses runs of whitespace to single spaces and trims.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates a description longer than 500 characters to 497 plus "...".
fn truncate_description(s: &str) -> String {
    if s.chars().count() > MAX_DESCRIPTION_LEN {
        let head: String = s.chars().take(MAX_DESCRIPTION_LEN - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

/// Resolves a relative URL against the page's origin. Absolute URLs and
/// empty strings pass through unchanged.
fn absolutize(candidate: &str, page_url: &Url) -> String {
    if candidate.is_empty() || candidate.starts_with("http") {
        return candidate.to_string();
    }
    let origin = page_url.origin().ascii_serialization();
    match Url::parse(&origin).and_then(|base| base.join(candidate)) {
        Ok(resolved) => resolved.to_string(),
        Err(_) => candidate.to_string(),
    }
}
