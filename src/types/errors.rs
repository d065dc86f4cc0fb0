use std::fmt;

// === BookmarkError ===

/// Errors related to bookmark CRUD operations.
#[derive(Debug)]
pub enum BookmarkError {
    /// Bookmark with the given ID was not found for this user.
    NotFound(String),
    /// The provided URL is not an absolute HTTP(S) URL.
    InvalidUrl(String),
    /// A bookmark with the same URL already exists for this user.
    DuplicateUrl(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for BookmarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookmarkError::NotFound(id) => write!(f, "Bookmark not found: {}", id),
            BookmarkError::InvalidUrl(url) => write!(f, "Invalid bookmark URL: {}", url),
            BookmarkError::DuplicateUrl(url) => write!(f, "Duplicate bookmark URL: {}", url),
            BookmarkError::DatabaseError(msg) => {
                write!(f, "Bookmark database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for BookmarkError {}

// === CollectionError ===

/// Errors related to collection management.
#[derive(Debug)]
pub enum CollectionError {
    /// Collection with the given ID was not found for this user.
    NotFound(String),
    /// Database operation failed.
    DatabaseError(String),
}

impl fmt::Display for CollectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionError::NotFound(id) => write!(f, "Collection not found: {}", id),
            CollectionError::DatabaseError(msg) => {
                write!(f, "Collection database error: {}", msg)
            }
        }
    }
}

impl std::error::Error for CollectionError {}

// === MetadataError ===

/// Errors from the page metadata extractor.
#[derive(Debug)]
pub enum MetadataError {
    /// The input does not parse as an absolute URL.
    InvalidUrl(String),
    /// The upstream server answered with a non-success status. The status is
    /// clamped to [200, 599]; anything outside that range is replaced with 500.
    UpstreamStatus(u16),
    /// The fetch failed before a response arrived (DNS, connect, timeout).
    Network(String),
}

impl MetadataError {
    /// Clamps an upstream status code into the valid [200, 599] range.
    pub fn from_status(status: u16) -> Self {
        if (200..=599).contains(&status) {
            MetadataError::UpstreamStatus(status)
        } else {
            MetadataError::UpstreamStatus(500)
        }
    }
}

impl fmt::Display for MetadataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataError::InvalidUrl(url) => write!(f, "Invalid URL: {}", url),
            MetadataError::UpstreamStatus(status) => {
                write!(f, "Failed to fetch URL: upstream returned {}", status)
            }
            MetadataError::Network(msg) => write!(f, "Metadata fetch failed: {}", msg),
        }
    }
}

impl std::error::Error for MetadataError {}

// === ImportError ===

/// Errors from the bookmark-file import pipeline.
#[derive(Debug)]
pub enum ImportError {
    /// The file extension is neither .html nor .json.
    UnsupportedFormat(String),
    /// The file content could not be parsed in the declared format.
    MalformedInput(String),
    /// Database operation failed while loading the existing URL set.
    DatabaseError(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImportError::UnsupportedFormat(name) => {
                write!(f, "Unsupported file format: {}. Please upload HTML or JSON.", name)
            }
            ImportError::MalformedInput(msg) => write!(f, "Malformed import file: {}", msg),
            ImportError::DatabaseError(msg) => write!(f, "Import database error: {}", msg),
        }
    }
}

impl std::error::Error for ImportError {}

// === AiError ===

/// Errors from the AI metadata generation call.
#[derive(Debug)]
pub enum AiError {
    /// No AI credential is configured; the endpoint fails closed.
    MissingCredential,
    /// A network error occurred while calling the inference endpoint.
    Network(String),
    /// The inference endpoint returned an error.
    Provider(String),
    /// The model response did not contain the expected JSON structure.
    InvalidResponse(String),
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiError::MissingCredential => write!(f, "AI API key not configured"),
            AiError::Network(msg) => write!(f, "AI network error: {}", msg),
            AiError::Provider(msg) => write!(f, "AI provider error: {}", msg),
            AiError::InvalidResponse(msg) => {
                write!(f, "Invalid response structure from AI: {}", msg)
            }
        }
    }
}

impl std::error::Error for AiError {}
