//! RPC method handler for the Linkstash JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! `handle_method` dispatches method calls to the managers and services via
//! the `App` struct. Errors carry an HTTP-style status in [200, 599] and a
//! uniform `{status, error, details?}` shape.

use std::fmt;
use std::sync::Mutex;

use serde::Serialize;
use serde_json::{json, Value};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::app::App;
use crate::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use crate::managers::collection_manager::{CollectionManager, CollectionManagerTrait};
use crate::services::importer;
use crate::types::bookmark::BookmarkFilter;
use crate::types::errors::{AiError, BookmarkError, CollectionError, ImportError, MetadataError};
use crate::types::events::{ChangeEvent, ChangeKind, ChangeTable};

/// Uniform error shape crossing the RPC boundary.
#[derive(Debug, Clone, Serialize)]
pub struct RpcError {
    pub status: u16,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl RpcError {
    pub fn bad_request(msg: &str) -> Self {
        Self { status: 400, error: msg.to_string(), details: None }
    }

    pub fn unauthorized() -> Self {
        Self { status: 401, error: "Unauthorized".to_string(), details: None }
    }

    pub fn not_found(msg: &str) -> Self {
        Self { status: 404, error: msg.to_string(), details: None }
    }

    pub fn internal(msg: &str) -> Self {
        Self { status: 500, error: msg.to_string(), details: None }
    }

    pub fn with_details(mut self, details: &str) -> Self {
        self.details = Some(details.to_string());
        self
    }
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.error, self.status)
    }
}

impl From<MetadataError> for RpcError {
    fn from(e: MetadataError) -> Self {
        match e {
            MetadataError::InvalidUrl(_) => RpcError::bad_request("Invalid URL"),
            MetadataError::UpstreamStatus(status) => RpcError {
                status,
                error: format!("Failed to fetch URL: upstream returned {}", status),
                details: None,
            },
            MetadataError::Network(msg) => {
                RpcError::internal("Failed to fetch metadata").with_details(&msg)
            }
        }
    }
}

impl From<ImportError> for RpcError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::UnsupportedFormat(_) => RpcError::bad_request(&e.to_string()),
            ImportError::MalformedInput(msg) | ImportError::DatabaseError(msg) => {
                RpcError::internal("Failed to import bookmarks").with_details(&msg)
            }
        }
    }
}

impl From<AiError> for RpcError {
    fn from(e: AiError) -> Self {
        match e {
            AiError::MissingCredential => RpcError::internal("Gemini API key not configured"),
            AiError::Network(msg) | AiError::Provider(msg) | AiError::InvalidResponse(msg) => {
                RpcError::internal("Failed to generate metadata with AI").with_details(&msg)
            }
        }
    }
}

impl From<BookmarkError> for RpcError {
    fn from(e: BookmarkError) -> Self {
        match e {
            BookmarkError::NotFound(_) => RpcError::not_found(&e.to_string()),
            BookmarkError::InvalidUrl(_) => RpcError::bad_request(&e.to_string()),
            BookmarkError::DuplicateUrl(_) => RpcError {
                status: 409,
                error: e.to_string(),
                details: None,
            },
            BookmarkError::DatabaseError(msg) => RpcError::internal(&msg),
        }
    }
}

impl From<CollectionError> for RpcError {
    fn from(e: CollectionError) -> Self {
        match e {
            CollectionError::NotFound(_) => RpcError::not_found(&e.to_string()),
            CollectionError::DatabaseError(msg) => RpcError::internal(&msg),
        }
    }
}

fn require_str<'a>(params: &'a Value, key: &str, msg: &str) -> Result<&'a str, RpcError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::bad_request(msg))
}

/// Mutating, user-scoped methods require an authenticated caller; the
/// `user_id` parameter stands in for the session.
fn require_user(params: &Value) -> Result<&str, RpcError> {
    params
        .get("user_id")
        .and_then(|v| v.as_str())
        .filter(|u| !u.is_empty())
        .ok_or_else(RpcError::unauthorized)
}

fn tags_param(params: &Value) -> Vec<String> {
    params
        .get("tags")
        .and_then(|v| v.as_array())
        .map(|arr| {
            arr.iter()
                .filter_map(|t| t.as_str())
                .map(|t| t.to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn lock_err(e: impl fmt::Display) -> RpcError {
    RpcError::internal(&e.to_string())
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| RpcError::internal(&e.to_string()))
}

/// Dispatch an RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(RpcError)` carrying the
/// HTTP-style status for the failure.
pub async fn handle_method(
    app: &Mutex<App>,
    method: &str,
    params: &Value,
) -> Result<Value, RpcError> {
    match method {
        // ─── Stateless fetch/parse endpoints ───
        "metadata.fetch" => {
            let url = require_str(params, "url", "URL is required")?;
            let extractor = app.lock().map_err(lock_err)?.metadata_extractor.clone();
            let metadata = extractor.extract(url).await?;
            to_json(&metadata)
        }
        "ai.generate" => {
            let url = require_str(params, "url", "URL and title are required")?;
            let title = require_str(params, "title", "URL and title are required")?;
            let service = app.lock().map_err(lock_err)?.ai_metadata.clone();
            let metadata = service.generate(url, title).await?;
            to_json(&metadata)
        }

        // ─── Import ───
        "import.file" => {
            let user_id = require_user(params)?;
            let filename = require_str(params, "filename", "No file provided")?;
            let encoded = require_str(params, "content", "No file provided")?;
            let bytes = BASE64
                .decode(encoded)
                .map_err(|e| RpcError::bad_request(&format!("invalid base64 content: {}", e)))?;
            let content = String::from_utf8_lossy(&bytes).into_owned();

            let a = app.lock().map_err(lock_err)?;
            let outcome = importer::import_file(a.db.connection(), user_id, filename, &content)?;

            for id in &outcome.collection_ids {
                a.change_feed.publish(&ChangeEvent {
                    table: ChangeTable::Collections,
                    kind: ChangeKind::Insert,
                    row_id: id.clone(),
                    user_id: user_id.to_string(),
                });
            }
            for id in &outcome.bookmark_ids {
                a.change_feed.publish(&ChangeEvent {
                    table: ChangeTable::Bookmarks,
                    kind: ChangeKind::Insert,
                    row_id: id.clone(),
                    user_id: user_id.to_string(),
                });
            }

            Ok(json!({
                "success": true,
                "imported": outcome.summary.imported,
                "skipped": outcome.summary.skipped,
                "total": outcome.summary.total,
            }))
        }

        // ─── Bookmarks ───
        "bookmark.add" => {
            let user_id = require_user(params)?;
            let url = require_str(params, "url", "missing url")?;
            let title = params.get("title").and_then(|v| v.as_str()).unwrap_or("");
            let tags = tags_param(params);
            let description = params.get("description").and_then(|v| v.as_str());
            let thumbnail_url = params.get("thumbnail_url").and_then(|v| v.as_str());

            let a = app.lock().map_err(lock_err)?;
            let mut mgr = BookmarkManager::new(a.db.connection());
            let bookmark =
                mgr.add_bookmark(user_id, url, title, &tags, description, thumbnail_url)?;
            a.change_feed.publish(&ChangeEvent {
                table: ChangeTable::Bookmarks,
                kind: ChangeKind::Insert,
                row_id: bookmark.id.clone(),
                user_id: user_id.to_string(),
            });
            to_json(&bookmark)
        }
        "bookmark.list" => {
            let user_id = require_user(params)?;
            let filter = match (
                params.get("collection_id").and_then(|v| v.as_str()),
                params.get("filter").and_then(|v| v.as_str()),
            ) {
                (Some(id), _) => BookmarkFilter::Collection(id.to_string()),
                (None, Some("favorites")) => BookmarkFilter::Favorites,
                (None, Some("recent")) => BookmarkFilter::Recent,
                _ => BookmarkFilter::All,
            };
            let a = app.lock().map_err(lock_err)?;
            let mgr = BookmarkManager::new(a.db.connection());
            let bookmarks = mgr.list_bookmarks(user_id, &filter)?;
            Ok(json!({ "items": to_json(&bookmarks)? }))
        }
        "bookmark.search" => {
            let user_id = require_user(params)?;
            let query = require_str(params, "query", "missing query")?;
            let a = app.lock().map_err(lock_err)?;
            let mgr = BookmarkManager::new(a.db.connection());
            let bookmarks = mgr.search_bookmarks(user_id, query)?;
            Ok(json!({ "items": to_json(&bookmarks)? }))
        }
        "bookmark.delete" => {
            let user_id = require_user(params)?;
            let id = require_str(params, "id", "missing id")?;
            let a = app.lock().map_err(lock_err)?;
            let mut mgr = BookmarkManager::new(a.db.connection());
            mgr.remove_bookmark(user_id, id)?;
            a.change_feed.publish(&ChangeEvent {
                table: ChangeTable::Bookmarks,
                kind: ChangeKind::Delete,
                row_id: id.to_string(),
                user_id: user_id.to_string(),
            });
            Ok(json!({ "ok": true }))
        }
        "bookmark.favorite" => {
            let user_id = require_user(params)?;
            let id = require_str(params, "id", "missing id")?;
            let a = app.lock().map_err(lock_err)?;
            let mut mgr = BookmarkManager::new(a.db.connection());
            let is_favorite = mgr.toggle_favorite(user_id, id)?;
            a.change_feed.publish(&ChangeEvent {
                table: ChangeTable::Bookmarks,
                kind: ChangeKind::Update,
                row_id: id.to_string(),
                user_id: user_id.to_string(),
            });
            Ok(json!({ "id": id, "is_favorite": is_favorite }))
        }
        "bookmark.set_tags" => {
            let user_id = require_user(params)?;
            let id = require_str(params, "id", "missing id")?;
            let tags = tags_param(params);
            let a = app.lock().map_err(lock_err)?;
            let mut mgr = BookmarkManager::new(a.db.connection());
            mgr.set_tags(user_id, id, &tags)?;
            a.change_feed.publish(&ChangeEvent {
                table: ChangeTable::Bookmarks,
                kind: ChangeKind::Update,
                row_id: id.to_string(),
                user_id: user_id.to_string(),
            });
            Ok(json!({ "ok": true }))
        }

        // ─── Collections ───
        "collection.add" => {
            let user_id = require_user(params)?;
            let name = require_str(params, "name", "missing name")?;
            let a = app.lock().map_err(lock_err)?;
            let mut mgr = CollectionManager::new(a.db.connection());
            let collection = mgr.create_collection(user_id, name)?;
            a.change_feed.publish(&ChangeEvent {
                table: ChangeTable::Collections,
                kind: ChangeKind::Insert,
                row_id: collection.id.clone(),
                user_id: user_id.to_string(),
            });
            to_json(&collection)
        }
        "collection.list" => {
            let user_id = require_user(params)?;
            let a = app.lock().map_err(lock_err)?;
            let mgr = CollectionManager::new(a.db.connection());
            let collections = mgr.list_collections(user_id)?;
            Ok(json!({ "items": to_json(&collections)? }))
        }
        "collection.delete" => {
            let user_id = require_user(params)?;
            let id = require_str(params, "id", "missing id")?;
            let a = app.lock().map_err(lock_err)?;
            let mut mgr = CollectionManager::new(a.db.connection());
            mgr.delete_collection(user_id, id)?;
            a.change_feed.publish(&ChangeEvent {
                table: ChangeTable::Collections,
                kind: ChangeKind::Delete,
                row_id: id.to_string(),
                user_id: user_id.to_string(),
            });
            Ok(json!({ "ok": true }))
        }

        // ─── Analytics ───
        "tag.counts" => {
            let user_id = require_user(params)?;
            let a = app.lock().map_err(lock_err)?;
            let mgr = BookmarkManager::new(a.db.connection());
            let counts = mgr.tag_counts(user_id)?;
            Ok(json!({ "items": to_json(&counts)? }))
        }

        // ─── Ping ───
        "ping" => Ok(json!({ "pong": true })),

        _ => Err(RpcError::bad_request(&format!("unknown method: {}", method))),
    }
}
