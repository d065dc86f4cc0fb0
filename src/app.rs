//! App Core for Linkstash.
//!
//! Central struct holding the database and long-lived services.

use std::sync::Arc;

use crate::database::connection::Database;
use crate::services::ai_metadata::AiMetadataService;
use crate::services::change_feed::ChangeFeed;
use crate::services::metadata_extractor::MetadataExtractor;

/// Central application struct.
///
/// BookmarkManager and CollectionManager are created on-demand via
/// `db.connection()` because they borrow the connection with a lifetime
/// parameter.
pub struct App {
    pub db: Arc<Database>,
    pub metadata_extractor: MetadataExtractor,
    pub ai_metadata: AiMetadataService,
    pub change_feed: ChangeFeed,
}

impl App {
    /// Creates a new App, opening (or creating) the database at `db_path`.
    ///
    /// The AI credential is read from the `GEMINI_API_KEY` environment
    /// variable; when absent the AI endpoint fails closed.
    pub fn new(db_path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let db = Arc::new(Database::open(db_path)?);
        Ok(Self {
            db,
            metadata_extractor: MetadataExtractor::new(),
            ai_metadata: AiMetadataService::from_env(),
            change_feed: ChangeFeed::new(),
        })
    }
}
