//! Services for Linkstash.

pub mod ai_metadata;
pub mod change_feed;
pub mod import_normalizer;
pub mod import_parser;
pub mod importer;
pub mod metadata_extractor;
