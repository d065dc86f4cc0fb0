//! Shared type definitions for Linkstash.

pub mod bookmark;
pub mod errors;
pub mod events;
pub mod import;
pub mod metadata;
