//! Managers for Linkstash.
//!
//! Managers own CRUD logic against the SQLite store. Every operation is
//! scoped by the owning user's id.

pub mod bookmark_manager;
pub mod collection_manager;
