//! Linkstash — a personal bookmark manager with browser import, metadata
//! scraping, and AI tagging.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod managers;
pub mod rpc_handler;
pub mod services;
pub mod types;
