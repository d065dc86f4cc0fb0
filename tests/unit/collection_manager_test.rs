//! Unit tests for the CollectionManager public API.
//!
//! Covers palette color assignment, per-user listing order, and the
//! uncategorize-then-delete behavior.

use linkstash::database::connection::Database;
use linkstash::managers::bookmark_manager::{BookmarkManager, BookmarkManagerTrait};
use linkstash::managers::collection_manager::{CollectionManager, CollectionManagerTrait};
use linkstash::types::errors::CollectionError;
use linkstash::types::import::COLLECTION_PALETTE;

fn setup() -> Database {
    Database::open_in_memory().expect("Failed to open in-memory database")
}

#[test]
fn test_create_collection_cycles_palette() {
    let db = setup();
    let mut mgr = CollectionManager::new(db.connection());

    // The 7th collection wraps around to palette[0]
    for i in 0..7 {
        let col = mgr.create_collection("u1", &format!("Folder {}", i)).unwrap();
        assert_eq!(col.color, COLLECTION_PALETTE[i % COLLECTION_PALETTE.len()]);
    }
}

#[test]
fn test_palette_index_is_per_user() {
    let db = setup();
    let mut mgr = CollectionManager::new(db.connection());

    mgr.create_collection("u1", "One").unwrap();
    mgr.create_collection("u1", "Two").unwrap();

    // Another user's first collection starts at palette[0] again
    let other = mgr.create_collection("u2", "First").unwrap();
    assert_eq!(other.color, COLLECTION_PALETTE[0]);
}

#[test]
fn test_create_with_color_uses_explicit_color() {
    let db = setup();
    let mut mgr = CollectionManager::new(db.connection());

    let col = mgr.create_with_color("u1", "Work", "hsl(340, 70%, 50%)").unwrap();
    assert_eq!(col.color, "hsl(340, 70%, 50%)");
}

#[test]
fn test_list_collections_in_creation_order() {
    let db = setup();
    let mut mgr = CollectionManager::new(db.connection());

    mgr.create_collection("u1", "Alpha").unwrap();
    mgr.create_collection("u1", "Beta").unwrap();
    mgr.create_collection("u2", "Other").unwrap();

    let listed = mgr.list_collections("u1").unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].name, "Alpha");
    assert_eq!(listed[1].name, "Beta");
}

#[test]
fn test_delete_collection_uncategorizes_bookmarks() {
    let db = setup();
    let mut collections = CollectionManager::new(db.connection());
    let col = collections.create_collection("u1", "Work").unwrap();

    // Place a bookmark in the collection directly
    let mut bookmarks = BookmarkManager::new(db.connection());
    let bm = bookmarks
        .add_bookmark("u1", "https://a.com", "A", &[], None, None)
        .unwrap();
    db.connection()
        .execute(
            "UPDATE bookmarks SET collection_id = ?1 WHERE id = ?2",
            rusqlite::params![col.id, bm.id],
        )
        .unwrap();

    collections.delete_collection("u1", &col.id).unwrap();

    let listed = bookmarks
        .list_bookmarks("u1", &linkstash::types::bookmark::BookmarkFilter::All)
        .unwrap();
    assert_eq!(listed.len(), 1, "bookmark must survive its collection");
    assert!(listed[0].collection_id.is_none());
}

#[test]
fn test_delete_missing_collection_is_not_found() {
    let db = setup();
    let mut mgr = CollectionManager::new(db.connection());

    match mgr.delete_collection("u1", "no-such-id") {
        Err(CollectionError::NotFound(_)) => {}
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_delete_is_scoped_to_user() {
    let db = setup();
    let mut mgr = CollectionManager::new(db.connection());

    let col = mgr.create_collection("u1", "Private").unwrap();
    assert!(mgr.delete_collection("u2", &col.id).is_err());

    // Still present for the owner
    assert_eq!(mgr.list_collections("u1").unwrap().len(), 1);
}
