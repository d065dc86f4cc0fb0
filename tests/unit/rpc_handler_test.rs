//! Unit tests for the RPC handler — all JSON-RPC methods dispatched by
//! `handle_method`.
//!
//! These tests exercise every method through the same code path used by the
//! real `linkstash-rpc` binary, using a temporary on-disk SQLite database.

use std::sync::Mutex;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::json;
use tempfile::TempDir;

use linkstash::app::App;
use linkstash::rpc_handler::handle_method;
use linkstash::types::events::ChangeKind;

/// Create a fresh App backed by a temp directory DB.
fn setup() -> (Mutex<App>, TempDir) {
    let tmp = TempDir::new().expect("Failed to create temp dir");
    let db_path = tmp.path().join("test.db");
    let app = App::new(db_path.to_str().unwrap()).expect("Failed to init App");
    (Mutex::new(app), tmp)
}

// ─── Ping / dispatch ───

#[tokio::test]
async fn test_ping() {
    let (app, _tmp) = setup();
    let res = handle_method(&app, "ping", &json!({})).await.unwrap();
    assert_eq!(res, json!({"pong": true}));
}

#[tokio::test]
async fn test_unknown_method_returns_400() {
    let (app, _tmp) = setup();
    let err = handle_method(&app, "nonexistent.method", &json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.status, 400);
    assert!(err.error.contains("unknown method"));
}

// ─── Auth gate ───

#[tokio::test]
async fn test_user_scoped_methods_require_user_id() {
    let (app, _tmp) = setup();

    for (method, params) in [
        ("bookmark.add", json!({"url": "https://a.com"})),
        ("bookmark.list", json!({})),
        ("collection.add", json!({"name": "Work"})),
        ("tag.counts", json!({})),
        ("import.file", json!({"filename": "x.html", "content": ""})),
        ("bookmark.list", json!({"user_id": ""})),
    ] {
        let err = handle_method(&app, method, &params).await.unwrap_err();
        assert_eq!(err.status, 401, "{} must be gated", method);
        assert_eq!(err.error, "Unauthorized");
    }
}

// ─── Bookmarks ───

#[tokio::test]
async fn test_bookmark_add_and_list() {
    let (app, _tmp) = setup();

    let res = handle_method(
        &app,
        "bookmark.add",
        &json!({"user_id": "u1", "url": "https://example.com", "title": "Example"}),
    )
    .await
    .unwrap();
    assert!(res.get("id").is_some());
    assert_eq!(res["url"], "https://example.com");
    assert_eq!(res["domain"], "example.com");

    let list = handle_method(&app, "bookmark.list", &json!({"user_id": "u1"}))
        .await
        .unwrap();
    let items = list["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Example");
}

#[tokio::test]
async fn test_bookmark_add_invalid_url_is_400() {
    let (app, _tmp) = setup();
    let err = handle_method(
        &app,
        "bookmark.add",
        &json!({"user_id": "u1", "url": "ftp://bad.com", "title": "Bad"}),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, 400);
}

#[tokio::test]
async fn test_bookmark_add_duplicate_is_409() {
    let (app, _tmp) = setup();
    let params = json!({"user_id": "u1", "url": "https://a.com", "title": "A"});
    handle_method(&app, "bookmark.add", &params).await.unwrap();

    let err = handle_method(&app, "bookmark.add", &params).await.unwrap_err();
    assert_eq!(err.status, 409);
}

#[tokio::test]
async fn test_bookmark_search() {
    let (app, _tmp) = setup();
    handle_method(
        &app,
        "bookmark.add",
        &json!({"user_id": "u1", "url": "https://rust-lang.org", "title": "Rust Lang"}),
    )
    .await
    .unwrap();
    handle_method(
        &app,
        "bookmark.add",
        &json!({"user_id": "u1", "url": "https://python.org", "title": "Python"}),
    )
    .await
    .unwrap();

    let res = handle_method(
        &app,
        "bookmark.search",
        &json!({"user_id": "u1", "query": "Rust"}),
    )
    .await
    .unwrap();
    let items = res["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["title"], "Rust Lang");
}

#[tokio::test]
async fn test_bookmark_delete() {
    let (app, _tmp) = setup();
    let added = handle_method(
        &app,
        "bookmark.add",
        &json!({"user_id": "u1", "url": "https://a.com", "title": "A"}),
    )
    .await
    .unwrap();
    let id = added["id"].as_str().unwrap().to_string();

    let res = handle_method(&app, "bookmark.delete", &json!({"user_id": "u1", "id": id}))
        .await
        .unwrap();
    assert_eq!(res, json!({"ok": true}));

    let list = handle_method(&app, "bookmark.list", &json!({"user_id": "u1"}))
        .await
        .unwrap();
    assert!(list["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bookmark_delete_missing_is_404() {
    let (app, _tmp) = setup();
    let err = handle_method(
        &app,
        "bookmark.delete",
        &json!({"user_id": "u1", "id": "no-such"}),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, 404);
}

#[tokio::test]
async fn test_bookmark_favorite_and_filtered_list() {
    let (app, _tmp) = setup();
    let added = handle_method(
        &app,
        "bookmark.add",
        &json!({"user_id": "u1", "url": "https://a.com", "title": "A"}),
    )
    .await
    .unwrap();
    let id = added["id"].as_str().unwrap().to_string();

    let res = handle_method(
        &app,
        "bookmark.favorite",
        &json!({"user_id": "u1", "id": id}),
    )
    .await
    .unwrap();
    assert_eq!(res["is_favorite"], true);

    let list = handle_method(
        &app,
        "bookmark.list",
        &json!({"user_id": "u1", "filter": "favorites"}),
    )
    .await
    .unwrap();
    assert_eq!(list["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_bookmark_set_tags_and_counts() {
    let (app, _tmp) = setup();
    let added = handle_method(
        &app,
        "bookmark.add",
        &json!({"user_id": "u1", "url": "https://a.com", "title": "A"}),
    )
    .await
    .unwrap();
    let id = added["id"].as_str().unwrap().to_string();

    handle_method(
        &app,
        "bookmark.set_tags",
        &json!({"user_id": "u1", "id": id, "tags": ["Rust", "rust", " web "]}),
    )
    .await
    .unwrap();

    let counts = handle_method(&app, "tag.counts", &json!({"user_id": "u1"}))
        .await
        .unwrap();
    let items = counts["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["count"], 1);
}

// ─── Collections ───

#[tokio::test]
async fn test_collection_add_list_delete() {
    let (app, _tmp) = setup();

    let added = handle_method(
        &app,
        "collection.add",
        &json!({"user_id": "u1", "name": "Work"}),
    )
    .await
    .unwrap();
    assert_eq!(added["name"], "Work");
    assert!(added["color"].as_str().unwrap().starts_with("hsl("));
    let id = added["id"].as_str().unwrap().to_string();

    let list = handle_method(&app, "collection.list", &json!({"user_id": "u1"}))
        .await
        .unwrap();
    assert_eq!(list["items"].as_array().unwrap().len(), 1);

    handle_method(&app, "collection.delete", &json!({"user_id": "u1", "id": id}))
        .await
        .unwrap();
    let list = handle_method(&app, "collection.list", &json!({"user_id": "u1"}))
        .await
        .unwrap();
    assert!(list["items"].as_array().unwrap().is_empty());
}

// ─── Import ───

#[tokio::test]
async fn test_import_file_html() {
    let (app, _tmp) = setup();
    let html = r#"
        <dl>
            <dt><a href="https://a.com">A</a></dt>
            <dt><h3>Work</h3>
                <dl><dt><a href="https://b.com">B</a></dt></dl>
            </dt>
        </dl>
    "#;
    let res = handle_method(
        &app,
        "import.file",
        &json!({
            "user_id": "u1",
            "filename": "bookmarks.html",
            "content": BASE64.encode(html),
        }),
    )
    .await
    .unwrap();

    assert_eq!(res["success"], true);
    assert_eq!(res["imported"], 2);
    assert_eq!(res["skipped"], 0);
    assert_eq!(res["total"], 2);

    let collections = handle_method(&app, "collection.list", &json!({"user_id": "u1"}))
        .await
        .unwrap();
    assert_eq!(collections["items"][0]["name"], "Work");
}

#[tokio::test]
async fn test_import_file_missing_content_is_400() {
    let (app, _tmp) = setup();
    let err = handle_method(
        &app,
        "import.file",
        &json!({"user_id": "u1", "filename": "bookmarks.html"}),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, 400);
    assert_eq!(err.error, "No file provided");
}

#[tokio::test]
async fn test_import_file_bad_base64_is_400() {
    let (app, _tmp) = setup();
    let err = handle_method(
        &app,
        "import.file",
        &json!({"user_id": "u1", "filename": "bookmarks.html", "content": "%%%"}),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, 400);
}

#[tokio::test]
async fn test_import_file_unsupported_extension_is_400() {
    let (app, _tmp) = setup();
    let err = handle_method(
        &app,
        "import.file",
        &json!({"user_id": "u1", "filename": "bookmarks.csv", "content": BASE64.encode("x")}),
    )
    .await
    .unwrap_err();
    assert_eq!(err.status, 400);
    assert!(err.error.contains("Unsupported file format"));
}

// ─── Change events ───

#[tokio::test]
async fn test_mutations_publish_change_events() {
    let (app, _tmp) = setup();
    let rx = app.lock().unwrap().change_feed.subscribe("u1");

    let added = handle_method(
        &app,
        "bookmark.add",
        &json!({"user_id": "u1", "url": "https://a.com", "title": "A"}),
    )
    .await
    .unwrap();
    let id = added["id"].as_str().unwrap().to_string();
    handle_method(&app, "bookmark.delete", &json!({"user_id": "u1", "id": id}))
        .await
        .unwrap();

    let kinds: Vec<ChangeKind> = rx.try_iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![ChangeKind::Insert, ChangeKind::Delete]);
}

#[tokio::test]
async fn test_import_publishes_events_per_row() {
    let (app, _tmp) = setup();
    let rx = app.lock().unwrap().change_feed.subscribe("u1");

    let html = r#"
        <dl>
            <dt><h3>Work</h3>
                <dl><dt><a href="https://b.com">B</a></dt></dl>
            </dt>
        </dl>
    "#;
    handle_method(
        &app,
        "import.file",
        &json!({
            "user_id": "u1",
            "filename": "bookmarks.html",
            "content": BASE64.encode(html),
        }),
    )
    .await
    .unwrap();

    // One collection insert, one bookmark insert
    let events: Vec<_> = rx.try_iter().collect();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.kind == ChangeKind::Insert));
}
