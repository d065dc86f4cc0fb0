//! Unit tests for the browser export parser.
//!
//! Covers Netscape-style HTML exports (nested `<dl>`/`<dt>` lists) and
//! Firefox JSON places dumps, including the folder-nesting depth cap.

use linkstash::services::import_parser::{parse, MAX_DEPTH};
use linkstash::types::errors::ImportError;
use linkstash::types::import::ImportFormat;

#[test]
fn test_html_flat_and_nested_entries() {
    let html = r#"
        <dl>
            <dt><a href="https://a.com">A</a></dt>
            <dt><h3>Work</h3>
                <dl><dt><a href="https://b.com">B</a></dt></dl>
            </dt>
        </dl>
    "#;
    let tree = parse(html, ImportFormat::Html).unwrap();

    assert_eq!(tree.name, "root");
    assert_eq!(tree.bookmarks.len(), 1);
    assert_eq!(tree.bookmarks[0].url, "https://a.com");
    assert_eq!(tree.bookmarks[0].title, "A");

    assert_eq!(tree.subfolders.len(), 1);
    let work = &tree.subfolders[0];
    assert_eq!(work.name, "Work");
    assert_eq!(work.bookmarks.len(), 1);
    assert_eq!(work.bookmarks[0].url, "https://b.com");
}

#[test]
fn test_html_anchor_attributes_captured() {
    let html = r#"
        <dl>
            <dt><a href="https://a.com" add_date="1700000000" icon="data:image/png;base64,AAA">A</a></dt>
        </dl>
    "#;
    let tree = parse(html, ImportFormat::Html).unwrap();
    let bm = &tree.bookmarks[0];
    assert_eq!(bm.add_date.as_deref(), Some("1700000000"));
    assert_eq!(bm.icon.as_deref(), Some("data:image/png;base64,AAA"));
}

#[test]
fn test_html_deeply_nested_folders() {
    let html = r#"
        <dl>
            <dt><h3>Outer</h3>
                <dl>
                    <dt><h3>Inner</h3>
                        <dl><dt><a href="https://deep.com">Deep</a></dt></dl>
                    </dt>
                </dl>
            </dt>
        </dl>
    "#;
    let tree = parse(html, ImportFormat::Html).unwrap();
    let outer = &tree.subfolders[0];
    assert_eq!(outer.name, "Outer");
    let inner = &outer.subfolders[0];
    assert_eq!(inner.name, "Inner");
    assert_eq!(inner.bookmarks[0].url, "https://deep.com");
}

#[test]
fn test_html_folder_without_heading_is_unnamed() {
    let html = r#"
        <dl>
            <dt><dl><dt><a href="https://x.com">X</a></dt></dl></dt>
        </dl>
    "#;
    let tree = parse(html, ImportFormat::Html).unwrap();
    assert_eq!(tree.subfolders[0].name, "Unnamed");
}

#[test]
fn test_html_without_any_list_yields_empty_root() {
    let tree = parse("<html><body><p>nothing here</p></body></html>", ImportFormat::Html).unwrap();
    assert!(tree.bookmarks.is_empty());
    assert!(tree.subfolders.is_empty());
}

#[test]
fn test_html_anchor_title_whitespace_trimmed() {
    let html = r#"<dl><dt><a href="https://a.com">  Spaced  </a></dt></dl>"#;
    let tree = parse(html, ImportFormat::Html).unwrap();
    assert_eq!(tree.bookmarks[0].title, "Spaced");
}

#[test]
fn test_html_nesting_past_limit_is_malformed() {
    // One <dl> per level; the parser rejects anything past MAX_DEPTH
    let depth = MAX_DEPTH + 2;
    let mut html = String::new();
    for i in 0..depth {
        html.push_str(&format!("<dl><dt><h3>F{}</h3>", i));
    }
    html.push_str(r#"<dl><dt><a href="https://deep.com">Deep</a></dt></dl>"#);
    for _ in 0..depth {
        html.push_str("</dt></dl>");
    }

    match parse(&html, ImportFormat::Html) {
        Err(ImportError::MalformedInput(_)) => {}
        other => panic!("expected MalformedInput, got {:?}", other),
    }
}

#[test]
fn test_json_places_hierarchy() {
    let json = r#"{
        "title": "", "type": "text/x-moz-place-container",
        "children": [
            {"type": "text/x-moz-place", "title": "A", "uri": "https://a.com"},
            {"type": "text/x-moz-place-container", "title": "Work", "children": [
                {"type": "text/x-moz-place", "title": "B", "uri": "https://b.com"}
            ]}
        ]
    }"#;
    let tree = parse(json, ImportFormat::Json).unwrap();

    assert_eq!(tree.bookmarks.len(), 1);
    assert_eq!(tree.bookmarks[0].url, "https://a.com");
    assert_eq!(tree.subfolders.len(), 1);
    assert_eq!(tree.subfolders[0].name, "Work");
    assert_eq!(tree.subfolders[0].bookmarks[0].url, "https://b.com");
}

#[test]
fn test_json_separators_and_unknown_types_ignored() {
    let json = r#"{
        "children": [
            {"type": "text/x-moz-place-separator"},
            {"type": "text/x-moz-something-else", "children": [
                {"type": "text/x-moz-place", "title": "Hidden", "uri": "https://hidden.com"}
            ]},
            {"type": "text/x-moz-place", "title": "Kept", "uri": "https://kept.com"}
        ]
    }"#;
    let tree = parse(json, ImportFormat::Json).unwrap();

    // The unknown container's subtree is not traversed
    assert_eq!(tree.bookmarks.len(), 1);
    assert_eq!(tree.bookmarks[0].url, "https://kept.com");
    assert!(tree.subfolders.is_empty());
}

#[test]
fn test_json_container_without_title_is_unnamed() {
    let json = r#"{"children": [{"type": "text/x-moz-place-container", "children": []}]}"#;
    let tree = parse(json, ImportFormat::Json).unwrap();
    assert_eq!(tree.subfolders[0].name, "Unnamed");
}

#[test]
fn test_json_invalid_document_is_malformed() {
    match parse("{not json", ImportFormat::Json) {
        Err(ImportError::MalformedInput(_)) => {}
        other => panic!("expected MalformedInput, got {:?}", other),
    }
}

#[test]
fn test_json_nesting_past_limit_is_malformed() {
    let depth = MAX_DEPTH + 2;
    let mut json = String::from(r#"{"children": ["#);
    for _ in 0..depth {
        json.push_str(r#"{"type": "text/x-moz-place-container", "title": "F", "children": ["#);
    }
    json.push_str(r#"{"type": "text/x-moz-place", "title": "Deep", "uri": "https://deep.com"}"#);
    for _ in 0..depth {
        json.push_str("]}");
    }
    json.push_str("]}");

    match parse(&json, ImportFormat::Json) {
        Err(ImportError::MalformedInput(_)) => {}
        other => panic!("expected MalformedInput, got {:?}", other),
    }
}
