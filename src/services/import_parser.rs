//! Browser bookmark export parser.
//!
//! Turns the raw bytes of a browser export file — Netscape-style HTML or a
//! Firefox JSON places dump — into a [`FolderNode`] tree. Both variants
//! produce the same shape so the downstream normalizer is format-agnostic.

use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::types::errors::ImportError;
use crate::types::import::{FolderNode, ImportFormat, RawBookmark};

/// Maximum folder nesting accepted before the file is rejected as malformed.
/// Keeps adversarial deeply-nested exports from growing the call stack.
pub const MAX_DEPTH: usize = 128;

/// Firefox places node types. Any other type is ignored entirely — its
/// subtree is not traversed.
const MOZ_PLACE: &str = "text/x-moz-place";
const MOZ_CONTAINER: &str = "text/x-moz-place-container";

/// Parses an export file in the declared format into a folder tree rooted at
/// an implicit node named "root".
pub fn parse(content: &str, format: ImportFormat) -> Result<FolderNode, ImportError> {
    match format {
        ImportFormat::Html => parse_html(content),
        ImportFormat::Json => parse_json(content),
    }
}

/// Netscape bookmark file: nested `<dl>` lists of `<dt>` entries. A `<dt>`
/// holding an `<a>` is a bookmark leaf; a `<dt>` holding a `<dl>` is a
/// folder named by its `<h3>` heading.
fn parse_html(html: &str) -> Result<FolderNode, ImportError> {
    let doc = Html::parse_document(html);
    let dl_sel = Selector::parse("dl")
        .map_err(|e| ImportError::MalformedInput(e.to_string()))?;

    let mut root = FolderNode::root();
    if let Some(first_dl) = doc.select(&dl_sel).next() {
        parse_list(first_dl, &mut root, 0)?;
    }
    Ok(root)
}

/// Walks the direct children of one `<dl>` into `parent`. Only direct
/// children are considered at each level; recursion handles deeper lists.
fn parse_list(dl: ElementRef, parent: &mut FolderNode, depth: usize) -> Result<(), ImportError> {
    if depth > MAX_DEPTH {
        return Err(ImportError::MalformedInput(
            "folder nesting exceeds supported depth".to_string(),
        ));
    }

    for child in dl.children().filter_map(ElementRef::wrap) {
        if child.value().name() != "dt" {
            continue;
        }

        if let Some(anchor) = direct_child(child, "a") {
            parent.bookmarks.push(RawBookmark {
                title: anchor.text().collect::<String>().trim().to_string(),
                url: anchor.value().attr("href").unwrap_or_default().to_string(),
                add_date: anchor.value().attr("add_date").map(|v| v.to_string()),
                icon: anchor.value().attr("icon").map(|v| v.to_string()),
            });
        } else if let Some(nested) = direct_child(child, "dl") {
            let name = direct_child(child, "h3")
                .map(|h| h.text().collect::<String>().trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Unnamed".to_string());

            let mut folder = FolderNode::named(&name);
            parse_list(nested, &mut folder, depth + 1)?;
            parent.subfolders.push(folder);
        }
    }
    Ok(())
}

/// First direct child element with the given tag name.
fn direct_child<'a>(el: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .find(|c| c.value().name() == name)
}

/// Firefox JSON places export: a hierarchy of typed nodes.
fn parse_json(json: &str) -> Result<FolderNode, ImportError> {
    let data: Value =
        serde_json::from_str(json).map_err(|e| ImportError::MalformedInput(e.to_string()))?;

    let mut root = FolderNode::root();
    if let Some(children) = data.get("children").and_then(|v| v.as_array()) {
        for child in children {
            parse_places_node(child, &mut root, 0)?;
        }
    }
    Ok(root)
}

fn parse_places_node(node: &Value, parent: &mut FolderNode, depth: usize) -> Result<(), ImportError> {
    if depth > MAX_DEPTH {
        return Err(ImportError::MalformedInput(
            "folder nesting exceeds supported depth".to_string(),
        ));
    }

    match node.get("type").and_then(|v| v.as_str()) {
        Some(MOZ_PLACE) => {
            parent.bookmarks.push(RawBookmark {
                title: node
                    .get("title")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                url: node
                    .get("uri")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                add_date: None,
                icon: None,
            });
        }
        Some(MOZ_CONTAINER) => {
            let name = node
                .get("title")
                .and_then(|v| v.as_str())
                .filter(|t| !t.is_empty())
                .unwrap_or("Unnamed");

            let mut folder = FolderNode::named(name);
            if let Some(children) = node.get("children").and_then(|v| v.as_array()) {
                for child in children {
                    parse_places_node(child, &mut folder, depth + 1)?;
                }
            }
            parent.subfolders.push(folder);
        }
        // Separators and unknown types: neither leaf nor folder
        _ => {}
    }
    Ok(())
}
