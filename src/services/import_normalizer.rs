//! Import normalizer.
//!
//! Flattens a parsed [`FolderNode`] tree into a flat list of user-scoped
//! bookmark records plus an ordered collection registry. Invalid URLs are
//! silently filtered, not reported; ids are assigned only at persistence
//! time, so the output is fully deterministic for a given tree.

use url::Url;

use crate::types::import::{CollectionRegistry, FolderNode, NormalizedBookmark};

use super::metadata_extractor::fallback_favicon;

/// Flattens the tree depth-first from the root.
///
/// A bookmark is attributed to its *immediate* enclosing named folder —
/// attribution never propagates past the nearest named ancestor. Folders
/// named "" or "root" do not introduce a collection boundary; their contents
/// inherit the parent's context.
pub fn normalize(tree: &FolderNode, user_id: &str) -> (Vec<NormalizedBookmark>, CollectionRegistry) {
    let mut bookmarks = Vec::new();
    let mut registry = CollectionRegistry::new();
    walk(tree, user_id, None, &mut bookmarks, &mut registry);
    (bookmarks, registry)
}

/// The recursive walk. Depth is already bounded by the parser, which rejects
/// trees nested past its limit.
fn walk(
    node: &FolderNode,
    user_id: &str,
    current_collection: Option<&str>,
    out: &mut Vec<NormalizedBookmark>,
    registry: &mut CollectionRegistry,
) {
    for raw in &node.bookmarks {
        if !raw.url.starts_with("http://") && !raw.url.starts_with("https://") {
            continue;
        }
        // Unparsable URLs are a filter, not an error
        let Ok(parsed) = Url::parse(&raw.url) else {
            continue;
        };
        let Some(host) = parsed.host_str() else {
            continue;
        };

        let title = if raw.title.trim().is_empty() {
            host.to_string()
        } else {
            raw.title.clone()
        };
        let favicon = raw
            .icon
            .clone()
            .filter(|icon| !icon.is_empty())
            .unwrap_or_else(|| fallback_favicon(host));

        out.push(NormalizedBookmark {
            user_id: user_id.to_string(),
            url: raw.url.clone(),
            title,
            favicon,
            collection: current_collection.map(|c| c.to_string()),
            is_favorite: false,
            domain: host.to_string(),
        });
    }

    for sub in &node.subfolders {
        if !sub.name.is_empty() && sub.name != "root" {
            registry.register(&sub.name);
            walk(sub, user_id, Some(&sub.name), out, registry);
        } else {
            walk(sub, user_id, current_collection, out, registry);
        }
    }
}
