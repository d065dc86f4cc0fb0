use serde::{Deserialize, Serialize};

/// Table a change event originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Bookmarks,
    Collections,
}

/// Kind of row-level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row-level change pushed to subscribed sessions.
///
/// Events carry only the row id and table; consumers re-read or drop the row
/// and must apply each event idempotently keyed by `row_id`. No ordering is
/// guaranteed beyond arrival order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub kind: ChangeKind,
    pub row_id: String,
    pub user_id: String,
}
