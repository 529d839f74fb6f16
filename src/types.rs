//! Core types shared across the tree-table engine.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// NodeId: process-unique identifier of a row in a table
pub type NodeId = String;

/// Opaque per-node value carried alongside the row content
pub type UserData = serde_json::Value;

/// Insertion slot among the children of a parent (or among the roots)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Position {
    /// Before every existing sibling
    First,
    /// After every existing sibling
    Last,
    /// Immediately after the given sibling
    After(NodeId),
}

impl Position {
    /// Build a position from an optional "after" node, `None` meaning last.
    pub fn after_or_last(after: Option<&str>) -> Self {
        match after {
            Some(id) => Position::After(id.to_string()),
            None => Position::Last,
        }
    }

    /// Build a position from an optional "after" node, `None` meaning first.
    pub fn after_or_first(after: Option<&str>) -> Self {
        match after {
            Some(id) => Position::After(id.to_string()),
            None => Position::First,
        }
    }

    /// The reference sibling, if any
    pub fn after_id(&self) -> Option<&str> {
        match self {
            Position::After(id) => Some(id.as_str()),
            Position::First | Position::Last => None,
        }
    }
}

static NEXT_UID: AtomicU64 = AtomicU64::new(0);

/// Generate a candidate id. Callers must still check the id against the table
/// since user-supplied ids may follow the same pattern.
pub(crate) fn next_uid(prefix: &str, table_id: &str) -> NodeId {
    let counter = NEXT_UID.fetch_add(1, Ordering::Relaxed);
    format!("{}_{}_{}", prefix, table_id, counter)
}
