//! Table notifications
//!
//! Mutations queue events on the table they touched. The presentation layer
//! drains the queue after each interaction and re-renders what changed.

use crate::types::NodeId;
use serde::Serialize;
use std::collections::BTreeMap;

/// Notification emitted by a table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TreeEvent {
    NodeExpanded {
        node_id: NodeId,
    },
    NodeCollapsed {
        node_id: NodeId,
    },
    NodeDeleted {
        node_ids: Vec<NodeId>,
    },
    /// The number of visible rows may have changed
    SizeChanged,
    RowsDropped {
        source_table: String,
        dest_table: String,
        node_ids: Vec<NodeId>,
    },
    TransferComplete {
        source_table: String,
        dest_table: String,
        new_parent_id: Option<NodeId>,
        after_id: Option<NodeId>,
        id_map: BTreeMap<NodeId, NodeId>,
    },
}

/// Pending events of one table
#[derive(Debug, Default)]
pub struct EventQueue {
    pending: Vec<TreeEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, event: TreeEvent) {
        tracing::trace!(?event, "Queued table event");
        self.pending.push(event);
    }

    /// Take every pending event, oldest first
    pub fn drain(&mut self) -> Vec<TreeEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn peek(&self) -> &[TreeEvent] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
