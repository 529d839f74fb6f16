//! Tree-table engine
//!
//! A [`TreeTable`] owns an ordered forest of [`Node`]s. The forest is
//! displayed as a flat list of rows in pre-order: a parent row is followed by
//! the contiguous block of its descendants.
//!
//! Operations are split by concern:
//! - [`registry`]: id → node storage and child order
//! - [`mutation`]: add, lazy load, expand/collapse, delete, move
//! - [`transfer`]: copying subtrees between two tables
//! - [`traversal`]: read-only queries
//! - [`check`]: structural invariant verification

pub mod check;
pub mod mutation;
pub mod node;
pub mod registry;
pub mod transfer;
pub mod traversal;

pub use check::CheckReport;
pub use node::Node;
pub use registry::NodeRegistry;
pub use transfer::{transfer, transfer_at, transfer_nodes, TransferReport};
pub use traversal::RowView;

use crate::callbacks::TableHooks;
use crate::config::TableOptions;
use crate::error::TreeError;
use crate::events::{EventQueue, TreeEvent};
use crate::types::{next_uid, NodeId};

/// A single tree-table instance
pub struct TreeTable<C> {
    pub(crate) id: String,
    pub(crate) options: TableOptions,
    pub(crate) registry: NodeRegistry<C>,
    pub(crate) hooks: TableHooks<C>,
    pub(crate) events: EventQueue,
    pub(crate) selection: Vec<NodeId>,
}

impl<C> TreeTable<C> {
    pub fn new(id: impl Into<String>, options: TableOptions) -> Self {
        Self {
            id: id.into(),
            options,
            registry: NodeRegistry::new(),
            hooks: TableHooks::default(),
            events: EventQueue::new(),
            selection: Vec::new(),
        }
    }

    pub fn with_hooks(mut self, hooks: TableHooks<C>) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn options(&self) -> &TableOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut TableOptions {
        &mut self.options
    }

    pub fn hooks_mut(&mut self) -> &mut TableHooks<C> {
        &mut self.hooks
    }

    pub fn registry(&self) -> &NodeRegistry<C> {
        &self.registry
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Mutable access to a row's presentation payload
    pub fn content_mut(&mut self, id: &str) -> Result<&mut C, TreeError> {
        Ok(&mut self.registry.get_mut(id)?.content)
    }

    pub fn events(&self) -> &EventQueue {
        &self.events
    }

    /// Take every pending event, oldest first
    pub fn drain_events(&mut self) -> Vec<TreeEvent> {
        self.events.drain()
    }

    /// Generate an id that is not used in this table.
    pub(crate) fn generate_id(&self) -> NodeId {
        loop {
            let candidate = next_uid(&self.options.id_prefix, &self.id);
            if !self.registry.contains(&candidate) {
                return candidate;
            }
        }
    }
}

impl<C> std::fmt::Debug for TreeTable<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeTable")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("nodes", &self.registry.len())
            .field("selection", &self.selection)
            .finish()
    }
}
