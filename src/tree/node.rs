//! Node record held by the registry

use crate::types::{NodeId, UserData};

/// A row of the tree-table.
///
/// The structural fields are only written by the mutation engine; callers
/// read them through the accessors. `content` is the presentation payload and
/// is never interpreted by the engine.
#[derive(Debug, Clone)]
pub struct Node<C> {
    pub(crate) id: NodeId,
    pub(crate) parent_id: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) nesting_level: usize,
    pub(crate) children_loaded: bool,
    pub(crate) allows_children: bool,
    pub(crate) allows_drag: bool,
    pub(crate) visible: bool,
    pub(crate) expanded: bool,
    pub(crate) user_data: Option<UserData>,
    pub(crate) content: C,
}

impl<C> Node<C> {
    pub(crate) fn new(id: NodeId, parent_id: Option<NodeId>, content: C) -> Self {
        Self {
            id,
            parent_id,
            children: Vec::new(),
            nesting_level: 0,
            children_loaded: false,
            allows_children: true,
            allows_drag: true,
            visible: false,
            expanded: false,
            user_data: None,
            content,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// Direct children in display order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn children_count(&self) -> usize {
        self.children.len()
    }

    /// Depth in the tree, 0 for roots
    pub fn nesting_level(&self) -> usize {
        self.nesting_level
    }

    pub fn children_loaded(&self) -> bool {
        self.children_loaded
    }

    pub fn allows_children(&self) -> bool {
        self.allows_children
    }

    pub fn allows_drag(&self) -> bool {
        self.allows_drag
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Remembered expand state; survives collapse of an ancestor.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn user_data(&self) -> Option<&UserData> {
        self.user_data.as_ref()
    }

    pub fn content(&self) -> &C {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut C {
        &mut self.content
    }
}
