//! Traversal & Query Engine
//!
//! Read-only questions about a table. Nothing here loads children: queries
//! only see what has been loaded so far.

use crate::error::TreeError;
use crate::tree::node::Node;
use crate::tree::TreeTable;
use crate::types::NodeId;
use serde::Serialize;

/// One row of the flattened table, as shown to a presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    pub id: NodeId,
    pub parent: Option<NodeId>,
    pub level: usize,
    pub visible: bool,
    pub expanded: bool,
    pub children_count: usize,
    pub loaded: bool,
}

impl RowView {
    fn from_node<C>(node: &Node<C>) -> Self {
        Self {
            id: node.id.clone(),
            parent: node.parent_id.clone(),
            level: node.nesting_level,
            visible: node.visible,
            expanded: node.expanded,
            children_count: node.children.len(),
            loaded: node.children_loaded,
        }
    }
}

impl<C> TreeTable<C> {
    pub fn get(&self, id: &str) -> Result<&Node<C>, TreeError> {
        self.registry.get(id)
    }

    pub fn node_exists(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    /// Look up several nodes at once. Unknown ids are skipped.
    pub fn get_nodes<S: AsRef<str>>(&self, ids: &[S]) -> Vec<&Node<C>> {
        ids.iter()
            .filter_map(|id| self.registry.get(id.as_ref()).ok())
            .collect()
    }

    pub fn parent_of(&self, id: &str) -> Result<Option<&Node<C>>, TreeError> {
        match self.registry.get(id)?.parent_id.as_deref() {
            Some(parent_id) => Ok(Some(self.registry.get(parent_id)?)),
            None => Ok(None),
        }
    }

    /// Loaded children of `id`, or the roots for `None`
    pub fn children_of(&self, id: Option<&str>) -> Result<&[NodeId], TreeError> {
        self.registry.children_of(id)
    }

    pub fn children_count(&self, id: &str) -> Result<usize, TreeError> {
        Ok(self.registry.get(id)?.children.len())
    }

    pub fn nesting_level(&self, id: &str) -> Result<usize, TreeError> {
        Ok(self.registry.get(id)?.nesting_level)
    }

    pub fn is_root(&self, id: &str) -> Result<bool, TreeError> {
        Ok(self.registry.get(id)?.parent_id.is_none())
    }

    pub fn root_nodes(&self) -> &[NodeId] {
        self.registry.roots()
    }

    /// The root at the top of the branch holding `id`
    pub fn root_of(&self, id: &str) -> Result<&Node<C>, TreeError> {
        let mut node = self.registry.get(id)?;
        while let Some(parent_id) = node.parent_id.as_deref() {
            node = self.registry.get(parent_id)?;
        }
        Ok(node)
    }

    /// True when `descendant` sits somewhere below `ancestor`. A node is not
    /// its own ancestor.
    pub fn is_ancestor_of(&self, ancestor: &str, descendant: &str) -> Result<bool, TreeError> {
        self.registry.get(ancestor)?;
        let mut current = self.registry.get(descendant)?.parent_id.as_deref();
        while let Some(parent_id) = current {
            if parent_id == ancestor {
                return Ok(true);
            }
            current = self.registry.get(parent_id)?.parent_id.as_deref();
        }
        Ok(false)
    }

    /// The node and its loaded descendants in display order
    pub fn loaded_subtree(&self, id: &str) -> Result<Vec<NodeId>, TreeError> {
        self.registry.subtree(id)
    }

    /// Visible rows in display order, restricted to the subtree of `scope`
    /// (the scope node included) and to nodes accepted by `filter`.
    pub fn visible_nodes<F>(&self, scope: Option<&str>, filter: F) -> Result<Vec<NodeId>, TreeError>
    where
        F: Fn(&Node<C>) -> bool,
    {
        self.scoped_nodes(scope, |node| node.visible && filter(node))
    }

    /// Hidden rows, with the same scoping rules as [`TreeTable::visible_nodes`]
    pub fn hidden_nodes<F>(&self, scope: Option<&str>, filter: F) -> Result<Vec<NodeId>, TreeError>
    where
        F: Fn(&Node<C>) -> bool,
    {
        self.scoped_nodes(scope, |node| !node.visible && filter(node))
    }

    fn scoped_nodes<F>(&self, scope: Option<&str>, keep: F) -> Result<Vec<NodeId>, TreeError>
    where
        F: Fn(&Node<C>) -> bool,
    {
        let ids = match scope {
            Some(id) => self.registry.subtree(id)?,
            None => self.registry.preorder(),
        };
        Ok(ids
            .into_iter()
            .filter(|id| self.registry.get(id).map(&keep).unwrap_or(false))
            .collect())
    }

    pub fn next_sibling(&self, id: &str) -> Result<Option<&Node<C>>, TreeError> {
        self.sibling_at(id, 1)
    }

    pub fn prev_sibling(&self, id: &str) -> Result<Option<&Node<C>>, TreeError> {
        self.sibling_at(id, -1)
    }

    fn sibling_at(&self, id: &str, offset: isize) -> Result<Option<&Node<C>>, TreeError> {
        let parent = self.registry.get(id)?.parent_id.as_deref();
        let siblings = self.registry.children_of(parent)?;
        let index = siblings
            .iter()
            .position(|sibling| sibling == id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        let target = index as isize + offset;
        if target < 0 {
            return Ok(None);
        }
        match siblings.get(target as usize) {
            Some(sibling) => Ok(Some(self.registry.get(sibling)?)),
            None => Ok(None),
        }
    }

    /// Every loaded node in display order
    pub fn flattened(&self) -> Vec<NodeId> {
        self.registry.preorder()
    }

    /// Visible rows in display order
    pub fn visible_rows(&self) -> Vec<NodeId> {
        self.registry
            .preorder()
            .into_iter()
            .filter(|id| self.registry.get(id).map(|n| n.visible).unwrap_or(false))
            .collect()
    }

    /// The first visible row displayed below `id`
    pub fn next_visible(&self, id: &str) -> Result<Option<NodeId>, TreeError> {
        self.registry.get(id)?;
        let order = self.registry.preorder();
        let start = order.iter().position(|row| row == id).unwrap_or(order.len());
        Ok(order
            .into_iter()
            .skip(start + 1)
            .find(|row| self.registry.get(row).map(|n| n.visible).unwrap_or(false)))
    }

    /// The last visible row displayed above `id`
    pub fn prev_visible(&self, id: &str) -> Result<Option<NodeId>, TreeError> {
        self.registry.get(id)?;
        let order = self.registry.preorder();
        let start = order.iter().position(|row| row == id).unwrap_or(0);
        Ok(order[..start]
            .iter()
            .rev()
            .find(|row| self.registry.get(row).map(|n| n.visible).unwrap_or(false))
            .cloned())
    }

    pub fn is_expanded(&self, id: &str) -> Result<bool, TreeError> {
        Ok(self.registry.get(id)?.expanded)
    }

    pub fn is_visible(&self, id: &str) -> Result<bool, TreeError> {
        Ok(self.registry.get(id)?.visible)
    }

    /// Snapshot of every loaded row in display order
    pub fn rows(&self) -> Vec<RowView> {
        self.registry
            .preorder()
            .iter()
            .filter_map(|id| self.registry.get(id).ok())
            .map(RowView::from_node)
            .collect()
    }
}
