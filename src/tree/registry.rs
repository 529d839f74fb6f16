//! Node Registry
//!
//! Id → node map plus the ordered root list. Child order lives in each
//! parent's `children` vector, so the registry is the whole ordered forest
//! and there is no second structure that could fall out of sync.

use crate::error::TreeError;
use crate::tree::node::Node;
use crate::types::NodeId;
use std::collections::HashMap;

/// Authoritative storage of a table's nodes
#[derive(Debug, Clone)]
pub struct NodeRegistry<C> {
    nodes: HashMap<NodeId, Node<C>>,
    roots: Vec<NodeId>,
}

impl<C> Default for NodeRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> NodeRegistry<C> {
    pub fn new() -> Self {
        NodeRegistry {
            nodes: HashMap::new(),
            roots: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Insert a node as the last child of its parent, or as the last root.
    ///
    /// The node's nesting level is derived from the parent.
    pub fn insert(&mut self, mut node: Node<C>) -> Result<(), TreeError> {
        if self.nodes.contains_key(&node.id) {
            return Err(TreeError::DuplicateId(node.id));
        }

        match node.parent_id.clone() {
            None => {
                node.nesting_level = 0;
                self.roots.push(node.id.clone());
            }
            Some(parent_id) => {
                let parent = self
                    .nodes
                    .get_mut(&parent_id)
                    .ok_or_else(|| TreeError::ParentNotFound(parent_id.clone()))?;
                if !parent.allows_children {
                    return Err(TreeError::ChildrenNotAllowed(parent_id));
                }
                node.nesting_level = parent.nesting_level + 1;
                parent.children.push(node.id.clone());
            }
        }

        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&Node<C>, TreeError> {
        self.nodes
            .get(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Result<&mut Node<C>, TreeError> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))
    }

    /// Remove a single node. Descendants are left untouched, so callers
    /// remove them first. Returns `None` when the id is unknown.
    pub fn remove(&mut self, id: &str) -> Option<Node<C>> {
        let node = self.nodes.remove(id)?;
        self.unlink(&node.id, node.parent_id.as_deref());
        Some(node)
    }

    /// Ordered direct children of `parent`, or the roots for `None`
    pub fn children_of(&self, parent: Option<&str>) -> Result<&[NodeId], TreeError> {
        match parent {
            None => Ok(&self.roots),
            Some(id) => Ok(&self.get(id)?.children),
        }
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Every node id in flattened (pre-order) display order
    pub fn preorder(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        for root in &self.roots {
            self.collect_subtree(root, &mut out);
        }
        out
    }

    /// The node and all its descendants in pre-order
    pub fn subtree(&self, id: &str) -> Result<Vec<NodeId>, TreeError> {
        self.get(id)?;
        let mut out = Vec::new();
        self.collect_subtree(id, &mut out);
        Ok(out)
    }

    /// The node and all its descendants, every node after its descendants
    /// and siblings in display order
    pub fn postorder(&self, id: &str) -> Result<Vec<NodeId>, TreeError> {
        self.get(id)?;
        let mut out = Vec::new();
        let mut stack: Vec<(NodeId, bool)> = vec![(id.to_string(), false)];
        while let Some((current, children_done)) = stack.pop() {
            if children_done {
                out.push(current);
                continue;
            }
            let children = self
                .nodes
                .get(&current)
                .map(|node| node.children.clone())
                .unwrap_or_default();
            stack.push((current, true));
            stack.extend(children.into_iter().rev().map(|child| (child, false)));
        }
        Ok(out)
    }

    fn collect_subtree(&self, id: &str, out: &mut Vec<NodeId>) {
        // Iterative so that very deep trees cannot exhaust the stack.
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().rev().cloned());
            }
            out.push(current);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node<C>> {
        self.nodes.values()
    }

    /// Detach a node from its parent's child list (or from the roots).
    /// Returns the slot it occupied. The node stays in the map.
    pub(crate) fn detach(&mut self, id: &str) -> Result<usize, TreeError> {
        let parent_id = self.get(id)?.parent_id.clone();
        let siblings = match parent_id.as_deref() {
            None => &mut self.roots,
            Some(pid) => &mut self.get_mut(pid)?.children,
        };
        let index = siblings
            .iter()
            .position(|sibling| sibling == id)
            .ok_or_else(|| TreeError::NotFound(id.to_string()))?;
        siblings.remove(index);
        Ok(index)
    }

    /// Attach a detached node under `parent` at `index` (clamped).
    pub(crate) fn attach_at(
        &mut self,
        id: &str,
        parent: Option<&str>,
        index: usize,
    ) -> Result<(), TreeError> {
        let siblings = match parent {
            None => &mut self.roots,
            Some(pid) => &mut self.get_mut(pid)?.children,
        };
        let index = index.min(siblings.len());
        siblings.insert(index, id.to_string());
        self.get_mut(id)?.parent_id = parent.map(str::to_string);
        Ok(())
    }

    fn unlink(&mut self, id: &str, parent_id: Option<&str>) {
        let siblings = match parent_id {
            None => Some(&mut self.roots),
            Some(pid) => self.nodes.get_mut(pid).map(|parent| &mut parent.children),
        };
        if let Some(siblings) = siblings {
            siblings.retain(|sibling| sibling != id);
        }
    }
}
