//! Tree Mutation Engine
//!
//! Every structural change to a table goes through here. Validation runs
//! before the registry is touched, so a failed call leaves the table as it
//! was (lazy loads triggered on the way excepted).

use crate::error::TreeError;
use crate::events::TreeEvent;
use crate::tree::node::Node;
use crate::tree::TreeTable;
use crate::types::{NodeId, Position, UserData};
use std::collections::HashSet;
use tracing::{debug, info, warn};

impl<C> TreeTable<C> {
    /// Add a node as the last child of `parent`, or as the last root.
    ///
    /// Roots are visible right away; children start hidden until their
    /// parent is expanded. The children of the new node are loaded at once
    /// so its child count is known; if the loader output is rejected the
    /// node is removed again and the error returned. Returns the id of the
    /// new node, generated when `id` is `None`.
    pub fn add_node(
        &mut self,
        parent: Option<&str>,
        id: Option<&str>,
        content: C,
        allows_children: bool,
        allows_drag: bool,
    ) -> Result<NodeId, TreeError> {
        if let Some(parent_id) = parent {
            let parent_node = self
                .registry
                .get(parent_id)
                .map_err(|_| TreeError::ParentNotFound(parent_id.to_string()))?;
            if !parent_node.allows_children {
                return Err(TreeError::ChildrenNotAllowed(parent_id.to_string()));
            }
        }

        let id = match id {
            Some(id) if self.registry.contains(id) => {
                return Err(TreeError::DuplicateId(id.to_string()))
            }
            Some(id) => id.to_string(),
            None => self.generate_id(),
        };

        let mut node = Node::new(id.clone(), parent.map(str::to_string), content);
        node.allows_children = allows_children;
        node.allows_drag = allows_drag;
        node.visible = parent.is_none();
        self.registry.insert(node)?;
        if let Err(e) = self.load_children(&id) {
            self.registry.remove(&id);
            return Err(e);
        }

        debug!(table = %self.id, node_id = %id, parent_id = ?parent, "Added node");
        if parent.is_none() {
            self.events.push(TreeEvent::SizeChanged);
        }
        Ok(id)
    }

    /// Add a root that accepts children and can be dragged
    pub fn add_root_node(&mut self, id: Option<&str>, content: C) -> Result<NodeId, TreeError> {
        self.add_node(None, id, content, true, true)
    }

    /// Attach an opaque value to a node. It is handed back to the child
    /// loader and to transfer converters.
    pub fn set_user_data(&mut self, id: &str, user_data: Option<UserData>) -> Result<(), TreeError> {
        self.registry.get_mut(id)?.user_data = user_data;
        Ok(())
    }

    /// Load the children of a node through the child loader, once.
    ///
    /// The loader output is checked as a whole before anything is inserted.
    /// Returns the ordered children of the node.
    pub fn load_children(&mut self, id: &str) -> Result<Vec<NodeId>, TreeError> {
        let node = self.registry.get(id)?;
        if node.children_loaded {
            return Ok(node.children.clone());
        }
        let user_data = node.user_data.clone();
        if !node.allows_children {
            self.registry.get_mut(id)?.children_loaded = true;
            return Ok(Vec::new());
        }

        let staged = self.fetch_children(id, user_data.as_ref(), &mut HashSet::new())?;
        let loaded = staged.len();
        for child in staged {
            self.registry.insert(child)?;
        }

        let node = self.registry.get_mut(id)?;
        node.children_loaded = true;
        debug!(table = %self.id, node_id = %id, loaded, "Loaded children");
        Ok(node.children.clone())
    }

    /// Ask the child loader for the children of `parent_id` and turn them
    /// into nodes ready for insertion. Nothing is inserted. Ids already in
    /// the table or in `reserved` are rejected; accepted ids are added to
    /// `reserved`.
    pub(crate) fn fetch_children(
        &mut self,
        parent_id: &str,
        user_data: Option<&UserData>,
        reserved: &mut HashSet<NodeId>,
    ) -> Result<Vec<Node<C>>, TreeError> {
        let loaded = match self.hooks.loader.as_mut() {
            Some(loader) => loader.load_children(parent_id, user_data),
            None => Vec::new(),
        };

        let mut batch_ids = HashSet::with_capacity(loaded.len());
        for (index, child) in loaded.iter().enumerate() {
            if child.content.is_none() {
                warn!(table = %self.id, node_id = %parent_id, index, "Child loader returned a row without content");
                return Err(TreeError::MissingRequiredField {
                    field: "content".to_string(),
                    context: format!("child {} loaded under node {}", index, parent_id),
                });
            }
            if let Some(child_id) = &child.id {
                if self.registry.contains(child_id)
                    || reserved.contains(child_id)
                    || !batch_ids.insert(child_id.clone())
                {
                    warn!(table = %self.id, node_id = %parent_id, child_id = %child_id, "Child loader returned a duplicate id");
                    return Err(TreeError::DuplicateId(child_id.clone()));
                }
            }
        }
        reserved.extend(batch_ids);

        let mut staged = Vec::with_capacity(loaded.len());
        for child in loaded {
            let child_id = match child.id {
                Some(child_id) => child_id,
                None => loop {
                    let candidate = self.generate_id();
                    if reserved.insert(candidate.clone()) {
                        break candidate;
                    }
                },
            };
            let Some(content) = child.content else {
                continue;
            };
            let mut node = Node::new(child_id, Some(parent_id.to_string()), content);
            node.allows_children = !child.no_children;
            node.allows_drag = !child.no_drag;
            node.user_data = child.user_data;
            staged.push(node);
        }
        Ok(staged)
    }

    /// Load `parent` and each of its children, the loads an expand of
    /// `parent` would trigger. With `None` nothing needs loading.
    pub(crate) fn preload_slot(&mut self, parent: Option<&str>) -> Result<(), TreeError> {
        let Some(parent_id) = parent else {
            return Ok(());
        };
        for child in self.load_children(parent_id)? {
            self.load_children(&child)?;
        }
        Ok(())
    }

    /// Load the whole tree under `id`, the node included
    pub(crate) fn load_descendants(&mut self, id: &str) -> Result<(), TreeError> {
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            let children = self.load_children(&current)?;
            stack.extend(children);
        }
        Ok(())
    }

    /// Load every node of the table
    pub fn load_all(&mut self) -> Result<(), TreeError> {
        let roots = self.registry.roots().to_vec();
        for root in roots {
            self.load_descendants(&root)?;
        }
        Ok(())
    }

    /// Expand a visible node. Hidden nodes and nodes without children are
    /// left alone.
    pub fn expand(&mut self, id: &str) -> Result<(), TreeError> {
        if !self.registry.get(id)?.visible {
            debug!(table = %self.id, node_id = %id, "Not expanding hidden node");
            return Ok(());
        }
        self.expand_row(id)
    }

    /// Mark a node expanded and show what is below it. Children of each
    /// child are loaded too, so that their child count is known when they
    /// are displayed. A hidden node is only marked.
    pub(crate) fn expand_row(&mut self, id: &str) -> Result<(), TreeError> {
        let children = self.load_children(id)?;
        if children.is_empty() {
            return Ok(());
        }
        for child in &children {
            self.load_children(child)?;
        }

        let node = self.registry.get_mut(id)?;
        node.expanded = true;
        if node.visible {
            self.reveal_expanded(id)?;
        }

        debug!(table = %self.id, node_id = %id, "Expanded node");
        self.events.push(TreeEvent::NodeExpanded {
            node_id: id.to_string(),
        });
        self.events.push(TreeEvent::SizeChanged);
        Ok(())
    }

    /// Show the children of an expanded node, and recursively the children
    /// of every shown node that is itself expanded.
    pub(crate) fn reveal_expanded(&mut self, id: &str) -> Result<(), TreeError> {
        if !self.registry.get(id)?.expanded {
            return Ok(());
        }
        let mut stack = vec![id.to_string()];
        while let Some(current) = stack.pop() {
            let children = self.registry.get(&current)?.children.clone();
            for child in children {
                let node = self.registry.get_mut(&child)?;
                node.visible = true;
                if node.expanded {
                    stack.push(child);
                }
            }
        }
        Ok(())
    }

    fn hide_below(&mut self, id: &str, include_self: bool) -> Result<(), TreeError> {
        let subtree = self.registry.subtree(id)?;
        let skip = usize::from(!include_self);
        for node_id in subtree.iter().skip(skip) {
            self.registry.get_mut(node_id)?.visible = false;
        }
        Ok(())
    }

    /// Hide every descendant. Their own expanded flags are kept, so
    /// expanding again restores the same view.
    pub fn collapse(&mut self, id: &str) -> Result<(), TreeError> {
        self.hide_below(id, false)?;
        self.registry.get_mut(id)?.expanded = false;

        debug!(table = %self.id, node_id = %id, "Collapsed node");
        self.events.push(TreeEvent::NodeCollapsed {
            node_id: id.to_string(),
        });
        self.events.push(TreeEvent::SizeChanged);
        Ok(())
    }

    pub fn toggle(&mut self, id: &str) -> Result<(), TreeError> {
        if self.registry.get(id)?.expanded {
            self.collapse(id)
        } else {
            self.expand(id)
        }
    }

    /// Expand every node, loading the whole table on the way
    pub fn expand_all(&mut self) -> Result<(), TreeError> {
        let mut stack: Vec<NodeId> = self.registry.roots().iter().rev().cloned().collect();
        while let Some(current) = stack.pop() {
            self.expand_row(&current)?;
            let children = self.registry.get(&current)?.children.clone();
            stack.extend(children.into_iter().rev());
        }
        Ok(())
    }

    /// Collapse every expanded node below `id`, deepest first. With `None`
    /// the whole table is collapsed, roots included.
    pub fn collapse_all(&mut self, id: Option<&str>) -> Result<(), TreeError> {
        let order = match id {
            Some(id) => {
                let mut subtree = self.registry.subtree(id)?;
                subtree.remove(0);
                subtree
            }
            None => self.registry.preorder(),
        };
        for node_id in order.iter().rev() {
            if self.registry.get(node_id)?.expanded {
                self.collapse(node_id)?;
            }
        }
        Ok(())
    }

    /// Delete a node and its whole subtree.
    ///
    /// Descendants go first. The delete observer sees every node right
    /// before it is removed. Returns the removed ids in removal order.
    pub fn delete_node(&mut self, id: &str) -> Result<Vec<NodeId>, TreeError> {
        let order = self.registry.postorder(id)?;
        let parent = self.registry.get(id)?.parent_id.clone();

        for node_id in &order {
            if let Some(observer) = self.hooks.delete_observer.as_mut() {
                if let Ok(node) = self.registry.get(node_id) {
                    observer.pre_delete(node);
                }
            }
            self.registry.remove(node_id);
        }

        if let Some(parent_id) = parent.as_deref() {
            self.clear_expanded_if_childless(parent_id)?;
        }

        let removed: HashSet<&NodeId> = order.iter().collect();
        self.selection.retain(|selected| !removed.contains(selected));

        debug!(table = %self.id, node_id = %id, removed = order.len(), "Deleted subtree");
        self.events.push(TreeEvent::NodeDeleted {
            node_ids: order.clone(),
        });
        self.events.push(TreeEvent::SizeChanged);
        Ok(order)
    }

    fn clear_expanded_if_childless(&mut self, id: &str) -> Result<(), TreeError> {
        let node = self.registry.get_mut(id)?;
        if node.children.is_empty() {
            node.expanded = false;
        }
        Ok(())
    }

    /// Check that `new_parent` and `position` designate a valid slot
    pub(crate) fn validate_destination(
        &self,
        new_parent: Option<&str>,
        position: &Position,
    ) -> Result<(), TreeError> {
        if let Some(parent_id) = new_parent {
            let parent = self
                .registry
                .get(parent_id)
                .map_err(|_| TreeError::ParentNotFound(parent_id.to_string()))?;
            if !parent.allows_children {
                return Err(TreeError::ChildrenNotAllowed(parent_id.to_string()));
            }
        }
        if let Position::After(after) = position {
            let invalid = || TreeError::InvalidAfterNode {
                after: after.clone(),
                parent: new_parent.map(str::to_string),
            };
            let after_node = self.registry.get(after).map_err(|_| invalid())?;
            if after_node.parent_id.as_deref() != new_parent {
                return Err(invalid());
            }
        }
        Ok(())
    }

    /// Move a node and its subtree to a new slot.
    ///
    /// Every error is reported, the move policy's refusal included. See
    /// [`TreeTable::move_node`] for the forgiving variant. Returns the ids
    /// of the moved subtree in display order.
    pub fn move_to(
        &mut self,
        id: &str,
        new_parent: Option<&str>,
        position: Position,
    ) -> Result<Vec<NodeId>, TreeError> {
        self.registry.get(id)?;
        if let Some(parent_id) = new_parent {
            self.registry
                .get(parent_id)
                .map_err(|_| TreeError::ParentNotFound(parent_id.to_string()))?;
            if parent_id == id || self.is_ancestor_of(id, parent_id)? {
                return Err(TreeError::SelfParenting {
                    node: id.to_string(),
                    parent: parent_id.to_string(),
                });
            }
        }
        self.validate_destination(new_parent, &position)?;

        if let Some(policy) = self.hooks.move_policy.as_ref() {
            let node = self.registry.get(id)?;
            if !policy.move_allowed(node, new_parent, position.after_id()) {
                info!(table = %self.id, node_id = %id, new_parent_id = ?new_parent, "Move refused by policy");
                return Err(TreeError::MoveDenied(id.to_string()));
            }
        }

        self.relocate(id, new_parent, &position)
    }

    /// Move a node, `after = None` meaning the last slot. A refusal from the
    /// move policy yields `Ok(None)`.
    pub fn move_node(
        &mut self,
        id: &str,
        new_parent: Option<&str>,
        after: Option<&str>,
    ) -> Result<Option<Vec<NodeId>>, TreeError> {
        match self.move_to(id, new_parent, Position::after_or_last(after)) {
            Ok(moved) => Ok(Some(moved)),
            Err(TreeError::MoveDenied(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Relocate a validated node. The move policy is not consulted.
    pub(crate) fn relocate(
        &mut self,
        id: &str,
        new_parent: Option<&str>,
        position: &Position,
    ) -> Result<Vec<NodeId>, TreeError> {
        // Loads first: nothing after the detach may fail.
        if new_parent.is_some() {
            self.preload_slot(new_parent)?;
            self.load_children(id)?;
        }

        let (old_parent, old_level) = {
            let node = self.registry.get(id)?;
            (node.parent_id.clone(), node.nesting_level)
        };
        let new_level = match new_parent {
            Some(parent_id) => self.registry.get(parent_id)?.nesting_level + 1,
            None => 0,
        };

        let slot = self.registry.detach(id)?;
        let siblings = self.registry.children_of(new_parent).unwrap_or(&[]);
        let index = match position {
            Position::First => 0,
            Position::Last => siblings.len(),
            Position::After(after) if after == id => slot,
            Position::After(after) => siblings
                .iter()
                .position(|sibling| sibling == after)
                .map(|i| i + 1)
                .unwrap_or(siblings.len()),
        };
        self.registry.attach_at(id, new_parent, index)?;

        let moved = self.registry.subtree(id)?;
        for node_id in &moved {
            let node = self.registry.get_mut(node_id)?;
            node.nesting_level = node.nesting_level - old_level + new_level;
        }

        if let Some(parent_id) = old_parent.as_deref() {
            self.clear_expanded_if_childless(parent_id)?;
        }

        match new_parent {
            None => {
                self.registry.get_mut(id)?.visible = true;
                self.reveal_expanded(id)?;
            }
            Some(parent_id) => {
                self.hide_below(id, true)?;
                self.expand_row(parent_id)?;
            }
        }

        debug!(
            table = %self.id,
            node_id = %id,
            new_parent_id = ?new_parent,
            position = ?position,
            moved = moved.len(),
            "Moved subtree"
        );
        self.events.push(TreeEvent::SizeChanged);
        Ok(moved)
    }
}
