//! Structural invariant verification
//!
//! Walks the whole registry and reports every inconsistency found instead of
//! stopping at the first one.

use crate::tree::TreeTable;
use serde::Serialize;
use std::collections::HashSet;

/// Result of [`TreeTable::check_invariants`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub node_count: usize,
    pub errors: Vec<String>,
}

impl CheckReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl<C> TreeTable<C> {
    pub fn check_invariants(&self) -> CheckReport {
        let mut report = CheckReport {
            node_count: self.registry.len(),
            errors: Vec::new(),
        };
        let errors = &mut report.errors;

        // Own walk rather than preorder(): a cycle must not hang the checker.
        let mut seen = HashSet::with_capacity(self.registry.len());
        let mut stack: Vec<&str> = self.registry.roots().iter().map(String::as_str).collect();
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                errors.push(format!("{}: reachable more than once", id));
                continue;
            }
            if let Ok(node) = self.registry.get(id) {
                stack.extend(node.children.iter().map(String::as_str));
            }
        }
        if seen.len() != self.registry.len() {
            errors.push(format!(
                "{} nodes stored but {} reachable from the roots",
                self.registry.len(),
                seen.len()
            ));
        }

        for root in self.registry.roots() {
            match self.registry.get(root) {
                Ok(node) if node.parent_id.is_some() => {
                    errors.push(format!("{}: listed as root but has a parent", root))
                }
                Ok(_) => {}
                Err(_) => errors.push(format!("{}: listed as root but not stored", root)),
            }
        }

        for node in self.registry.iter() {
            let id = &node.id;
            match node.parent_id.as_deref() {
                None => {
                    if node.nesting_level != 0 {
                        errors.push(format!("{}: root at level {}", id, node.nesting_level));
                    }
                    if !node.visible {
                        errors.push(format!("{}: root is hidden", id));
                    }
                }
                Some(parent_id) => match self.registry.get(parent_id) {
                    Err(_) => errors.push(format!("{}: parent {} does not exist", id, parent_id)),
                    Ok(parent) => {
                        if !parent.children.iter().any(|child| child == id) {
                            errors.push(format!("{}: missing from children of {}", id, parent_id));
                        }
                        if node.nesting_level != parent.nesting_level + 1 {
                            errors.push(format!(
                                "{}: level {} under parent at level {}",
                                id, node.nesting_level, parent.nesting_level
                            ));
                        }
                        if node.visible && !(parent.visible && parent.expanded) {
                            errors.push(format!(
                                "{}: visible under a hidden or collapsed parent",
                                id
                            ));
                        }
                    }
                },
            }

            for child in &node.children {
                match self.registry.get(child) {
                    Ok(child_node) if child_node.parent_id.as_deref() != Some(id.as_str()) => {
                        errors.push(format!("{}: child {} points to another parent", id, child))
                    }
                    Ok(_) => {}
                    Err(_) => errors.push(format!("{}: child {} does not exist", id, child)),
                }
            }
            if !node.allows_children && !node.children.is_empty() {
                errors.push(format!("{}: has children but does not allow them", id));
            }
            if node.expanded && node.children.is_empty() {
                errors.push(format!("{}: expanded without children", id));
            }
        }

        report
    }
}
