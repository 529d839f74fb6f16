//! Row selection and keyboard navigation

use crate::error::TreeError;
use crate::tree::TreeTable;
use crate::types::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Modifier keys held during a click
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

/// Keys the table reacts to while it has a selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavKey {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Delete,
    Escape,
    /// Any other key; left to the caller
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Handled,
    Unhandled,
}

impl<C> TreeTable<C> {
    /// Make `id` the only selected row
    pub fn select_node(&mut self, id: &str) -> Result<(), TreeError> {
        self.registry.get(id)?;
        self.selection = vec![id.to_string()];
        Ok(())
    }

    /// Apply a mouse click on a row.
    ///
    /// Ctrl adds the row to the selection. Shift with a single selected row
    /// selects every visible row between the two. Anything else selects the
    /// row alone.
    pub fn click(&mut self, id: &str, modifiers: Modifiers) -> Result<(), TreeError> {
        self.registry.get(id)?;

        if modifiers.shift && self.selection.len() == 1 && self.selection[0] != id {
            let anchor = self.selection[0].clone();
            let order = self.registry.preorder();
            let anchor_index = order.iter().position(|row| *row == anchor);
            let target_index = order.iter().position(|row| row == id);
            if let (Some(a), Some(b)) = (anchor_index, target_index) {
                let (start, end) = if a < b { (a, b) } else { (b, a) };
                self.selection = order[start..=end]
                    .iter()
                    .filter(|row| {
                        **row == anchor
                            || *row == id
                            || self.registry.get(row).map(|n| n.visible).unwrap_or(false)
                    })
                    .cloned()
                    .collect();
                return Ok(());
            }
        }

        if modifiers.ctrl {
            if !self.selection.iter().any(|row| row == id) {
                self.selection.push(id.to_string());
            }
            return Ok(());
        }

        self.selection = vec![id.to_string()];
        Ok(())
    }

    /// Selected rows in display order
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        let selected: HashSet<&NodeId> = self.selection.iter().collect();
        self.registry
            .preorder()
            .into_iter()
            .filter(|id| selected.contains(id))
            .collect()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|row| row == id)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// React to a key press. Without a selection nothing is handled.
    pub fn handle_key(&mut self, key: NavKey, shift: bool) -> Result<KeyOutcome, TreeError> {
        let selected = self.selected_nodes();
        let (Some(first), Some(last)) = (selected.first().cloned(), selected.last().cloned()) else {
            return Ok(KeyOutcome::Unhandled);
        };

        match key {
            NavKey::ArrowRight => {
                self.selection = vec![first.clone()];
                self.expand(&first)?;
            }
            NavKey::ArrowLeft => {
                self.selection = vec![first.clone()];
                self.collapse(&first)?;
            }
            NavKey::ArrowUp | NavKey::ArrowDown => {
                let target = if key == NavKey::ArrowUp {
                    self.prev_visible(&first)?
                } else {
                    self.next_visible(&last)?
                };
                if let Some(target) = target {
                    if shift {
                        if !self.is_selected(&target) {
                            self.selection.push(target);
                        }
                    } else {
                        self.selection = vec![target];
                    }
                }
            }
            NavKey::Delete => {
                if !self.options.allow_delete {
                    return Ok(KeyOutcome::Unhandled);
                }
                self.delete_selected(&selected)?;
            }
            NavKey::Escape => self.clear_selection(),
            NavKey::Other => return Ok(KeyOutcome::Unhandled),
        }
        Ok(KeyOutcome::Handled)
    }

    /// Delete the selected subtrees, then select the visible row right after
    /// the deleted block, or the one right before it.
    fn delete_selected(&mut self, selected: &[NodeId]) -> Result<(), TreeError> {
        let mut doomed = HashSet::new();
        for id in selected {
            doomed.extend(self.registry.subtree(id)?);
        }

        let order = self.registry.preorder();
        let visible_survivor = |row: &&NodeId| {
            !doomed.contains(*row) && self.registry.get(row).map(|n| n.visible).unwrap_or(false)
        };
        let first_index = order.iter().position(|row| doomed.contains(row));
        let last_index = order.iter().rposition(|row| doomed.contains(row));
        let next = last_index.and_then(|i| order[i + 1..].iter().find(visible_survivor).cloned());
        let prev = first_index.and_then(|i| order[..i].iter().rev().find(visible_survivor).cloned());

        for id in selected {
            if self.registry.contains(id) {
                self.delete_node(id)?;
            }
        }

        debug!(table = %self.id, deleted = doomed.len(), "Deleted selected rows");
        self.selection = next.or(prev).into_iter().collect();
        Ok(())
    }
}
