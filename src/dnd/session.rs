//! Drag sessions
//!
//! A [`DragSession`] is created when a drag starts and handed back on
//! hover and drop. It serializes to JSON so it can travel through a
//! clipboard-like channel between views.

use crate::dnd::placement::{resolve_placement, Placement, RowGeometry};
use crate::error::TreeError;
use crate::events::TreeEvent;
use crate::tables::TableSet;
use crate::tree::{transfer_at, TransferReport, TreeTable};
use crate::types::{NodeId, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info};

/// The drag in progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragSession {
    pub source_table_id: String,
    pub dragged_node_id: NodeId,
    /// Selection of the source table when the drag started
    #[serde(default)]
    pub selected_node_ids: Vec<NodeId>,
}

impl DragSession {
    /// Start dragging `id`. Returns `None` when the table is not draggable
    /// or the node refuses to be dragged.
    pub fn start<C>(table: &TreeTable<C>, id: &str) -> Result<Option<Self>, TreeError> {
        let node = table.get(id)?;
        if !table.options().draggable || !node.allows_drag() {
            debug!(table = %table.id(), node_id = %id, "Drag not allowed");
            return Ok(None);
        }
        Ok(Some(Self {
            source_table_id: table.id().to_string(),
            dragged_node_id: id.to_string(),
            selected_node_ids: table.selected_nodes(),
        }))
    }

    pub fn encode(&self) -> Result<String, TreeError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parse an encoded session. Anything malformed is treated as "not a
    /// drag from a tree-table" and yields `None`.
    pub fn decode(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    /// The selection if it contains the dragged row, otherwise the dragged
    /// row alone
    pub fn rows_to_move(&self) -> Vec<NodeId> {
        if self.selected_node_ids.contains(&self.dragged_node_id) {
            self.selected_node_ids.clone()
        } else {
            vec![self.dragged_node_id.clone()]
        }
    }

    fn is_internal(&self, dest_table_id: &str) -> bool {
        self.source_table_id == dest_table_id
    }
}

/// Where a drop is aimed
#[derive(Debug, Clone, PartialEq)]
pub enum DropTarget {
    /// Cursor over a row; the slot comes from the placement resolver
    Row {
        hover_id: NodeId,
        geometry: RowGeometry,
        cursor_y: f64,
    },
    /// Slot chosen by the caller
    Explicit {
        new_parent_id: Option<NodeId>,
        position: Position,
    },
}

/// Result of a successful drop
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropOutcome {
    pub new_parent_id: Option<NodeId>,
    pub position: Position,
    /// Rows now in place in the destination table, in display order
    pub moved: Vec<NodeId>,
    /// Present for drops across tables
    pub transfer: Option<TransferReport>,
}

/// Placement feedback while hovering. `None` means the drop would be
/// refused: the destination is not droppable, the resolver rejects the row,
/// or the move/transfer policy says no.
pub fn hover_placement<C>(
    tables: &TableSet<C>,
    session: &DragSession,
    dest_table_id: &str,
    hover_id: &str,
    geometry: RowGeometry,
    cursor_y: f64,
) -> Result<Option<Placement>, TreeError> {
    let dest = tables.get(dest_table_id)?;
    if !dest.options().droppable {
        return Ok(None);
    }

    let internal = session.is_internal(dest_table_id);
    let dragged = internal.then_some(session.dragged_node_id.as_str());
    let Some(placement) = resolve_placement(dest, dragged, hover_id, geometry, cursor_y)? else {
        return Ok(None);
    };

    let allowed = if internal {
        let node = dest.get(&session.dragged_node_id)?;
        match dest.hooks.move_policy.as_ref() {
            Some(policy) => policy.move_allowed(node, placement.new_parent(), placement.after_id()),
            None => true,
        }
    } else {
        let source = tables.get(&session.source_table_id)?;
        let node = source.get(&session.dragged_node_id)?;
        match dest.hooks.transfer_policy.as_ref() {
            Some(policy) => {
                policy.transfer_scope(
                    source.id(),
                    dest.id(),
                    node,
                    placement.new_parent(),
                    placement.after_id(),
                ) != crate::callbacks::TransferScope::None
            }
            None => false,
        }
    };
    Ok(allowed.then_some(placement))
}

/// Complete a drag on `dest_table_id`.
///
/// Inside one table the rows are moved, skipping selected rows whose
/// parent is selected too since they travel with it. Across tables they are
/// transferred. Returns `None` when nothing was dropped.
pub fn handle_drop<C>(
    tables: &mut TableSet<C>,
    session: &DragSession,
    dest_table_id: &str,
    target: DropTarget,
) -> Result<Option<DropOutcome>, TreeError> {
    if !tables.get(dest_table_id)?.options().droppable {
        info!(dest = %dest_table_id, "Drop refused: table is not droppable");
        return Ok(None);
    }

    let internal = session.is_internal(dest_table_id);
    let (new_parent_id, position) = match target {
        DropTarget::Row {
            hover_id,
            geometry,
            cursor_y,
        } => {
            let dest = tables.get(dest_table_id)?;
            let dragged = internal.then_some(session.dragged_node_id.as_str());
            match resolve_placement(dest, dragged, &hover_id, geometry, cursor_y)? {
                Some(placement) => (placement.new_parent_id, placement.position),
                None => return Ok(None),
            }
        }
        DropTarget::Explicit {
            new_parent_id,
            position,
        } => (new_parent_id, position),
    };

    let outcome = if internal {
        let table = tables.get_mut(dest_table_id)?;
        drop_within(table, session, new_parent_id.as_deref(), &position)?
            .map(|moved| (moved, None))
    } else {
        let mut source = tables.take(&session.source_table_id)?;
        let rows: Vec<NodeId> = session
            .rows_to_move()
            .into_iter()
            .filter(|id| source.node_exists(id))
            .collect();
        let result = match tables.get_mut(dest_table_id) {
            Ok(dest) => transfer_at(&mut source, dest, &rows, new_parent_id.as_deref(), position.clone()),
            Err(e) => Err(e),
        };
        tables.restore(source);
        result?.map(|report| (report.dest_ids.clone(), Some(report)))
    };

    let Some((moved, transfer)) = outcome else {
        return Ok(None);
    };
    if moved.is_empty() {
        return Ok(None);
    }

    let dest = tables.get_mut(dest_table_id)?;
    dest.events.push(TreeEvent::RowsDropped {
        source_table: session.source_table_id.clone(),
        dest_table: dest_table_id.to_string(),
        node_ids: moved.clone(),
    });
    debug!(
        source = %session.source_table_id,
        dest = %dest_table_id,
        rows = moved.len(),
        "Dropped rows"
    );
    Ok(Some(DropOutcome {
        new_parent_id,
        position,
        moved,
        transfer,
    }))
}

/// Move the dragged rows inside their own table, one after the other
fn drop_within<C>(
    table: &mut TreeTable<C>,
    session: &DragSession,
    new_parent: Option<&str>,
    position: &Position,
) -> Result<Option<Vec<NodeId>>, TreeError> {
    let rows: Vec<NodeId> = session
        .rows_to_move()
        .into_iter()
        .filter(|id| table.node_exists(id))
        .collect();
    let selected: HashSet<&str> = rows.iter().map(String::as_str).collect();
    let mut tops = Vec::new();
    for row in &rows {
        let parent = table.get(row)?.parent_id();
        if !parent.map(|p| selected.contains(p)).unwrap_or(false) {
            tops.push(row.clone());
        }
    }

    table.validate_destination(new_parent, position)?;
    if let Some(parent) = new_parent {
        for row in &tops {
            if row == parent || table.is_ancestor_of(row, parent)? {
                info!(table = %table.id(), node_id = %row, "Drop refused: target inside a dragged row");
                return Ok(None);
            }
        }
    }

    // Each row lands after the previous one so the dragged rows keep their
    // display order. Giving every row the drop slot itself would reverse them.
    let mut moved = Vec::new();
    let mut rolling = position.clone();
    for row in &tops {
        match table.move_to(row, new_parent, rolling.clone()) {
            Ok(ids) => {
                moved.extend(ids);
                rolling = Position::After(row.clone());
            }
            Err(TreeError::MoveDenied(_)) => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(Some(moved))
}
