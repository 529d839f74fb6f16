//! Drag-and-Drop Placement Resolver
//!
//! Turns "cursor at height y over row r" into a concrete destination:
//! a new parent and a slot among its children.

use crate::error::TreeError;
use crate::tree::TreeTable;
use crate::types::{NodeId, Position};
use serde::{Deserialize, Serialize};

/// Vertical extent of the hovered row, in the same unit as the cursor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowGeometry {
    pub top: f64,
    pub height: f64,
}

impl RowGeometry {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsertType {
    Above,
    Into,
    Below,
}

/// Where a drop would land
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placement {
    pub insert: InsertType,
    pub new_parent_id: Option<NodeId>,
    pub position: Position,
    /// Row next to which the insertion line is drawn; `None` for `Into`
    pub indicator_row: Option<NodeId>,
}

impl Placement {
    pub fn new_parent(&self) -> Option<&str> {
        self.new_parent_id.as_deref()
    }

    pub fn after_id(&self) -> Option<&str> {
        self.position.after_id()
    }
}

/// Split the row in bands. Rows accepting children get a middle "into"
/// band covering half the height.
pub fn insert_type(allows_children: bool, geometry: RowGeometry, cursor_y: f64) -> InsertType {
    let relative = cursor_y - geometry.top;
    if allows_children {
        let quarter = geometry.height / 4.0;
        if relative < quarter {
            InsertType::Above
        } else if relative > 3.0 * quarter {
            InsertType::Below
        } else {
            InsertType::Into
        }
    } else if relative < geometry.height / 2.0 {
        InsertType::Above
    } else {
        InsertType::Below
    }
}

/// Resolve the drop position for a cursor over `hover`.
///
/// `dragged` is the dragged node when it belongs to `table`; dropping a node
/// on itself or inside its own subtree resolves to `None`.
pub fn resolve_placement<C>(
    table: &TreeTable<C>,
    dragged: Option<&str>,
    hover: &str,
    geometry: RowGeometry,
    cursor_y: f64,
) -> Result<Option<Placement>, TreeError> {
    let hover_node = table.get(hover)?;
    if let Some(dragged) = dragged {
        if dragged == hover {
            return Ok(None);
        }
        if table.node_exists(dragged) && table.is_ancestor_of(dragged, hover)? {
            return Ok(None);
        }
    }

    let insert = insert_type(hover_node.allows_children(), geometry, cursor_y);
    let placement = match insert {
        InsertType::Into => Placement {
            insert,
            new_parent_id: Some(hover.to_string()),
            position: Position::after_or_last(hover_node.children().last().map(String::as_str)),
            indicator_row: None,
        },
        InsertType::Above => match table.prev_visible(hover)? {
            None => Placement {
                insert,
                new_parent_id: None,
                position: Position::First,
                indicator_row: Some(hover.to_string()),
            },
            Some(_) => Placement {
                insert,
                new_parent_id: hover_node.parent_id().map(str::to_string),
                position: Position::after_or_first(table.prev_sibling(hover)?.map(|n| n.id())),
                indicator_row: Some(hover.to_string()),
            },
        },
        InsertType::Below => match table.next_visible(hover)? {
            None => Placement {
                insert,
                new_parent_id: None,
                position: Position::after_or_last(
                    table.root_nodes().last().map(String::as_str),
                ),
                indicator_row: Some(hover.to_string()),
            },
            Some(next) => {
                let next_node = table.get(&next)?;
                Placement {
                    insert,
                    new_parent_id: next_node.parent_id().map(str::to_string),
                    position: Position::after_or_first(table.prev_sibling(&next)?.map(|n| n.id())),
                    indicator_row: Some(hover.to_string()),
                }
            }
        },
    };
    Ok(Some(placement))
}

/// Rows to highlight while hovering: the loaded subtree of the new parent
pub fn highlighted_rows<C>(
    table: &TreeTable<C>,
    placement: &Placement,
) -> Result<Vec<NodeId>, TreeError> {
    match placement.new_parent() {
        Some(parent) => table.loaded_subtree(parent),
        None => Ok(Vec::new()),
    }
}
