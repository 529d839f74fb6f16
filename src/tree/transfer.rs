//! Subtree transfer between two tables
//!
//! The destination table decides, through its transfer policy, how much of
//! each source subtree comes along and converts every row with its
//! converter. The source table keeps its rows.

use crate::callbacks::{TransferMetadata, TransferScope};
use crate::error::TreeError;
use crate::events::TreeEvent;
use crate::tree::node::Node;
use crate::tree::TreeTable;
use crate::types::{NodeId, Position, UserData};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info};

/// Outcome of a transfer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TransferReport {
    /// Source rows picked by the transfer policy, in source display order
    pub source_ids: Vec<NodeId>,
    /// New ids of the rows placed at the requested slot
    pub top_ids: Vec<NodeId>,
    /// Every new id in destination display order
    pub dest_ids: Vec<NodeId>,
    /// Source id → destination id, for every converted row
    pub id_map: BTreeMap<NodeId, NodeId>,
}

struct PendingRow<C> {
    source_id: NodeId,
    source_parent: Option<NodeId>,
    requested_id: Option<NodeId>,
    content: C,
    allows_children: bool,
    allows_drag: bool,
    user_data: Option<UserData>,
}

/// Transfer `ids` from `source` into `dest` at `new_parent` / `position`.
///
/// Fails with [`TreeError::TransferUnsupported`] when `dest` has no
/// transfer policy or converter, and with [`TreeError::MoveDenied`] when the
/// destination move policy refuses where a top row would land. Every conversion and id check runs before
/// `dest` is modified.
pub fn transfer_nodes<C, S: AsRef<str>>(
    source: &mut TreeTable<C>,
    dest: &mut TreeTable<C>,
    ids: &[S],
    new_parent: Option<&str>,
    position: Position,
) -> Result<TransferReport, TreeError> {
    if !dest.hooks.supports_transfer() {
        return Err(TreeError::TransferUnsupported(dest.id.clone()));
    }
    let scopes = prepare(source, dest, ids, new_parent, &position)?;
    apply(source, dest, scopes, new_parent, position)
}

/// Like [`transfer_nodes`], but a destination that cannot take the rows is
/// not an error: missing collaborators, a transfer policy refusing every
/// row, or a move policy refusing a placement yield `Ok(None)` and leave
/// `dest` untouched.
pub fn transfer_at<C, S: AsRef<str>>(
    source: &mut TreeTable<C>,
    dest: &mut TreeTable<C>,
    ids: &[S],
    new_parent: Option<&str>,
    position: Position,
) -> Result<Option<TransferReport>, TreeError> {
    if !dest.hooks.supports_transfer() {
        info!(source = %source.id, dest = %dest.id, "Destination table does not accept transfers");
        return Ok(None);
    }
    let scopes = prepare(source, dest, ids, new_parent, &position)?;
    if scopes.iter().all(|(_, scope)| *scope == TransferScope::None) {
        info!(source = %source.id, dest = %dest.id, "Transfer refused by policy");
        return Ok(None);
    }
    match apply(source, dest, scopes, new_parent, position) {
        Ok(report) => Ok(Some(report)),
        Err(TreeError::MoveDenied(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Transfer with `after = None` meaning the last slot
pub fn transfer<C, S: AsRef<str>>(
    source: &mut TreeTable<C>,
    dest: &mut TreeTable<C>,
    ids: &[S],
    new_parent: Option<&str>,
    after: Option<&str>,
) -> Result<Option<TransferReport>, TreeError> {
    transfer_at(source, dest, ids, new_parent, Position::after_or_last(after))
}

/// Validate the request and ask the destination policy for each scope
fn prepare<C, S: AsRef<str>>(
    source: &TreeTable<C>,
    dest: &TreeTable<C>,
    ids: &[S],
    new_parent: Option<&str>,
    position: &Position,
) -> Result<Vec<(NodeId, TransferScope)>, TreeError> {
    dest.validate_destination(new_parent, position)?;
    let policy = dest
        .hooks
        .transfer_policy
        .as_ref()
        .ok_or_else(|| TreeError::TransferUnsupported(dest.id.clone()))?;

    let mut scopes = Vec::with_capacity(ids.len());
    for id in ids {
        let node = source.registry.get(id.as_ref())?;
        let scope =
            policy.transfer_scope(&source.id, &dest.id, node, new_parent, position.after_id());
        scopes.push((node.id.clone(), scope));
    }
    Ok(scopes)
}

/// Convert, check and stage every row, then commit. Any error comes back
/// before `dest` is changed, lazy loads aside.
fn apply<C>(
    source: &mut TreeTable<C>,
    dest: &mut TreeTable<C>,
    scopes: Vec<(NodeId, TransferScope)>,
    new_parent: Option<&str>,
    position: Position,
) -> Result<TransferReport, TreeError> {
    let rows = collect_rows(source, &scopes)?;
    let pending = convert_rows(source, dest, &rows)?;

    dest.preload_slot(new_parent)?;
    let mut reserved = HashSet::new();
    let new_ids = assign_ids(dest, &pending, &mut reserved)?;

    let mut report = TransferReport {
        source_ids: rows,
        ..TransferReport::default()
    };
    for (row, new_id) in pending.iter().zip(new_ids.iter()) {
        report.id_map.insert(row.source_id.clone(), new_id.clone());
    }

    // Rows whose source parent was converted go under the converted parent;
    // the others are top rows, staged as roots and placed afterwards.
    let mut staged = Vec::with_capacity(pending.len());
    let mut filled_parents = BTreeSet::new();
    let mut tops = Vec::new();
    for (row, new_id) in pending.into_iter().zip(new_ids) {
        let converted_parent = row
            .source_parent
            .as_ref()
            .and_then(|parent| report.id_map.get(parent))
            .cloned();
        match &converted_parent {
            Some(parent) => {
                filled_parents.insert(parent.clone());
            }
            None => tops.push(new_id.clone()),
        }
        let mut node = Node::new(new_id, converted_parent, row.content);
        node.allows_children = row.allows_children;
        node.allows_drag = row.allows_drag;
        node.user_data = row.user_data;
        staged.push(node);
    }

    check_move_policy(dest, &staged, &tops, new_parent, &position)?;

    // Top rows get their children from the destination loader, unless some
    // were transferred with them.
    let mut top_children = Vec::new();
    for node in staged.iter().filter(|node| node.parent_id.is_none()) {
        if node.allows_children && !filled_parents.contains(&node.id) {
            let children = dest.fetch_children(&node.id, node.user_data.as_ref(), &mut reserved)?;
            top_children.push((node.id.clone(), children));
        }
    }

    for node in staged {
        dest.registry.insert(node)?;
    }
    for parent in &filled_parents {
        dest.registry.get_mut(parent)?.children_loaded = true;
    }
    for (top, children) in top_children {
        for child in children {
            dest.registry.insert(child)?;
        }
        dest.registry.get_mut(&top)?.children_loaded = true;
    }

    let mut rolling = position.clone();
    for top in &tops {
        let moved = dest.relocate(top, new_parent, &rolling)?;
        report.dest_ids.extend(moved);
        rolling = Position::After(top.clone());
    }
    report.top_ids = tops;

    debug!(
        source = %source.id,
        dest = %dest.id,
        rows = report.id_map.len(),
        new_parent_id = ?new_parent,
        "Transferred rows"
    );
    dest.events.push(TreeEvent::TransferComplete {
        source_table: source.id.clone(),
        dest_table: dest.id.clone(),
        new_parent_id: new_parent.map(str::to_string),
        after_id: position.after_id().map(str::to_string),
        id_map: report.id_map.clone(),
    });
    Ok(report)
}

/// Ask the destination move policy about each top row at the slot it will
/// take, the rolling `after` included.
fn check_move_policy<C>(
    dest: &TreeTable<C>,
    staged: &[Node<C>],
    tops: &[NodeId],
    new_parent: Option<&str>,
    position: &Position,
) -> Result<(), TreeError> {
    let Some(policy) = dest.hooks.move_policy.as_ref() else {
        return Ok(());
    };
    let mut after = position.after_id().map(str::to_string);
    for top in tops {
        if let Some(node) = staged.iter().find(|node| &node.id == top) {
            if !policy.move_allowed(node, new_parent, after.as_deref()) {
                info!(dest = %dest.id, node_id = %top, new_parent_id = ?new_parent, "Transfer placement refused by move policy");
                return Err(TreeError::MoveDenied(top.clone()));
            }
        }
        after = Some(top.clone());
    }
    Ok(())
}

/// Source rows covered by the scopes, deduplicated, in source display order
fn collect_rows<C>(
    source: &mut TreeTable<C>,
    scopes: &[(NodeId, TransferScope)],
) -> Result<Vec<NodeId>, TreeError> {
    let mut picked = HashSet::new();
    for (id, scope) in scopes {
        match scope {
            TransferScope::None => {}
            TransferScope::RowOnly => {
                picked.insert(id.clone());
            }
            TransferScope::VisibleOnly => {
                picked.insert(id.clone());
                picked.extend(source.visible_nodes(Some(id.as_str()), |_| true)?);
            }
            TransferScope::All => {
                source.load_descendants(id)?;
                picked.extend(source.registry.subtree(id)?);
            }
        }
    }
    Ok(source
        .registry
        .preorder()
        .into_iter()
        .filter(|id| picked.contains(id))
        .collect())
}

fn convert_rows<C>(
    source: &TreeTable<C>,
    dest: &mut TreeTable<C>,
    rows: &[NodeId],
) -> Result<Vec<PendingRow<C>>, TreeError> {
    let converter = dest
        .hooks
        .transfer_converter
        .as_mut()
        .ok_or_else(|| TreeError::TransferUnsupported(dest.id.clone()))?;

    let mut pending = Vec::with_capacity(rows.len());
    for row in rows {
        let node = source.registry.get(row)?;
        let meta = TransferMetadata {
            original_id: node.id.clone(),
            original_parent_id: node.parent_id.clone(),
            user_data: node.user_data.clone(),
        };
        let Some(converted) = converter.convert(&source.id, &node.content, &meta) else {
            debug!(source = %source.id, node_id = %row, "Converter skipped row");
            continue;
        };
        let content = converted.content.ok_or_else(|| TreeError::MissingRequiredField {
            field: "content".to_string(),
            context: format!("conversion of node {}", row),
        })?;
        pending.push(PendingRow {
            source_id: node.id.clone(),
            source_parent: node.parent_id.clone(),
            requested_id: converted.id,
            content,
            allows_children: node.allows_children,
            allows_drag: node.allows_drag,
            user_data: node.user_data.clone(),
        });
    }
    Ok(pending)
}

fn assign_ids<C>(
    dest: &TreeTable<C>,
    pending: &[PendingRow<C>],
    reserved: &mut HashSet<NodeId>,
) -> Result<Vec<NodeId>, TreeError> {
    for row in pending {
        if let Some(id) = &row.requested_id {
            if dest.registry.contains(id) || !reserved.insert(id.clone()) {
                return Err(TreeError::DuplicateId(id.clone()));
            }
        }
    }
    let mut ids = Vec::with_capacity(pending.len());
    for row in pending {
        let id = match &row.requested_id {
            Some(id) => id.clone(),
            None => loop {
                let candidate = dest.generate_id();
                if reserved.insert(candidate.clone()) {
                    break candidate;
                }
            },
        };
        ids.push(id);
    }
    Ok(ids)
}
