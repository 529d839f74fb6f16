//! Collaborator interfaces
//!
//! The engine never renders or fetches anything itself. Children are produced
//! by a [`ChildLoader`], moves and transfers are gated by policies, and
//! transferred rows are converted by a [`TransferConverter`]. Every trait has
//! a blanket implementation for plain closures.

use crate::tree::node::Node;
use crate::types::{NodeId, UserData};
use serde::{Deserialize, Serialize};

/// One child produced by a [`ChildLoader`]
#[derive(Debug, Clone)]
pub struct LoadedChild<C> {
    /// Requested id; generated when absent
    pub id: Option<NodeId>,
    /// Row content. Required: a child without content is rejected.
    pub content: Option<C>,
    pub no_children: bool,
    pub no_drag: bool,
    pub user_data: Option<UserData>,
}

impl<C> LoadedChild<C> {
    pub fn new(content: C) -> Self {
        Self {
            id: None,
            content: Some(content),
            no_children: false,
            no_drag: false,
            user_data: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn leaf(mut self) -> Self {
        self.no_children = true;
        self
    }

    pub fn no_drag(mut self) -> Self {
        self.no_drag = true;
        self
    }

    pub fn with_user_data(mut self, user_data: UserData) -> Self {
        self.user_data = Some(user_data);
        self
    }
}

/// Supplies the children of a node the first time they are needed
pub trait ChildLoader<C> {
    fn load_children(&mut self, node_id: &str, user_data: Option<&UserData>)
        -> Vec<LoadedChild<C>>;
}

impl<C, F> ChildLoader<C> for F
where
    F: FnMut(&str, Option<&UserData>) -> Vec<LoadedChild<C>>,
{
    fn load_children(
        &mut self,
        node_id: &str,
        user_data: Option<&UserData>,
    ) -> Vec<LoadedChild<C>> {
        self(node_id, user_data)
    }
}

/// Gate for moves inside a single table
pub trait MovePolicy<C> {
    fn move_allowed(&self, node: &Node<C>, new_parent_id: Option<&str>, after_id: Option<&str>)
        -> bool;
}

impl<C, F> MovePolicy<C> for F
where
    F: Fn(&Node<C>, Option<&str>, Option<&str>) -> bool,
{
    fn move_allowed(
        &self,
        node: &Node<C>,
        new_parent_id: Option<&str>,
        after_id: Option<&str>,
    ) -> bool {
        self(node, new_parent_id, after_id)
    }
}

/// How much of a subtree a transfer carries along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferScope {
    /// Transfer refused
    None,
    /// The row alone
    RowOnly,
    /// The row and its currently visible descendants
    VisibleOnly,
    /// The row and every descendant, loading what is not loaded yet
    All,
}

/// Decides whether (and how much of) a node may enter the destination table
pub trait TransferPolicy<C> {
    fn transfer_scope(
        &self,
        source_table: &str,
        dest_table: &str,
        node: &Node<C>,
        new_parent_id: Option<&str>,
        after_id: Option<&str>,
    ) -> TransferScope;
}

impl<C, F> TransferPolicy<C> for F
where
    F: Fn(&str, &str, &Node<C>, Option<&str>, Option<&str>) -> TransferScope,
{
    fn transfer_scope(
        &self,
        source_table: &str,
        dest_table: &str,
        node: &Node<C>,
        new_parent_id: Option<&str>,
        after_id: Option<&str>,
    ) -> TransferScope {
        self(source_table, dest_table, node, new_parent_id, after_id)
    }
}

/// Origin of a row handed to a [`TransferConverter`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferMetadata {
    pub original_id: NodeId,
    pub original_parent_id: Option<NodeId>,
    pub user_data: Option<UserData>,
}

/// Output of a [`TransferConverter`]
#[derive(Debug, Clone)]
pub struct ConvertedRow<C> {
    /// Required content of the new row
    pub content: Option<C>,
    /// Requested id in the destination table; generated when absent
    pub id: Option<NodeId>,
}

impl<C> ConvertedRow<C> {
    pub fn new(content: C) -> Self {
        Self {
            content: Some(content),
            id: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Converts a source row for insertion in the destination table.
/// Returning `None` leaves that row out of the transfer.
pub trait TransferConverter<C> {
    fn convert(
        &mut self,
        source_table: &str,
        content: &C,
        meta: &TransferMetadata,
    ) -> Option<ConvertedRow<C>>;
}

impl<C, F> TransferConverter<C> for F
where
    F: FnMut(&str, &C, &TransferMetadata) -> Option<ConvertedRow<C>>,
{
    fn convert(
        &mut self,
        source_table: &str,
        content: &C,
        meta: &TransferMetadata,
    ) -> Option<ConvertedRow<C>> {
        self(source_table, content, meta)
    }
}

/// Notified once per node right before it leaves the table
pub trait DeleteObserver<C> {
    fn pre_delete(&mut self, node: &Node<C>);
}

impl<C, F> DeleteObserver<C> for F
where
    F: FnMut(&Node<C>),
{
    fn pre_delete(&mut self, node: &Node<C>) {
        self(node)
    }
}

/// Collaborators installed on a table. Absent hooks fall back to defaults:
/// no loader means nodes only gain children through `add_node`, no move
/// policy allows every move, and transfers need both transfer hooks.
pub struct TableHooks<C> {
    pub loader: Option<Box<dyn ChildLoader<C>>>,
    pub move_policy: Option<Box<dyn MovePolicy<C>>>,
    pub transfer_policy: Option<Box<dyn TransferPolicy<C>>>,
    pub transfer_converter: Option<Box<dyn TransferConverter<C>>>,
    pub delete_observer: Option<Box<dyn DeleteObserver<C>>>,
}

impl<C> Default for TableHooks<C> {
    fn default() -> Self {
        Self {
            loader: None,
            move_policy: None,
            transfer_policy: None,
            transfer_converter: None,
            delete_observer: None,
        }
    }
}

impl<C> TableHooks<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_loader(mut self, loader: impl ChildLoader<C> + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    pub fn with_move_policy(mut self, policy: impl MovePolicy<C> + 'static) -> Self {
        self.move_policy = Some(Box::new(policy));
        self
    }

    pub fn with_transfer_policy(mut self, policy: impl TransferPolicy<C> + 'static) -> Self {
        self.transfer_policy = Some(Box::new(policy));
        self
    }

    pub fn with_transfer_converter(
        mut self,
        converter: impl TransferConverter<C> + 'static,
    ) -> Self {
        self.transfer_converter = Some(Box::new(converter));
        self
    }

    pub fn with_delete_observer(mut self, observer: impl DeleteObserver<C> + 'static) -> Self {
        self.delete_observer = Some(Box::new(observer));
        self
    }

    pub(crate) fn supports_transfer(&self) -> bool {
        self.transfer_policy.is_some() && self.transfer_converter.is_some()
    }
}
