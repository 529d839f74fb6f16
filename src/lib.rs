//! Tree-Table: ordered tree engine for hierarchical table views
//!
//! Keeps an ordered forest of rows with lazily loaded children, expand and
//! collapse state, selection, and drag-and-drop placement between one or
//! more tables. Rendering is left to the caller: the engine exposes rows in
//! display order and queues [`TreeEvent`]s describing what changed.

pub mod callbacks;
pub mod config;
pub mod dnd;
pub mod error;
pub mod events;
pub mod fixture;
pub mod logging;
pub mod selection;
pub mod tables;
pub mod tooling;
pub mod tree;
pub mod types;

pub use callbacks::{
    ChildLoader, ConvertedRow, DeleteObserver, LoadedChild, MovePolicy, TableHooks,
    TransferConverter, TransferMetadata, TransferPolicy, TransferScope,
};
pub use config::{TableOptions, TreeTableConfig};
pub use dnd::{
    handle_drop, hover_placement, resolve_placement, DragSession, DropOutcome, DropTarget,
    InsertType, Placement, RowGeometry,
};
pub use error::TreeError;
pub use events::TreeEvent;
pub use selection::{KeyOutcome, Modifiers, NavKey};
pub use tables::TableSet;
pub use tree::{transfer, CheckReport, Node, NodeRegistry, RowView, TransferReport, TreeTable};
pub use types::{NodeId, Position, UserData};
