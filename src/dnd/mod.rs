//! Drag and drop: placement resolution and drag sessions

pub mod placement;
pub mod session;

pub use placement::{highlighted_rows, insert_type, resolve_placement, InsertType, Placement, RowGeometry};
pub use session::{handle_drop, hover_placement, DragSession, DropOutcome, DropTarget};
