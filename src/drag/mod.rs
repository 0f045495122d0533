//! Drag-and-drop controller: session state for a single drag gesture and
//! the click versus drag disambiguation in front of it.

mod pointer;
mod session;

pub use pointer::{DEFAULT_CLICK_THRESHOLD, PointerGesture, PointerTracker};
pub use session::{
    DragController, DragSession, DragSource, DragState, DropEvent, DropIgnored, DropResolution,
    TransferData,
};
