//! Layout module orchestrator.
//!
//! Downstream code imports the item model from here while the wire details
//! live in the private `item` and `patch` modules.

mod item;
mod patch;

pub use item::{ItemId, LayoutItem, StyleMap, StyleValue};
pub use patch::GeometryPatch;
