//! Layout item store: the single canonical, replace-on-write collection of
//! placed blocks.

mod core;

pub use self::core::{EditOutcome, LayoutSnapshot, LayoutStore};
