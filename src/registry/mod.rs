//! Block type registry: the explicit tag to capability table renderers are
//! dispatched through.

mod core;

pub use self::core::{
    BlockActions, BlockCapabilities, BlockRegistry, BlockRenderer, BlockType, ToolboxEntry,
};
