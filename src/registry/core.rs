use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::Result;
use crate::layout::{GeometryPatch, ItemId, LayoutItem};
use crate::store::EditOutcome;

/// Closed set of block kinds the builder knows how to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockType {
    Text,
    Image,
    Video,
    Container,
    Header,
    /// No type recorded; rendered as a text block.
    #[default]
    Default,
}

impl BlockType {
    /// Palette order offered by the toolbox.
    pub const PLACEABLE: [BlockType; 5] = [
        BlockType::Text,
        BlockType::Video,
        BlockType::Image,
        BlockType::Container,
        BlockType::Header,
    ];

    /// Resolve a wire tag. Unknown tags fall back to [`BlockType::Default`].
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "text" => Self::Text,
            "image" => Self::Image,
            "video" => Self::Video,
            "container" => Self::Container,
            "header" => Self::Header,
            _ => Self::Default,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::Video => "video",
            Self::Container => "container",
            Self::Header => "header",
            Self::Default => "default",
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }

    /// The block type whose renderer draws this one.
    pub fn rendered_as(self) -> Self {
        match self {
            Self::Default => Self::Text,
            other => other,
        }
    }
}

impl fmt::Display for BlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl Serialize for BlockType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

impl<'de> Deserialize<'de> for BlockType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = Option::<String>::deserialize(deserializer)?;
        Ok(tag.as_deref().map(Self::from_tag).unwrap_or_default())
    }
}

/// What a renderer of a given block type is allowed to ask of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockCapabilities {
    pub editable: bool,
    pub removable: bool,
    pub accepts_nested: bool,
}

impl BlockCapabilities {
    const LEAF: Self = Self {
        editable: true,
        removable: true,
        accepts_nested: false,
    };

    const CONTAINER: Self = Self {
        editable: true,
        removable: true,
        accepts_nested: true,
    };
}

/// Callbacks the engine hands to block renderers.
pub trait BlockActions {
    fn edit_field(&mut self, id: &str, field: &str, value: Value, is_style: bool)
    -> Result<EditOutcome>;

    fn remove_item(&mut self, id: &str) -> bool;

    /// Place a block nested in a container. Delegates to the regular create path.
    fn add_nested_item(&mut self, block_type: &str, element: &GeometryPatch) -> ItemId;
}

/// Renderer contract for one block type. Implementations live outside the
/// engine; they interpret `content` and `style` however they like.
pub trait BlockRenderer: Send + Sync {
    fn render(&self, item: &LayoutItem) -> String;

    /// React to an operator interaction inside the block.
    fn on_input(
        &self,
        _item: &LayoutItem,
        _input: &Value,
        _actions: &mut dyn BlockActions,
    ) -> Result<()> {
        Ok(())
    }
}

/// Palette entry offered as a drag source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolboxEntry {
    pub block_type: BlockType,
    pub label: &'static str,
}

#[derive(Clone)]
struct BlockEntry {
    label: &'static str,
    capabilities: BlockCapabilities,
    renderer: Option<Arc<dyn BlockRenderer>>,
}

/// Tag to capability dispatch table.
#[derive(Clone)]
pub struct BlockRegistry {
    entries: HashMap<BlockType, BlockEntry>,
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut rendered: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.renderer.is_some())
            .map(|(block_type, _)| block_type.tag())
            .collect();
        rendered.sort_unstable();
        f.debug_struct("BlockRegistry")
            .field("types", &self.entries.len())
            .field("renderers", &rendered)
            .finish()
    }
}

impl BlockRegistry {
    pub fn new() -> Self {
        let table = [
            (BlockType::Text, "Text", BlockCapabilities::LEAF),
            (BlockType::Image, "Image", BlockCapabilities::LEAF),
            (BlockType::Video, "Video", BlockCapabilities::LEAF),
            (BlockType::Container, "Container", BlockCapabilities::CONTAINER),
            (BlockType::Header, "Header", BlockCapabilities::LEAF),
        ];
        let entries = table
            .into_iter()
            .map(|(block_type, label, capabilities)| {
                (
                    block_type,
                    BlockEntry {
                        label,
                        capabilities,
                        renderer: None,
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Resolve a wire tag to a registered type, falling back to the default block.
    pub fn resolve(&self, tag: &str) -> BlockType {
        let block_type = BlockType::from_tag(tag);
        if self.entries.contains_key(&block_type.rendered_as()) {
            block_type
        } else {
            BlockType::Default
        }
    }

    pub fn capabilities(&self, block_type: BlockType) -> BlockCapabilities {
        self.entry(block_type)
            .map(|entry| entry.capabilities)
            .unwrap_or(BlockCapabilities::LEAF)
    }

    pub fn register_renderer<R>(&mut self, block_type: BlockType, renderer: R)
    where
        R: BlockRenderer + 'static,
    {
        if let Some(entry) = self.entries.get_mut(&block_type.rendered_as()) {
            entry.renderer = Some(Arc::new(renderer));
        }
    }

    /// Withdraw a block type. Its tag resolves to the default block afterwards
    /// and it leaves the toolbox. Text backs the default block and stays.
    pub fn unregister(&mut self, block_type: BlockType) -> bool {
        if matches!(block_type.rendered_as(), BlockType::Text) {
            return false;
        }
        self.entries.remove(&block_type).is_some()
    }

    pub fn renderer_for(&self, block_type: BlockType) -> Option<Arc<dyn BlockRenderer>> {
        self.entry(block_type).and_then(|entry| entry.renderer.clone())
    }

    pub fn toolbox(&self) -> Vec<ToolboxEntry> {
        BlockType::PLACEABLE
            .iter()
            .filter_map(|block_type| {
                self.entries.get(block_type).map(|entry| ToolboxEntry {
                    block_type: *block_type,
                    label: entry.label,
                })
            })
            .collect()
    }

    fn entry(&self, block_type: BlockType) -> Option<&BlockEntry> {
        self.entries.get(&block_type.rendered_as())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Plain;

    impl BlockRenderer for Plain {
        fn render(&self, item: &LayoutItem) -> String {
            format!("<p>{}</p>", item.content.as_str().unwrap_or_default())
        }
    }

    #[test]
    fn resolve_falls_back_for_unknown_tags() {
        let registry = BlockRegistry::new();
        assert_eq!(registry.resolve("video"), BlockType::Video);
        assert_eq!(registry.resolve("carousel"), BlockType::Default);
        assert_eq!(registry.resolve(""), BlockType::Default);
    }

    #[test]
    fn only_containers_accept_nested_blocks() {
        let registry = BlockRegistry::new();
        assert!(registry.capabilities(BlockType::Container).accepts_nested);
        assert!(!registry.capabilities(BlockType::Image).accepts_nested);
        assert!(!registry.capabilities(BlockType::Default).accepts_nested);
    }

    #[test]
    fn default_blocks_use_the_text_renderer() {
        let mut registry = BlockRegistry::new();
        registry.register_renderer(BlockType::Text, Plain);
        assert!(registry.renderer_for(BlockType::Default).is_some());
        assert!(registry.renderer_for(BlockType::Image).is_none());
    }

    #[test]
    fn toolbox_lists_palette_in_order() {
        let registry = BlockRegistry::new();
        let tags: Vec<_> = registry
            .toolbox()
            .into_iter()
            .map(|entry| entry.block_type.tag())
            .collect();
        assert_eq!(tags, ["text", "video", "image", "container", "header"]);
    }

    #[test]
    fn unregistered_types_resolve_to_default() {
        let mut registry = BlockRegistry::new();
        assert!(registry.unregister(BlockType::Video));
        assert!(!registry.unregister(BlockType::Video));
        assert!(!registry.unregister(BlockType::Text));
        assert!(!registry.unregister(BlockType::Default));

        assert_eq!(registry.resolve("video"), BlockType::Default);
        assert!(
            registry
                .toolbox()
                .iter()
                .all(|entry| entry.block_type != BlockType::Video)
        );
    }

    #[test]
    fn block_type_serde_is_lenient() {
        let parsed: BlockType = serde_json::from_str("\"header\"").unwrap();
        assert_eq!(parsed, BlockType::Header);
        let unknown: BlockType = serde_json::from_str("\"gallery\"").unwrap();
        assert_eq!(unknown, BlockType::Default);
        let null: BlockType = serde_json::from_str("null").unwrap();
        assert_eq!(null, BlockType::Default);
        assert_eq!(serde_json::to_string(&BlockType::Image).unwrap(), "\"image\"");
    }
}
