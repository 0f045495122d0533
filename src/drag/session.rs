use crate::error::{BuilderError, Result};
use crate::geometry::{Geometry, Span};
use crate::layout::{GeometryPatch, ItemId, LayoutItem};
use crate::registry::BlockType;

/// Where a drag gesture started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragSource {
    /// A palette entry for a block type not yet on the page.
    Toolbox,
    /// A block already placed on the grid.
    ExistingItem(ItemId),
}

/// Transient record of one in-progress drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub source: DragSource,
    /// Only set for toolbox drags.
    pub payload_type: Option<BlockType>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

/// Out-of-band data carried by the drag event itself.
///
/// The block type travels here rather than in controller state so it
/// survives a drop onto a different drop target than the one that saw the
/// drag start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferData {
    block_type: Option<String>,
}

impl TransferData {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_block_type(tag: impl Into<String>) -> Self {
        Self {
            block_type: Some(tag.into()),
        }
    }

    /// The carried block type tag; an empty tag counts as absent.
    pub fn block_type(&self) -> Option<&str> {
        self.block_type.as_deref().filter(|tag| !tag.is_empty())
    }
}

/// Everything a drop handler receives from the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DropEvent {
    pub transfer: TransferData,
    /// Cell the block landed on. A zero span means "no sized cell" and gets
    /// the default drop span.
    pub target: Option<Geometry>,
    /// Id the grid assigned to its dropping placeholder, if it reported one.
    pub placeholder: Option<ItemId>,
    /// Geometry the grid recomputed for every affected item.
    pub layout: Vec<GeometryPatch>,
}

impl DropEvent {
    pub fn toolbox(transfer: TransferData, target: Geometry) -> Self {
        Self {
            transfer,
            target: Some(target),
            ..Self::default()
        }
    }

    pub fn with_placeholder(mut self, id: impl Into<ItemId>) -> Self {
        self.placeholder = Some(id.into());
        self
    }

    pub fn reposition(layout: Vec<GeometryPatch>) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }
}

/// Why a drop ended without touching the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropIgnored {
    MissingBlockType,
    MissingGeometry,
    EmptyLayout,
}

/// What the editor should do with a drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropResolution {
    Create {
        tag: String,
        geometry: Geometry,
        placeholder: Option<ItemId>,
    },
    Reconcile(Vec<GeometryPatch>),
    Ignored(DropIgnored),
}

/// State machine over a single drag gesture: `Idle` to `Dragging` on start,
/// back to `Idle` on drop or cancel.
#[derive(Debug, Clone)]
pub struct DragController {
    state: DragState,
    drop_span: Span,
}

impl Default for DragController {
    fn default() -> Self {
        Self::new(Span::DEFAULT_DROP)
    }
}

impl DragController {
    pub fn new(drop_span: Span) -> Self {
        Self {
            state: DragState::Idle,
            drop_span,
        }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    /// Start dragging a palette entry. Returns the transfer data to attach
    /// to the drag event.
    pub fn begin_toolbox_drag(&mut self, block_type: BlockType) -> TransferData {
        self.state = DragState::Dragging(DragSession {
            source: DragSource::Toolbox,
            payload_type: Some(block_type),
        });
        TransferData::with_block_type(block_type.tag())
    }

    /// Start repositioning a placed block. Static blocks are never drag sources.
    pub fn begin_item_drag(&mut self, item: &LayoutItem) -> Result<TransferData> {
        if item.is_static {
            return Err(BuilderError::StaticItem(item.id.clone()));
        }
        self.state = DragState::Dragging(DragSession {
            source: DragSource::ExistingItem(item.id.clone()),
            payload_type: None,
        });
        Ok(TransferData::empty())
    }

    /// Resolve a drop and return to `Idle`.
    ///
    /// A drop without a recorded session is treated as a toolbox drop, since
    /// the transfer data may have come from a drag that started elsewhere.
    pub fn drop(&mut self, event: DropEvent) -> DropResolution {
        let session = match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        };

        if let Some(DragSession {
            source: DragSource::ExistingItem(_),
            ..
        }) = session
        {
            if event.layout.is_empty() {
                return DropResolution::Ignored(DropIgnored::EmptyLayout);
            }
            return DropResolution::Reconcile(event.layout);
        }

        let Some(tag) = event.transfer.block_type() else {
            return DropResolution::Ignored(DropIgnored::MissingBlockType);
        };
        let Some(target) = event.target else {
            return DropResolution::Ignored(DropIgnored::MissingGeometry);
        };

        let geometry = if target.w == 0 || target.h == 0 {
            Geometry::at(target.x, target.y, self.drop_span)
        } else {
            target
        };

        DropResolution::Create {
            tag: tag.to_string(),
            geometry,
            placeholder: event.placeholder,
        }
    }

    /// Abandon the gesture without any store mutation.
    pub fn cancel(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }
}
