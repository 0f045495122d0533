//! Layout engine for the page builder.
//!
//! Pages are composed of typed blocks placed on a responsive grid. This
//! crate owns the state side of that editor: the canonical layout store,
//! the block type registry, the editing protocol, the drag-and-drop
//! controller and assembly of the persistable page document. Painting
//! blocks and computing grid collisions are left to collaborators.

pub mod document;
pub mod drag;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod persistence;
pub mod registry;
pub mod store;

pub use document::{
    PageDocument, PageMetadata, SaveOutcome, SaveReport, SaveStatus, SaveTicket, SaveTracker,
    assemble,
};
pub use drag::{
    DEFAULT_CLICK_THRESHOLD, DragController, DragSession, DragSource, DragState, DropEvent,
    DropIgnored, DropResolution, PointerGesture, PointerTracker, TransferData,
};
pub use editor::{
    BufferedEditorAudit, Created, EditorAudit, EditorAuditEvent, EditorAuditEventBuilder,
    EditorAuditStage, EditorConfig, NullEditorAudit, PageEditor, ReconcileSummary,
};
pub use error::{BuilderError, Result};
pub use geometry::{Geometry, Span};
pub use layout::{GeometryPatch, ItemId, LayoutItem, StyleMap, StyleValue};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{EditorMetrics, MetricSnapshot};
pub use persistence::{JsonDirPersistence, MemoryPersistence, PagePersistence};
pub use registry::{
    BlockActions, BlockCapabilities, BlockRegistry, BlockRenderer, BlockType, ToolboxEntry,
};
pub use store::{EditOutcome, LayoutSnapshot, LayoutStore};
