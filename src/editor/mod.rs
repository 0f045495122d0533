//! Editing session: the protocol operations plus the logging, metrics and
//! audit plumbing wrapped around them.

pub mod audit;
mod config;
pub mod protocol;
mod session;

pub use audit::{
    BufferedEditorAudit, EditorAudit, EditorAuditEvent, EditorAuditEventBuilder,
    EditorAuditStage, NullEditorAudit,
};
pub use config::EditorConfig;
pub use protocol::{Created, ReconcileSummary};
pub use session::PageEditor;
