//! Editing session audit hooks.
//!
//! Records capture a stage plus structured details so callers can buffer,
//! log or replay what happened to a page without instrumenting the editor.

use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use serde_json::Value;

/// Distinct checkpoints emitted by `PageEditor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAuditStage {
    /// A page document was loaded into the editor.
    PageLoaded,
    ItemCreated,
    ItemEdited,
    ItemRemoved,
    /// A geometry batch from the grid changed the layout.
    LayoutReconciled,
    PageEdited,
    /// A drop gesture finished, whether or not it changed anything.
    DropResolved,
    SaveRequested,
    SaveCompleted,
    SaveFailed,
}

#[derive(Debug, Clone)]
pub struct EditorAuditEvent {
    pub timestamp: SystemTime,
    pub stage: EditorAuditStage,
    pub details: Vec<(String, Value)>,
}

impl EditorAuditEvent {
    fn new(stage: EditorAuditStage) -> Self {
        Self {
            timestamp: SystemTime::now(),
            stage,
            details: Vec::new(),
        }
    }

    pub fn detail(&self, key: &str) -> Option<&Value> {
        self.details
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }
}

pub struct EditorAuditEventBuilder {
    event: EditorAuditEvent,
}

impl EditorAuditEventBuilder {
    pub fn new(stage: EditorAuditStage) -> Self {
        Self {
            event: EditorAuditEvent::new(stage),
        }
    }

    pub fn detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.event.details.push((key.into(), value.into()));
        self
    }

    pub fn finish(self) -> EditorAuditEvent {
        self.event
    }
}

pub trait EditorAudit: Send + Sync {
    fn record(&self, event: EditorAuditEvent);
}

/// Default sink when auditing is disabled.
#[derive(Debug, Default)]
pub struct NullEditorAudit;

impl EditorAudit for NullEditorAudit {
    fn record(&self, _event: EditorAuditEvent) {}
}

/// Collects events in memory. Clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct BufferedEditorAudit {
    events: Arc<Mutex<Vec<EditorAuditEvent>>>,
}

impl BufferedEditorAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<EditorAuditEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn stages(&self) -> Vec<EditorAuditStage> {
        self.events().into_iter().map(|event| event.stage).collect()
    }
}

impl EditorAudit for BufferedEditorAudit {
    fn record(&self, event: EditorAuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}
