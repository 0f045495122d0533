use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::drag::DEFAULT_CLICK_THRESHOLD;
use crate::geometry::Span;
use crate::logging::Logger;
use crate::metrics::EditorMetrics;

use super::audit::{EditorAudit, NullEditorAudit};

/// Knobs for a [`PageEditor`](super::PageEditor) session.
#[derive(Clone)]
pub struct EditorConfig {
    /// Press/release pairs shorter than this open block settings instead of dragging.
    pub click_threshold: Duration,
    /// Span given to toolbox drops that land outside a sized grid cell.
    pub default_drop_span: Span,
    /// Grid column count, forwarded to the grid collaborator untouched.
    pub columns: u32,
    /// Breakpoint active when the session starts.
    pub initial_breakpoint: String,
    /// Optional structured logger.
    pub logger: Option<Logger>,
    /// Metrics accumulator shared with the caller.
    pub metrics: Option<Arc<Mutex<EditorMetrics>>>,
    /// Target used when emitting metrics snapshots.
    pub metrics_target: String,
    pub audit: Arc<dyn EditorAudit>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            click_threshold: DEFAULT_CLICK_THRESHOLD,
            default_drop_span: Span::DEFAULT_DROP,
            columns: 12,
            initial_breakpoint: "lg".to_string(),
            logger: None,
            metrics: None,
            metrics_target: "page_builder::editor.metrics".to_string(),
            audit: Arc::new(NullEditorAudit),
        }
    }
}

impl EditorConfig {
    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(EditorMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<EditorMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_audit<A>(mut self, audit: A) -> Self
    where
        A: EditorAudit + 'static,
    {
        self.audit = Arc::new(audit);
        self
    }
}
