use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::document::{
    PageDocument, PageMetadata, SaveReport, SaveStatus, SaveTicket, SaveTracker, assemble,
};
use crate::drag::{
    DragController, DragSession, DragState, DropEvent, DropResolution, PointerGesture,
    PointerTracker, TransferData,
};
use crate::error::{BuilderError, Result};
use crate::geometry::Geometry;
use crate::layout::{GeometryPatch, ItemId};
use crate::logging::{LogLevel, event_with_fields, json_kv};
use crate::metrics::{EditorMetrics, MetricSnapshot};
use crate::persistence::PagePersistence;
use crate::registry::{BlockActions, BlockRegistry, ToolboxEntry};
use crate::store::{EditOutcome, LayoutSnapshot, LayoutStore};

use super::audit::{EditorAuditEventBuilder, EditorAuditStage};
use super::config::EditorConfig;
use super::protocol::{self, Created, ReconcileSummary};

const LOG_TARGET: &str = "page_builder::editor";

type Fields = Vec<(String, Value)>;

/// One editing session over a single page.
///
/// Page metadata and the layout store are held separately because they
/// change at different cadences: metadata through the settings form, the
/// layout through drag and drop. They only meet again in [`assemble`].
/// Every mutation takes `&mut self` and runs to completion, so successive
/// snapshots are causally ordered.
pub struct PageEditor {
    page_id: String,
    metadata: Arc<PageMetadata>,
    store: LayoutStore,
    registry: BlockRegistry,
    drag: DragController,
    pointer: PointerTracker,
    saves: SaveTracker,
    breakpoint: String,
    config: EditorConfig,
    started_at: Instant,
}

impl PageEditor {
    pub fn new(page_id: impl Into<String>, config: EditorConfig) -> Self {
        Self {
            page_id: page_id.into(),
            metadata: Arc::new(PageMetadata::default()),
            store: LayoutStore::new(),
            registry: BlockRegistry::new(),
            drag: DragController::new(config.default_drop_span),
            pointer: PointerTracker::new(config.click_threshold),
            saves: SaveTracker::new(),
            breakpoint: config.initial_breakpoint.clone(),
            config,
            started_at: Instant::now(),
        }
    }

    pub fn with_registry(mut self, registry: BlockRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn page_id(&self) -> &str {
        &self.page_id
    }

    pub fn metadata(&self) -> Arc<PageMetadata> {
        Arc::clone(&self.metadata)
    }

    /// Read-only layout snapshot for rendering.
    pub fn snapshot(&self) -> LayoutSnapshot {
        self.store.snapshot()
    }

    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut BlockRegistry {
        &mut self.registry
    }

    pub fn toolbox(&self) -> Vec<ToolboxEntry> {
        self.registry.toolbox()
    }

    pub fn breakpoint(&self) -> &str {
        &self.breakpoint
    }

    pub fn columns(&self) -> u32 {
        self.config.columns
    }

    pub fn drag_state(&self) -> &DragState {
        self.drag.state()
    }

    pub fn save_status(&self) -> &SaveStatus {
        self.saves.status()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Seed the session from a loaded document, replacing all prior state.
    pub fn load_document(&mut self, document: PageDocument) {
        let PageDocument { metadata, layout } = document;
        let duplicates = self.store.load(layout);
        self.metadata = Arc::new(metadata);
        self.drag.cancel();

        for id in &duplicates {
            self.log(
                LogLevel::Warn,
                "duplicate_item_dropped",
                vec![json_kv("id", id.as_str())],
            );
        }

        match self.assemble().fingerprint() {
            Ok(fingerprint) => self.saves.mark_loaded(fingerprint),
            Err(err) => self.log(
                LogLevel::Warn,
                "fingerprint_failed",
                vec![json_kv("error", err.to_string())],
            ),
        }

        self.instrument(
            LogLevel::Info,
            "page_loaded",
            EditorAuditStage::PageLoaded,
            vec![
                json_kv("page", self.page_id.as_str()),
                json_kv("items", self.store.len()),
                json_kv("duplicates", duplicates.len()),
            ],
        );
    }

    /// Fetch this session's page from `persistence` and load it.
    pub fn load_from(&mut self, persistence: &dyn PagePersistence) -> Result<()> {
        let document = persistence.load(&self.page_id)?;
        self.load_document(document);
        Ok(())
    }

    /// Place a new block. Without geometry the block gets the default drop
    /// span at the grid origin; unknown tags become default text blocks.
    pub fn create(&mut self, tag: &str, geometry: Option<Geometry>) -> ItemId {
        self.create_block(tag, geometry, None)
    }

    /// Place a block for a grid drop, filling the grid's placeholder if the
    /// store already holds it.
    pub fn create_for_placeholder(
        &mut self,
        tag: &str,
        geometry: Option<Geometry>,
        placeholder: &str,
    ) -> ItemId {
        self.create_block(tag, geometry, Some(placeholder))
    }

    fn create_block(
        &mut self,
        tag: &str,
        geometry: Option<Geometry>,
        placeholder: Option<&str>,
    ) -> ItemId {
        let block_type = self.registry.resolve(tag);
        let geometry =
            geometry.unwrap_or_else(|| Geometry::at(0, 0, self.config.default_drop_span));
        let created = protocol::create(&mut self.store, block_type, geometry, placeholder);
        let filled = matches!(created, Created::FilledPlaceholder(_));
        let id = created.into_id();

        self.record_metric(EditorMetrics::record_create);
        self.instrument(
            LogLevel::Debug,
            "item_created",
            EditorAuditStage::ItemCreated,
            vec![
                json_kv("id", id.as_str()),
                json_kv("type", block_type.tag()),
                json_kv("filled_placeholder", filled),
            ],
        );
        id
    }

    /// Set one field on an item. A `type` tag is resolved through this
    /// session's registry, so withdrawn types become default blocks.
    pub fn edit_field(
        &mut self,
        id: &str,
        field: &str,
        value: Value,
        is_style: bool,
    ) -> Result<EditOutcome> {
        let value = match value {
            Value::String(tag) if !is_style && field == "type" => {
                Value::from(self.registry.resolve(&tag).tag())
            }
            other => other,
        };

        let outcome = protocol::edit_field(&mut self.store, id, field, value, is_style)
            .inspect_err(|err| {
                self.log(
                    LogLevel::Warn,
                    "item_edit_rejected",
                    vec![
                        json_kv("id", id),
                        json_kv("field", field),
                        json_kv("error", err.to_string()),
                    ],
                );
            })?;

        match outcome {
            EditOutcome::Applied => {
                self.record_metric(EditorMetrics::record_edit);
                self.instrument(
                    LogLevel::Debug,
                    "item_edited",
                    EditorAuditStage::ItemEdited,
                    vec![
                        json_kv("id", id),
                        json_kv("field", field),
                        json_kv("style", is_style),
                    ],
                );
            }
            EditOutcome::Missing => {
                self.log(LogLevel::Trace, "item_edit_skipped", vec![json_kv("id", id)]);
            }
        }
        Ok(outcome)
    }

    /// Edit one page-level field with the same copy-on-write rules as items.
    pub fn edit_page_field(&mut self, field: &str, value: Value, is_style: bool) -> Result<()> {
        let mut next = PageMetadata::clone(&self.metadata);
        next.apply_edit(field, value, is_style)?;
        self.metadata = Arc::new(next);

        self.instrument(
            LogLevel::Debug,
            "page_edited",
            EditorAuditStage::PageEdited,
            vec![json_kv("field", field), json_kv("style", is_style)],
        );
        Ok(())
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let removed = protocol::remove(&mut self.store, id);
        if removed {
            self.record_metric(EditorMetrics::record_removal);
            self.instrument(
                LogLevel::Debug,
                "item_removed",
                EditorAuditStage::ItemRemoved,
                vec![json_kv("id", id)],
            );
        }
        removed
    }

    pub fn reconcile_layout(&mut self, patches: &[GeometryPatch]) -> ReconcileSummary {
        let summary = protocol::reconcile_layout(&mut self.store, patches);
        if summary.is_noop() {
            return summary;
        }

        self.record_metric(EditorMetrics::record_reconcile);
        self.instrument(
            LogLevel::Debug,
            "layout_reconciled",
            EditorAuditStage::LayoutReconciled,
            vec![
                json_kv("updated", summary.updated.len()),
                json_kv("provisional", summary.provisional.clone()),
                json_kv("ignored", summary.ignored.len()),
            ],
        );
        summary
    }

    /// Record the grid's new breakpoint and merge the geometry it recomputed.
    pub fn on_breakpoint_change(
        &mut self,
        breakpoint: impl Into<String>,
        patches: &[GeometryPatch],
    ) -> ReconcileSummary {
        self.breakpoint = breakpoint.into();
        self.log(
            LogLevel::Debug,
            "breakpoint_changed",
            vec![json_kv("breakpoint", self.breakpoint.as_str())],
        );
        self.reconcile_layout(patches)
    }

    pub fn begin_toolbox_drag(&mut self, tag: &str) -> TransferData {
        let block_type = self.registry.resolve(tag);
        self.drag.begin_toolbox_drag(block_type)
    }

    pub fn begin_item_drag(&mut self, id: &str) -> Result<TransferData> {
        let item = self
            .store
            .get(id)
            .ok_or_else(|| BuilderError::ItemNotFound(id.to_string()))?;
        self.drag.begin_item_drag(item)
    }

    /// Resolve a drop and apply it to the store.
    ///
    /// A drop that places a block or is ignored ends the gesture, so any
    /// placeholder the grid reported and that was not filled is discarded.
    pub fn drop(&mut self, event: DropEvent) -> DropResolution {
        let resolution = self.drag.drop(event);

        let applied = match &resolution {
            DropResolution::Create {
                tag,
                geometry,
                placeholder,
            } => {
                self.create_block(tag, Some(*geometry), placeholder.as_deref());
                true
            }
            DropResolution::Reconcile(patches) => {
                self.reconcile_layout(patches);
                true
            }
            DropResolution::Ignored(reason) => {
                self.log(
                    LogLevel::Debug,
                    "drop_ignored",
                    vec![json_kv("reason", format!("{reason:?}"))],
                );
                false
            }
        };
        if !matches!(resolution, DropResolution::Reconcile(_)) {
            self.discard_placeholders();
        }

        self.record_metric(|metrics| metrics.record_drop(applied));
        self.instrument(
            LogLevel::Trace,
            "drop_resolved",
            EditorAuditStage::DropResolved,
            vec![json_kv("applied", applied)],
        );
        resolution
    }

    /// Abandon the current gesture. Placeholders the grid already reported
    /// for it are discarded.
    pub fn cancel_drag(&mut self) -> Option<DragSession> {
        let session = self.drag.cancel();
        self.discard_placeholders();
        session
    }

    fn discard_placeholders(&mut self) {
        let mut pending: Vec<ItemId> = self.store.provisional_ids().cloned().collect();
        pending.sort_unstable();
        for id in pending {
            if protocol::discard_provisional(&mut self.store, &id) {
                self.log(
                    LogLevel::Debug,
                    "placeholder_discarded",
                    vec![json_kv("id", id)],
                );
            }
        }
    }

    pub fn pointer_down(&mut self, at: Instant) {
        self.pointer.pointer_down(at);
    }

    pub fn pointer_up(&mut self, at: Instant) -> Option<PointerGesture> {
        self.pointer.pointer_up(at)
    }

    /// Render every block that has a registered renderer, in layout order.
    pub fn render(&self) -> Vec<(ItemId, String)> {
        self.store
            .items()
            .iter()
            .filter_map(|item| {
                self.registry
                    .renderer_for(item.block_type)
                    .map(|renderer| (item.id.clone(), renderer.render(item)))
            })
            .collect()
    }

    /// Forward an operator interaction to the block's renderer, which may
    /// call back into the editor through [`BlockActions`].
    pub fn dispatch_block_input(&mut self, id: &str, input: &Value) -> Result<()> {
        let Some(item) = self.store.get(id).cloned() else {
            return Ok(());
        };
        let Some(renderer) = self.registry.renderer_for(item.block_type) else {
            return Ok(());
        };
        renderer.on_input(&item, input, self)
    }

    pub fn assemble(&self) -> PageDocument {
        assemble(&self.metadata, self.store.items())
    }

    /// Assemble the current page and submit it. Returns immediately; the
    /// outcome arrives later through [`PageEditor::complete_save`].
    pub fn save(&mut self, persistence: &mut dyn PagePersistence) -> Result<SaveTicket> {
        let document = self.assemble();
        let ticket = self.saves.begin(document.fingerprint()?);

        self.record_metric(EditorMetrics::record_save);
        self.instrument(
            LogLevel::Info,
            "save_requested",
            EditorAuditStage::SaveRequested,
            vec![
                json_kv("ticket", ticket.get()),
                json_kv("items", document.layout.len()),
            ],
        );

        if let Err(err) = persistence.submit(&self.page_id, ticket, document) {
            self.complete_save(SaveReport::failed(ticket, err.to_string()));
        }
        Ok(ticket)
    }

    /// Record a save response. Never touches the layout.
    pub fn complete_save(&mut self, report: SaveReport) -> bool {
        let ticket = report.ticket;
        let failure = report.outcome.as_ref().err().cloned();
        if !self.saves.complete(report) {
            return false;
        }

        match failure {
            None => self.instrument(
                LogLevel::Info,
                "save_completed",
                EditorAuditStage::SaveCompleted,
                vec![json_kv("ticket", ticket.get())],
            ),
            Some(message) => {
                self.record_metric(EditorMetrics::record_save_failure);
                self.instrument(
                    LogLevel::Error,
                    "save_failed",
                    EditorAuditStage::SaveFailed,
                    vec![json_kv("ticket", ticket.get()), json_kv("error", message)],
                );
            }
        }
        true
    }

    /// Apply every response the collaborator has ready. Returns how many
    /// were accepted.
    pub fn poll_saves(&mut self, persistence: &mut dyn PagePersistence) -> usize {
        let mut accepted = 0;
        for report in persistence.poll_reports() {
            if self.complete_save(report) {
                accepted += 1;
            }
        }
        accepted
    }

    /// Whether the page differs from the last document persisted or loaded.
    pub fn has_unsaved_changes(&self) -> bool {
        match self.assemble().fingerprint() {
            Ok(fingerprint) => !self.saves.is_saved(&fingerprint),
            Err(_) => true,
        }
    }

    pub fn metrics_snapshot(&self) -> Option<MetricSnapshot> {
        let metrics = self.config.metrics.as_ref()?;
        let guard = metrics.lock().ok()?;
        Some(guard.snapshot(self.started_at.elapsed()))
    }

    /// Emit the current metrics snapshot through the configured logger.
    pub fn emit_metrics(&self) {
        if let (Some(logger), Some(snapshot)) =
            (self.config.logger.as_ref(), self.metrics_snapshot())
        {
            let _ = logger.log_event(snapshot.to_log_event(&self.config.metrics_target));
        }
    }

    /// Audit `stage` and log `message` with the same fields.
    fn instrument(&self, level: LogLevel, message: &str, stage: EditorAuditStage, fields: Fields) {
        let event = fields
            .iter()
            .cloned()
            .fold(EditorAuditEventBuilder::new(stage), |builder, (key, value)| {
                builder.detail(key, value)
            })
            .finish();
        self.config.audit.record(event);
        self.log(level, message, fields);
    }

    fn log(&self, level: LogLevel, message: &str, fields: Fields) {
        if let Some(logger) = self.config.logger.as_ref() {
            if logger.enabled(level) {
                let _ = logger.log_event(event_with_fields(level, LOG_TARGET, message, fields));
            }
        }
    }

    fn record_metric<F>(&self, record: F)
    where
        F: FnOnce(&mut EditorMetrics),
    {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut guard);
            }
        }
    }
}

impl BlockActions for PageEditor {
    fn edit_field(
        &mut self,
        id: &str,
        field: &str,
        value: Value,
        is_style: bool,
    ) -> Result<EditOutcome> {
        PageEditor::edit_field(self, id, field, value, is_style)
    }

    fn remove_item(&mut self, id: &str) -> bool {
        self.remove(id)
    }

    fn add_nested_item(&mut self, block_type: &str, element: &GeometryPatch) -> ItemId {
        self.create_block(block_type, Some(element.geometry()), Some(&element.id))
    }
}
