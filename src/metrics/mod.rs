use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Counters for one editing session.
#[derive(Debug, Default, Clone)]
pub struct EditorMetrics {
    creates: u64,
    edits: u64,
    removals: u64,
    reconciles: u64,
    drops: u64,
    ignored_drops: u64,
    saves: u64,
    save_failures: u64,
}

impl EditorMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_create(&mut self) {
        self.creates = self.creates.saturating_add(1);
    }

    pub fn record_edit(&mut self) {
        self.edits = self.edits.saturating_add(1);
    }

    pub fn record_removal(&mut self) {
        self.removals = self.removals.saturating_add(1);
    }

    pub fn record_reconcile(&mut self) {
        self.reconciles = self.reconciles.saturating_add(1);
    }

    pub fn record_drop(&mut self, applied: bool) {
        self.drops = self.drops.saturating_add(1);
        if !applied {
            self.ignored_drops = self.ignored_drops.saturating_add(1);
        }
    }

    pub fn record_save(&mut self) {
        self.saves = self.saves.saturating_add(1);
    }

    pub fn record_save_failure(&mut self) {
        self.save_failures = self.save_failures.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            creates: self.creates,
            edits: self.edits,
            removals: self.removals,
            reconciles: self.reconciles,
            drops: self.drops,
            ignored_drops: self.ignored_drops,
            saves: self.saves,
            save_failures: self.save_failures,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub creates: u64,
    pub edits: u64,
    pub removals: u64,
    pub reconciles: u64,
    pub drops: u64,
    pub ignored_drops: u64,
    pub saves: u64,
    pub save_failures: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "editor_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("creates".to_string(), json!(self.creates));
        map.insert("edits".to_string(), json!(self.edits));
        map.insert("removals".to_string(), json!(self.removals));
        map.insert("reconciles".to_string(), json!(self.reconciles));
        map.insert("drops".to_string(), json!(self.drops));
        map.insert("ignored_drops".to_string(), json!(self.ignored_drops));
        map.insert("saves".to_string(), json!(self.saves));
        map.insert("save_failures".to_string(), json!(self.save_failures));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reflects_counters() {
        let mut metrics = EditorMetrics::new();
        metrics.record_create();
        metrics.record_drop(true);
        metrics.record_drop(false);
        metrics.record_save_failure();

        let snapshot = metrics.snapshot(Duration::from_millis(1500));
        assert_eq!(snapshot.creates, 1);
        assert_eq!(snapshot.drops, 2);
        assert_eq!(snapshot.ignored_drops, 1);
        assert_eq!(snapshot.save_failures, 1);

        let event = snapshot.to_log_event("page_builder::editor.metrics");
        assert_eq!(event.message, "editor_metrics");
        assert_eq!(event.field("uptime_ms"), Some(&json!(1500)));
    }
}
