use std::collections::HashSet;
use std::sync::Arc;

use crate::layout::{ItemId, LayoutItem};

/// Immutable view of the layout handed to renderers. Never mutated after
/// publication; every store write publishes a new one.
pub type LayoutSnapshot = Arc<Vec<LayoutItem>>;

/// Result of an edit addressed by item id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// The target was already gone, typically removed by an earlier event.
    Missing,
}

/// Canonical collection of placed blocks for the page under edit.
///
/// Writes replace the whole collection (`replace`), so readers holding an
/// older snapshot never observe a half-updated item.
#[derive(Debug, Default)]
pub struct LayoutStore {
    snapshot: LayoutSnapshot,
    provisional: HashSet<ItemId>,
    retired: HashSet<ItemId>,
    revision: u64,
}

impl LayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store from a loaded layout, resetting all session state.
    ///
    /// Later records reusing an id already seen are dropped; their ids are
    /// returned so the caller can report them.
    pub fn load(&mut self, items: Vec<LayoutItem>) -> Vec<ItemId> {
        let mut seen = HashSet::with_capacity(items.len());
        let mut duplicates = Vec::new();
        let mut accepted = Vec::with_capacity(items.len());

        for mut item in items {
            if seen.insert(item.id.clone()) {
                item.geometry = item.geometry.normalized();
                accepted.push(item);
            } else {
                duplicates.push(item.id);
            }
        }

        self.provisional.clear();
        self.retired.clear();
        self.replace(accepted);
        duplicates
    }

    /// Current snapshot. Cheap to clone and safe to hold across writes.
    pub fn snapshot(&self) -> LayoutSnapshot {
        Arc::clone(&self.snapshot)
    }

    pub fn items(&self) -> &[LayoutItem] {
        &self.snapshot
    }

    pub fn get(&self, id: &str) -> Option<&LayoutItem> {
        self.snapshot.iter().find(|item| item.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.snapshot.iter().position(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }

    /// Incremented on every published snapshot.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether the item is a grid placeholder still waiting for its block type.
    pub fn is_provisional(&self, id: &str) -> bool {
        self.provisional.contains(id)
    }

    pub fn provisional_ids(&self) -> impl Iterator<Item = &ItemId> {
        self.provisional.iter()
    }

    /// Whether the id belonged to a removed item. Retired ids are never reissued.
    pub fn is_retired(&self, id: &str) -> bool {
        self.retired.contains(id)
    }

    pub(crate) fn replace(&mut self, items: Vec<LayoutItem>) {
        debug_assert!(
            {
                let mut ids = HashSet::with_capacity(items.len());
                items.iter().all(|item| ids.insert(item.id.as_str()))
            },
            "layout store must never hold duplicate ids"
        );
        self.snapshot = Arc::new(items);
        self.revision = self.revision.wrapping_add(1);
    }

    pub(crate) fn mark_provisional(&mut self, id: ItemId) {
        self.provisional.insert(id);
    }

    pub(crate) fn settle(&mut self, id: &str) -> bool {
        self.provisional.remove(id)
    }

    pub(crate) fn retire(&mut self, id: &str) {
        self.provisional.remove(id);
        self.retired.insert(id.to_string());
    }
}
