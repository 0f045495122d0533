//! Editing protocol: the only operations that change a [`LayoutStore`].
//!
//! Every operation reads the latest snapshot, edits a private copy and
//! publishes the copy as the next snapshot.

use std::collections::HashMap;

use serde_json::Value;
use uuid::Uuid;

use crate::error::Result;
use crate::geometry::Geometry;
use crate::layout::{GeometryPatch, ItemId, LayoutItem};
use crate::registry::BlockType;
use crate::store::{EditOutcome, LayoutStore};

/// What a `create` did with the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Created {
    /// A new item was appended.
    Appended(ItemId),
    /// A provisional grid placeholder was filled in place.
    FilledPlaceholder(ItemId),
}

impl Created {
    pub fn id(&self) -> &ItemId {
        match self {
            Self::Appended(id) | Self::FilledPlaceholder(id) => id,
        }
    }

    pub fn into_id(self) -> ItemId {
        match self {
            Self::Appended(id) | Self::FilledPlaceholder(id) => id,
        }
    }
}

/// Per-batch accounting for `reconcile_layout`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Existing items whose geometry changed.
    pub updated: Vec<ItemId>,
    /// Unknown ids now held as provisional items.
    pub provisional: Vec<ItemId>,
    /// Patches addressed to removed items.
    pub ignored: Vec<ItemId>,
}

impl ReconcileSummary {
    pub fn is_noop(&self) -> bool {
        self.updated.is_empty() && self.provisional.is_empty()
    }
}

/// Place a new block.
///
/// When `placeholder` names a provisional item, that item is overwritten
/// with the new block and keeps its id. A placeholder id that is unknown and
/// was never retired becomes the id of the appended block; otherwise a fresh
/// id is generated.
pub fn create(
    store: &mut LayoutStore,
    block_type: BlockType,
    geometry: Geometry,
    placeholder: Option<&str>,
) -> Created {
    let placeholder = placeholder.filter(|pending| !pending.is_empty());
    let mut next = store.items().to_vec();

    if let Some(pending) = placeholder {
        if store.is_provisional(pending) {
            if let Some(index) = store.position(pending) {
                next[index] = LayoutItem::new(pending, block_type, geometry);
                store.replace(next);
                store.settle(pending);
                return Created::FilledPlaceholder(pending.to_string());
            }
        }
    }

    let id = match placeholder {
        Some(pending) if !store.contains(pending) && !store.is_retired(pending) => {
            pending.to_string()
        }
        _ => fresh_id(store),
    };

    next.push(LayoutItem::new(id.clone(), block_type, geometry));
    store.replace(next);
    Created::Appended(id)
}

/// Set one field on the item `id`.
///
/// Style fields land in `style[field]`; everything else is a top-level
/// field. An absent id is a no-op. A rejected value leaves the store as it was.
pub fn edit_field(
    store: &mut LayoutStore,
    id: &str,
    field: &str,
    value: Value,
    is_style: bool,
) -> Result<EditOutcome> {
    let Some(index) = store.position(id) else {
        return Ok(EditOutcome::Missing);
    };

    let mut next = store.items().to_vec();
    next[index].apply_edit(field, value, is_style)?;
    store.replace(next);

    if !is_style && field == "type" {
        store.settle(id);
    }
    Ok(EditOutcome::Applied)
}

/// Remove the item `id`. Idempotent; returns whether anything was removed.
pub fn remove(store: &mut LayoutStore, id: &str) -> bool {
    if !store.contains(id) {
        return false;
    }

    let next: Vec<LayoutItem> = store
        .items()
        .iter()
        .filter(|item| item.id != id)
        .cloned()
        .collect();
    store.replace(next);
    store.retire(id);
    true
}

/// Merge a batch of grid geometry patches, keyed by id.
///
/// Existing items keep their position in the sequence and every non-geometry
/// field. Items the batch does not mention are left untouched. Unknown ids are
/// held as provisional items appended in patch order; ids of removed items
/// are ignored so a late grid report cannot resurrect them.
pub fn reconcile_layout(store: &mut LayoutStore, patches: &[GeometryPatch]) -> ReconcileSummary {
    let mut summary = ReconcileSummary::default();
    if patches.is_empty() {
        return summary;
    }

    let mut next = store.items().to_vec();
    let mut index: HashMap<ItemId, usize> = next
        .iter()
        .enumerate()
        .map(|(position, item)| (item.id.clone(), position))
        .collect();

    for patch in patches {
        if let Some(&position) = index.get(&patch.id) {
            if next[position].apply_patch(patch) && !summary.updated.contains(&patch.id) {
                summary.updated.push(patch.id.clone());
            }
        } else if store.is_retired(&patch.id) {
            summary.ignored.push(patch.id.clone());
        } else {
            next.push(LayoutItem::provisional(patch));
            index.insert(patch.id.clone(), next.len() - 1);
            summary.provisional.push(patch.id.clone());
        }
    }

    if summary.is_noop() {
        return summary;
    }

    store.replace(next);
    for id in &summary.provisional {
        store.mark_provisional(id.clone());
    }
    summary
}

/// Drop a provisional item whose drop gesture never completed.
pub fn discard_provisional(store: &mut LayoutStore, id: &str) -> bool {
    store.is_provisional(id) && remove(store, id)
}

fn fresh_id(store: &LayoutStore) -> ItemId {
    loop {
        let id = Uuid::new_v4().to_string();
        if !store.contains(&id) && !store.is_retired(&id) {
            return id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::StyleValue;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn store_with(items: Vec<LayoutItem>) -> LayoutStore {
        let mut store = LayoutStore::new();
        store.load(items);
        store
    }

    fn image(id: &str) -> LayoutItem {
        LayoutItem::new(id, BlockType::Image, Geometry::new(0, 0, 2, 2)).with_content("foo")
    }

    fn assert_unique_ids(store: &LayoutStore) {
        let mut ids = HashSet::new();
        for item in store.items() {
            assert!(ids.insert(item.id.clone()), "duplicate id {}", item.id);
        }
    }

    #[test]
    fn create_appends_blank_block() {
        let mut store = LayoutStore::new();
        let created = create(&mut store, BlockType::Video, Geometry::new(0, 0, 4, 3), None);

        assert!(matches!(created, Created::Appended(_)));
        assert_eq!(store.len(), 1);
        let item = store.get(created.id()).unwrap();
        assert_eq!(item.block_type, BlockType::Video);
        assert_eq!(item.geometry, Geometry::new(0, 0, 4, 3));
        assert!(item.style.is_empty());
        assert_eq!(item.content, json!(""));
    }

    #[test]
    fn create_fills_provisional_placeholder_in_place() {
        let mut store = store_with(vec![image("a")]);
        let summary = reconcile_layout(
            &mut store,
            &[GeometryPatch::new("drop", Geometry::new(2, 1, 1, 2))],
        );
        assert_eq!(summary.provisional, vec!["drop".to_string()]);
        assert!(store.is_provisional("drop"));
        assert_eq!(store.get("drop").unwrap().block_type, BlockType::Default);

        let created = create(
            &mut store,
            BlockType::Image,
            Geometry::new(2, 1, 1, 2),
            Some("drop"),
        );

        assert_eq!(created, Created::FilledPlaceholder("drop".to_string()));
        assert_eq!(store.len(), 2);
        assert_eq!(store.items()[1].block_type, BlockType::Image);
        assert!(!store.is_provisional("drop"));
    }

    #[test]
    fn create_never_reuses_ids() {
        let mut store = store_with(vec![image("a")]);
        remove(&mut store, "a");

        let reused = create(&mut store, BlockType::Text, Geometry::default(), Some("a"));
        assert_ne!(reused.id(), "a");

        let clash = create(&mut store, BlockType::Text, Geometry::default(), Some(reused.id()));
        assert_ne!(clash.id(), reused.id());
        assert_unique_ids(&store);
    }

    #[test]
    fn create_adopts_unused_placeholder_id() {
        let mut store = LayoutStore::new();
        let created = create(&mut store, BlockType::Header, Geometry::default(), Some("fresh"));
        assert_eq!(created, Created::Appended("fresh".to_string()));
    }

    #[test]
    fn edit_field_is_copy_on_write() {
        let mut store = store_with(vec![image("a"), image("b")]);
        let before = store.snapshot();

        let outcome = edit_field(&mut store, "b", "content", json!("bar"), false).unwrap();

        assert_eq!(outcome, EditOutcome::Applied);
        assert_eq!(store.get("b").unwrap().content, json!("bar"));
        assert_eq!(before[1].content, json!("foo"));
        assert!(!Arc::ptr_eq(&before, &store.snapshot()));
        let mut expected = image("b");
        expected.content = json!("bar");
        assert_eq!(store.get("b").unwrap(), &expected);
    }

    #[test]
    fn edit_field_on_missing_id_is_noop() {
        let mut store = store_with(vec![image("a")]);
        let revision = store.revision();
        let outcome = edit_field(&mut store, "zzz", "content", json!("x"), false).unwrap();
        assert_eq!(outcome, EditOutcome::Missing);
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn rejected_edit_leaves_store_untouched() {
        let mut store = store_with(vec![image("a")]);
        let revision = store.revision();
        assert!(edit_field(&mut store, "a", "i", json!("b"), false).is_err());
        assert!(edit_field(&mut store, "a", "w", json!(-1), false).is_err());
        assert_eq!(store.revision(), revision);
        assert_eq!(store.get("a").unwrap(), &image("a"));
    }

    #[test]
    fn style_edit_targets_style_map() {
        let mut store = store_with(vec![image("a")]);
        edit_field(&mut store, "a", "width", json!(300), true).unwrap();
        let item = store.get("a").unwrap();
        assert_eq!(item.style.get("width"), Some(&StyleValue::from(300i64)));
        assert!(item.extra.is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = store_with(vec![image("a"), image("b"), image("c")]);
        assert!(remove(&mut store, "b"));
        let once: Vec<_> = store.items().to_vec();
        assert!(!remove(&mut store, "b"));
        assert_eq!(store.items(), once.as_slice());
        let ids: Vec<_> = store.items().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn reconcile_merges_geometry_only() {
        let mut store = store_with(vec![image("a")]);
        let summary = reconcile_layout(
            &mut store,
            &[GeometryPatch::new("a", Geometry::new(5, 1, 2, 2))],
        );
        assert_eq!(summary.updated, vec!["a".to_string()]);
        let item = store.get("a").unwrap();
        assert_eq!(item.geometry, Geometry::new(5, 1, 2, 2));
        assert_eq!(item.block_type, BlockType::Image);
        assert_eq!(item.content, json!("foo"));
    }

    #[test]
    fn reconcile_is_keyed_by_id_not_order() {
        let mut store = store_with(vec![image("a"), image("b"), image("c")]);
        reconcile_layout(
            &mut store,
            &[
                GeometryPatch::new("c", Geometry::new(0, 4, 2, 2)),
                GeometryPatch::new("a", Geometry::new(3, 0, 2, 2)),
            ],
        );
        let ids: Vec<_> = store.items().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(store.get("a").unwrap().geometry.x, 3);
        assert_eq!(store.get("b").unwrap().geometry, Geometry::new(0, 0, 2, 2));
        assert_eq!(store.get("c").unwrap().geometry.y, 4);
    }

    #[test]
    fn reconcile_ignores_retired_and_empty_batches() {
        let mut store = store_with(vec![image("a"), image("b")]);
        remove(&mut store, "b");
        let revision = store.revision();

        assert!(reconcile_layout(&mut store, &[]).is_noop());
        let summary = reconcile_layout(
            &mut store,
            &[GeometryPatch::new("b", Geometry::new(1, 1, 1, 1))],
        );
        assert_eq!(summary.ignored, vec!["b".to_string()]);
        assert!(!store.contains("b"));
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn discard_only_touches_provisional_items() {
        let mut store = store_with(vec![image("a")]);
        reconcile_layout(&mut store, &[GeometryPatch::new("p", Geometry::default())]);
        assert!(!discard_provisional(&mut store, "a"));
        assert!(discard_provisional(&mut store, "p"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ids_stay_unique_across_mixed_sequences() {
        let mut store = LayoutStore::new();
        let mut ids = Vec::new();
        for round in 0..20u32 {
            let created = create(
                &mut store,
                BlockType::PLACEABLE[(round % 5) as usize],
                Geometry::new(round % 12, round, 1, 2),
                if round % 3 == 0 { Some("drop") } else { None },
            );
            ids.push(created.into_id());
            if round % 4 == 1 {
                remove(&mut store, &ids[(round / 2) as usize]);
            }
            let patches: Vec<_> = ids
                .iter()
                .map(|id| GeometryPatch::new(id.clone(), Geometry::new(round, 0, 1, 1)))
                .chain(std::iter::once(GeometryPatch::new(
                    format!("ghost-{round}"),
                    Geometry::default(),
                )))
                .collect();
            reconcile_layout(&mut store, &patches);
            edit_field(&mut store, &ids[0], "content", json!(round), false).unwrap();
            assert_unique_ids(&store);
        }
    }
}
