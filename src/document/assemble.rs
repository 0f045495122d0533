use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{BuilderError, Result};
use crate::layout::{LayoutItem, StyleMap, StyleValue};

/// Page-level fields edited through the settings form.
///
/// Keys the engine does not model (for example the server-side page id)
/// are carried through untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub route: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub style: StyleMap,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageMetadata {
    pub fn new(name: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            route: route.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    pub(crate) fn apply_edit(&mut self, field: &str, value: Value, is_style: bool) -> Result<()> {
        if is_style {
            match StyleValue::from_json(field, value)? {
                Some(style) => {
                    self.style.insert(field.to_string(), style);
                }
                None => {
                    self.style.remove(field);
                }
            }
            return Ok(());
        }

        match field {
            "layout" => return Err(BuilderError::ImmutableField(field.to_string())),
            "name" => self.name = text(field, value)?,
            "route" => self.route = text(field, value)?,
            "status" => self.status = text(field, value)?,
            "style" => {
                self.style = serde_json::from_value(value)
                    .map_err(|err| BuilderError::invalid_value(field, err.to_string()))?
            }
            _ => {
                self.extra.insert(field.to_string(), value);
            }
        }
        Ok(())
    }
}

fn text(field: &str, value: Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(BuilderError::invalid_value(
            field,
            format!("expected a string, got {other}"),
        )),
    }
}

/// The persistable page: metadata plus the ordered layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    #[serde(flatten)]
    pub metadata: PageMetadata,
    #[serde(default)]
    pub layout: Vec<LayoutItem>,
}

impl PageDocument {
    /// Content hash of the serialized document, used to detect unsaved edits.
    pub fn fingerprint(&self) -> Result<blake3::Hash> {
        let bytes = serde_json::to_vec(self)?;
        Ok(blake3::hash(&bytes))
    }
}

/// Combine page metadata with a layout snapshot. The document owns copies of
/// both, so later edits never reach an assembled document.
pub fn assemble(metadata: &PageMetadata, layout: &[LayoutItem]) -> PageDocument {
    PageDocument {
        metadata: metadata.clone(),
        layout: layout.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Geometry;
    use crate::registry::BlockType;
    use serde_json::json;

    #[test]
    fn assemble_spreads_metadata_next_to_layout() {
        let item = LayoutItem::new("a", BlockType::Image, Geometry::new(2, 1, 1, 2));
        let doc = assemble(&PageMetadata::new("Home", "/"), std::slice::from_ref(&item));

        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["name"], json!("Home"));
        assert_eq!(value["route"], json!("/"));
        assert_eq!(value["layout"][0]["i"], json!("a"));
        assert_eq!(value["layout"][0]["type"], json!("image"));
        assert_eq!(doc.layout, vec![item]);
    }

    #[test]
    fn documents_round_trip_through_json() {
        let mut metadata = PageMetadata::new("Blog", "/blog").with_status("draft");
        metadata.style.insert("background".into(), "#fff".into());
        metadata.extra.insert("id".into(), json!(42));
        let layout = vec![
            LayoutItem::new("a", BlockType::Header, Geometry::new(0, 0, 12, 1)).with_content("Hi"),
            LayoutItem::new("b", BlockType::Default, Geometry::new(0, 1, 6, 3)).with_static(true),
        ];
        let doc = assemble(&metadata, &layout);

        let raw = serde_json::to_string(&doc).unwrap();
        let loaded: PageDocument = serde_json::from_str(&raw).unwrap();
        assert_eq!(loaded, doc);
        assert_eq!(loaded.metadata.extra.get("id"), Some(&json!(42)));
        assert!(!loaded.metadata.extra.contains_key("layout"));
    }

    #[test]
    fn fingerprint_tracks_content() {
        let metadata = PageMetadata::new("Home", "/");
        let doc = assemble(&metadata, &[]);
        let same = assemble(&metadata, &[]);
        let other = assemble(&PageMetadata::new("Home", "/home"), &[]);
        assert_eq!(doc.fingerprint().unwrap(), same.fingerprint().unwrap());
        assert_ne!(doc.fingerprint().unwrap(), other.fingerprint().unwrap());
    }

    #[test]
    fn metadata_edits_are_typed() {
        let mut metadata = PageMetadata::new("Home", "/");
        metadata.apply_edit("status", json!("published"), false).unwrap();
        metadata.apply_edit("height", json!("100%"), true).unwrap();
        metadata.apply_edit("author", json!("ops"), false).unwrap();
        assert_eq!(metadata.status, "published");
        assert_eq!(metadata.style.get("height"), Some(&"100%".into()));
        assert_eq!(metadata.extra.get("author"), Some(&json!("ops")));

        assert!(metadata.apply_edit("name", json!(7), false).is_err());
        assert!(matches!(
            metadata.apply_edit("layout", json!([]), false),
            Err(BuilderError::ImmutableField(_))
        ));
    }
}
