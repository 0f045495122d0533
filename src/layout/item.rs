use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::error::{BuilderError, Result};
use crate::geometry::Geometry;
use crate::layout::GeometryPatch;
use crate::registry::BlockType;

/// Opaque, session-unique identifier of a placed block (`i` on the wire).
pub type ItemId = String;

/// Style property bag owned by a single item or page.
///
/// Ordered so serialized documents are byte-stable, which the save
/// fingerprint relies on.
pub type StyleMap = BTreeMap<String, StyleValue>;

/// A single style property value: either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(Number),
    Text(String),
}

impl StyleValue {
    /// Convert an editor-supplied JSON value. `null` maps to `None`, meaning
    /// "unset this property".
    pub fn from_json(field: &str, value: Value) -> Result<Option<Self>> {
        match value {
            Value::Null => Ok(None),
            Value::Number(n) => Ok(Some(Self::Number(n))),
            Value::String(s) => Ok(Some(Self::Text(s))),
            other => Err(BuilderError::invalid_value(
                field,
                format!("style values must be strings or numbers, got {other}"),
            )),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

impl From<&str> for StyleValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for StyleValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

/// One positioned, typed block on the page grid.
///
/// Serializes to the grid's item record (`i`, `x`, `y`, `w`, `h`, `static?`)
/// extended with `type?`, `style` and `content`. Top-level keys written by
/// block renderers that the engine does not model are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutItem {
    #[serde(rename = "i")]
    pub id: ItemId,
    #[serde(flatten)]
    pub geometry: Geometry,
    #[serde(rename = "static", default, skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(rename = "type", default, skip_serializing_if = "BlockType::is_default")]
    pub block_type: BlockType,
    #[serde(default)]
    pub style: StyleMap,
    #[serde(default = "empty_content")]
    pub content: Value,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LayoutItem {
    /// Fresh block as produced by a create: empty style, empty content.
    pub fn new(id: impl Into<ItemId>, block_type: BlockType, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            geometry: geometry.normalized(),
            is_static: false,
            block_type,
            style: StyleMap::new(),
            content: empty_content(),
            extra: Map::new(),
        }
    }

    /// Placeholder held for a grid-reported id whose block type is not known yet.
    pub fn provisional(patch: &GeometryPatch) -> Self {
        let mut item = Self::new(patch.id.clone(), BlockType::Default, patch.geometry());
        item.is_static = patch.is_static.unwrap_or(false);
        item
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    pub fn with_content(mut self, content: impl Into<Value>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_style(mut self, key: impl Into<String>, value: impl Into<StyleValue>) -> Self {
        self.style.insert(key.into(), value.into());
        self
    }

    /// Shallow-merge grid geometry onto this item. Returns whether anything changed.
    pub(crate) fn apply_patch(&mut self, patch: &GeometryPatch) -> bool {
        let geometry = patch.geometry();
        let is_static = patch.is_static.unwrap_or(self.is_static);
        let changed = geometry != self.geometry || is_static != self.is_static;
        self.geometry = geometry;
        self.is_static = is_static;
        changed
    }

    /// Write a single field. Callers edit a private copy so a failed write
    /// never reaches a published snapshot.
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
            "i" => return Err(BuilderError::ImmutableField(field.to_string())),
            "content" => self.content = value,
            "type" => {
                self.block_type = match value {
                    Value::String(tag) => BlockType::from_tag(&tag),
                    Value::Null => BlockType::Default,
                    other => {
                        return Err(BuilderError::invalid_value(
                            field,
                            format!("expected a block type tag, got {other}"),
                        ));
                    }
                }
            }
            "static" => {
                self.is_static = value.as_bool().ok_or_else(|| {
                    BuilderError::invalid_value(field, format!("expected a boolean, got {value}"))
                })?
            }
            "style" => {
                self.style = serde_json::from_value(value)
                    .map_err(|err| BuilderError::invalid_value(field, err.to_string()))?
            }
            "x" => self.geometry.x = grid_cells(field, &value)?,
            "y" => self.geometry.y = grid_cells(field, &value)?,
            "w" => self.geometry.w = grid_cells(field, &value)?.max(1),
            "h" => self.geometry.h = grid_cells(field, &value)?.max(1),
            _ => {
                self.extra.insert(field.to_string(), value);
            }
        }
        Ok(())
    }

    /// Read a top-level field back in its wire form.
    pub fn field(&self, field: &str) -> Option<Value> {
        match field {
            "i" => Some(Value::String(self.id.clone())),
            "x" => Some(self.geometry.x.into()),
            "y" => Some(self.geometry.y.into()),
            "w" => Some(self.geometry.w.into()),
            "h" => Some(self.geometry.h.into()),
            "static" => Some(self.is_static.into()),
            "type" => Some(self.block_type.tag().into()),
            "content" => Some(self.content.clone()),
            "style" => serde_json::to_value(&self.style).ok(),
            other => self.extra.get(other).cloned(),
        }
    }
}

fn grid_cells(field: &str, value: &Value) -> Result<u32> {
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| {
            BuilderError::invalid_value(field, format!("expected a grid cell count, got {value}"))
        })
}

fn empty_content() -> Value {
    Value::String(String::new())
}

fn is_false(value: &bool) -> bool {
    !*value
}
