use serde::{Deserialize, Serialize};

use crate::geometry::Geometry;

use super::ItemId;

/// Partial geometry update reported by the grid collaborator after a drag,
/// resize or breakpoint change.
///
/// Mirrors the grid's own item records: `i`, `x`, `y`, `w`, `h` and an
/// optional `static` flag. Any other keys the grid attaches are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryPatch {
    #[serde(rename = "i")]
    pub id: ItemId,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    #[serde(rename = "static", default, skip_serializing_if = "Option::is_none")]
    pub is_static: Option<bool>,
}

impl GeometryPatch {
    pub fn new(id: impl Into<ItemId>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            x: geometry.x,
            y: geometry.y,
            w: geometry.w,
            h: geometry.h,
            is_static: None,
        }
    }

    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = Some(is_static);
        self
    }

    pub fn geometry(&self) -> Geometry {
        Geometry::new(self.x, self.y, self.w, self.h).normalized()
    }
}
