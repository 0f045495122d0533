use serde::{Deserialize, Serialize};

/// Cell span of a block on the page grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub w: u32,
    pub h: u32,
}

impl Span {
    /// Footprint used when a block is dropped outside any grid cell.
    pub const DEFAULT_DROP: Span = Span { w: 1, h: 2 };

    pub const fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::DEFAULT_DROP
    }
}

/// Grid cell placement of a block: origin cell plus span.
///
/// Coordinates are opaque to the engine; they are stored and forwarded
/// exactly as the grid collaborator reports them, apart from clamping spans
/// to at least one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Geometry {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Place a block of the given span at cell `(x, y)`.
    pub const fn at(x: u32, y: u32, span: Span) -> Self {
        Self::new(x, y, span.w, span.h)
    }

    pub fn span(&self) -> Span {
        Span::new(self.w, self.h)
    }

    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.w)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }

    /// Clamp the span so every block covers at least one cell.
    pub fn normalized(self) -> Self {
        Self {
            w: self.w.max(1),
            h: self.h.max(1),
            ..self
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::at(0, 0, Span::DEFAULT_DROP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_geometry_uses_drop_span() {
        let geometry = Geometry::default();
        assert_eq!(geometry, Geometry::new(0, 0, 1, 2));
    }

    #[test]
    fn normalized_clamps_zero_spans() {
        let geometry = Geometry::new(3, 4, 0, 0).normalized();
        assert_eq!(geometry, Geometry::new(3, 4, 1, 1));
        assert_eq!(geometry.right(), 4);
        assert_eq!(geometry.bottom(), 5);
    }
}
