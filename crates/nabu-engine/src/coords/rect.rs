use super::Vec2;

/// Axis-aligned rectangle in screen pixels, stored as its two corner edges.
///
/// `min` is the top-left corner and `max` the bottom-right one. Constructors
/// normalize so that `min <= max` on both axes.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    /// Rectangle from a top-left position and a size.
    #[inline]
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self::from_edges(x, y, x + w, y + h)
    }

    /// Rectangle from its left, top, right and bottom edges.
    #[inline]
    pub fn from_edges(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            min: Vec2::new(x0.min(x1), y0.min(y1)),
            max: Vec2::new(x0.max(x1), y0.max(y1)),
        }
    }

    #[inline]
    pub fn width(self) -> f32 {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(self) -> f32 {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Returns `true` when the two rectangles share a non-zero area.
    #[inline]
    pub fn overlaps(self, other: Rect) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}
