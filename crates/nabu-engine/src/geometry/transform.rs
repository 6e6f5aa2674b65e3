use crate::coords::Vec2;

/// Vertical position mapping applied to anchors before placement.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum VerticalShift {
    Identity,
    /// `y * factor`, truncated toward zero to a whole pixel.
    Linear(f32),
}

impl VerticalShift {
    #[inline]
    pub fn apply(self, y: f32) -> f32 {
        match self {
            VerticalShift::Identity => y,
            VerticalShift::Linear(factor) => (factor * y) as i32 as f32,
        }
    }
}

impl Default for VerticalShift {
    fn default() -> Self {
        VerticalShift::Linear(1.0)
    }
}

/// Global draw transform: aspect scale for sizes, vertical shift for
/// anchors, and a translation applied after clipping.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub aspect: Vec2,
    pub shift: VerticalShift,
    pub translation: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            aspect: Vec2::new(1.0, 1.0),
            shift: VerticalShift::default(),
            translation: Vec2::zero(),
        }
    }
}
