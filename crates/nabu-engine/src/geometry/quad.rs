use crate::coords::{Rect, Vec2};
use crate::paint::Rgba;

/// A quad corner: screen position plus texel coordinate.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct QuadVertex {
    pub pos: Vec2,
    pub uv: Vec2,
}

impl QuadVertex {
    #[inline]
    pub const fn new(pos: Vec2, uv: Vec2) -> Self {
        Self { pos, uv }
    }
}

/// Axis-aligned screen quad between an upper-left and a bottom-right corner.
///
/// UVs are in texels; untextured quads carry zero UVs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Quad {
    pub ul: QuadVertex,
    pub br: QuadVertex,
    pub color: Rgba,
}

impl Quad {
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect { min: self.ul.pos, max: self.br.pos }
    }

    /// Copy with both corners moved by `offset`; UVs are unchanged.
    #[inline]
    pub fn translated(mut self, offset: Vec2) -> Quad {
        self.ul.pos = self.ul.pos + offset;
        self.br.pos = self.br.pos + offset;
        self
    }

    /// Corner positions in strip order (ul, ur, bl, br).
    pub fn corners(&self) -> [Vec2; 4] {
        let (ul, br) = (self.ul.pos, self.br.pos);
        [ul, Vec2::new(br.x, ul.y), Vec2::new(ul.x, br.y), br]
    }
}
