use crate::coords::Vec2;
use crate::geometry::QuadVertex;
use crate::paint::Rgba;
use crate::vram::{PixelFormat, VramAddr};

/// Alpha blend equation selected per primitive.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BlendMode {
    /// Default painter's-order blending of source over destination.
    BackToFront,
    /// Source alpha taken from the primitive (texture alpha or color alpha).
    /// Selected for 32-bit textures and flat rectangles.
    SourceAlpha,
}

/// Where a resident palette lives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ClutBinding {
    pub addr: VramAddr,
    pub format: PixelFormat,
}

/// Everything the rasterizer needs to sample a resident texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TexBinding {
    pub addr: VramAddr,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Row stride in 64-pixel units.
    pub buffer_width: u32,
    pub clut: Option<ClutBinding>,
}

/// A single queued draw primitive, already in final screen space.
///
/// `order` is the draw-order value; without a depth buffer it only documents
/// the submission sequence.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Primitive {
    /// Axis-aligned textured rectangle between two corners.
    Sprite {
        tex: TexBinding,
        ul: QuadVertex,
        br: QuadVertex,
        order: u32,
        color: Rgba,
    },
    /// Textured quad with four free corners in strip order (ul, ur, bl, br).
    TexturedQuad {
        tex: TexBinding,
        corners: [QuadVertex; 4],
        order: u32,
        color: Rgba,
    },
    /// Flat-colored quad, corners in strip order (ul, ur, bl, br).
    Quad {
        corners: [Vec2; 4],
        order: u32,
        color: Rgba,
    },
    Line {
        from: Vec2,
        to: Vec2,
        order: u32,
        color: Rgba,
    },
}

impl Primitive {
    #[inline]
    pub fn order(&self) -> u32 {
        match self {
            Primitive::Sprite { order, .. }
            | Primitive::TexturedQuad { order, .. }
            | Primitive::Quad { order, .. }
            | Primitive::Line { order, .. } => *order,
        }
    }

    #[inline]
    pub fn texture(&self) -> Option<&TexBinding> {
        match self {
            Primitive::Sprite { tex, .. } | Primitive::TexturedQuad { tex, .. } => Some(tex),
            Primitive::Quad { .. } | Primitive::Line { .. } => None,
        }
    }
}

/// How the rasterizer should interpret transferred data.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TransferKind {
    /// Palette entries for a CLUT.
    Palette,
    /// Direct-color texels.
    Direct,
    /// Palette indices of a CLUT-backed texture.
    Indexed,
}

/// A VRAM upload request.
#[derive(Debug, Copy, Clone)]
pub struct Transfer<'a> {
    pub data: &'a [u8],
    pub addr: VramAddr,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Row stride in 64-pixel units.
    pub buffer_width: u32,
    pub kind: TransferKind,
}
