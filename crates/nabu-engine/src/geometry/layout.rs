use std::fmt;

use crate::coords::Vec2;
use crate::paint::Rgba;

use super::{Quad, QuadVertex, Transform};

/// A requested width or height.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Dim {
    /// Explicit size in logical pixels, scaled by the aspect factor.
    Px(f32),
    /// Use the texture's native size.
    Undefined,
    /// Extend from the anchor to the screen edge. Top-left alignment only.
    Infinite,
}

/// What a draw anchor denotes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Align {
    /// The anchor is the shape's center.
    Centered,
    /// The anchor is the shape's top-left corner.
    TopLeft,
}

/// Why a request could not be laid out.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LayoutError {
    /// `Dim::Undefined` without a texture to take the size from.
    NoNativeSize,
    /// `Dim::Infinite` with centered alignment.
    InfiniteCentered,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::NoNativeSize => f.write_str("undefined size requested without a texture"),
            LayoutError::InfiniteCentered => f.write_str("infinite size cannot be centered"),
        }
    }
}

impl std::error::Error for LayoutError {}

/// A logical draw request.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Layout {
    pub anchor: Vec2,
    pub align: Align,
    pub width: Dim,
    pub height: Dim,
    /// Native texture size in texels; also becomes the bottom-right UV.
    pub native: Option<Vec2>,
    pub color: Rgba,
}

/// Resolves one axis to `(origin, extent)`.
fn resolve_axis(
    anchor: f32,
    dim: Dim,
    align: Align,
    aspect: f32,
    native: Option<f32>,
    screen: f32,
) -> Result<(f32, f32), LayoutError> {
    let extent = match dim {
        Dim::Px(v) => aspect * v,
        Dim::Undefined => aspect * native.ok_or(LayoutError::NoNativeSize)?,
        Dim::Infinite => match align {
            Align::Centered => return Err(LayoutError::InfiniteCentered),
            Align::TopLeft => screen - anchor,
        },
    };
    Ok(match align {
        Align::Centered => (anchor - extent / 2.0, extent),
        Align::TopLeft => (anchor, extent),
    })
}

/// Converts a request into an untranslated screen quad.
///
/// The vertical anchor goes through the shift first; infinite extents are
/// measured from the shifted anchor to `screen` and are not aspect scaled.
pub fn layout(req: &Layout, transform: &Transform, screen: Vec2) -> Result<Quad, LayoutError> {
    let anchor_y = transform.shift.apply(req.anchor.y);

    let (x, w) = resolve_axis(
        req.anchor.x,
        req.width,
        req.align,
        transform.aspect.x,
        req.native.map(|n| n.x),
        screen.x,
    )?;
    let (y, h) = resolve_axis(
        anchor_y,
        req.height,
        req.align,
        transform.aspect.y,
        req.native.map(|n| n.y),
        screen.y,
    )?;

    let br_uv = req.native.unwrap_or_default();
    Ok(Quad {
        ul: QuadVertex::new(Vec2::new(x, y), Vec2::zero()),
        br: QuadVertex::new(Vec2::new(x + w, y + h), br_uv),
        color: req.color,
    })
}
