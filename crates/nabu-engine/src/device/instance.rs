//! CPU-side encoding of queued primitives into GPU instances.

use bytemuck::{Pod, Zeroable};

use crate::coords::Vec2;
use crate::geometry::QuadVertex;
use crate::gs::{BlendMode, Primitive, TexBinding};
use crate::paint::Rgba;

/// Sample texels from VRAM.
pub(super) const FLAG_TEXTURED: u32 = 1;
/// Take alpha from the texel as well as the primitive color.
pub(super) const FLAG_TEX_ALPHA: u32 = 2;

/// Half the rasterized width of a line, in screen pixels.
const LINE_HALF_WIDTH: f32 = 0.5;

/// One quad, four corners in strip order (ul, ur, bl, br).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub(super) struct PrimInstance {
    pub p01: [f32; 4],
    pub p23: [f32; 4],
    pub uv01: [f32; 4],
    pub uv23: [f32; 4],
    pub color: [f32; 4],
    /// `(addr, width, height, format)`
    pub tex: [u32; 4],
    /// `(clut addr, clut format, flags, 0)`
    pub clut: [u32; 4],
}

impl PrimInstance {
    const ATTRS: [wgpu::VertexAttribute; 7] = wgpu::vertex_attr_array![
        0 => Float32x4, // p01
        1 => Float32x4, // p23
        2 => Float32x4, // uv01
        3 => Float32x4, // uv23
        4 => Float32x4, // color
        5 => Uint32x4,  // tex
        6 => Uint32x4   // clut
    ];

    pub(super) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<PrimInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }

    fn quad(pos: [Vec2; 4], uv: [Vec2; 4], color: [f32; 4], tex: [u32; 4], clut: [u32; 4]) -> Self {
        Self {
            p01: [pos[0].x, pos[0].y, pos[1].x, pos[1].y],
            p23: [pos[2].x, pos[2].y, pos[3].x, pos[3].y],
            uv01: [uv[0].x, uv[0].y, uv[1].x, uv[1].y],
            uv23: [uv[2].x, uv[2].y, uv[3].x, uv[3].y],
            color,
            tex,
            clut,
        }
    }
}

/// Textured primitives modulate with `0x80` as identity; flat ones use the
/// full byte range. Alpha is `0x80`-based in both cases.
fn color_of(c: Rgba, textured: bool) -> [f32; 4] {
    let scale = if textured { 128.0 } else { 255.0 };
    [
        c.r as f32 / scale,
        c.g as f32 / scale,
        c.b as f32 / scale,
        c.opacity(),
    ]
}

fn tex_words(tex: &TexBinding, blend: BlendMode) -> ([u32; 4], [u32; 4]) {
    let mut flags = FLAG_TEXTURED;
    if blend == BlendMode::SourceAlpha {
        flags |= FLAG_TEX_ALPHA;
    }
    let (clut_addr, clut_format) = match tex.clut {
        Some(c) => (c.addr.get(), u32::from(c.format.hw_id())),
        None => (0, 0),
    };
    (
        [tex.addr.get(), tex.width, tex.height, u32::from(tex.format.hw_id())],
        [clut_addr, clut_format, flags, 0],
    )
}

fn split(vertices: [QuadVertex; 4]) -> ([Vec2; 4], [Vec2; 4]) {
    (vertices.map(|v| v.pos), vertices.map(|v| v.uv))
}

/// Encodes `prim` under the blend mode that was active when it was queued.
pub(super) fn encode(prim: &Primitive, blend: BlendMode) -> PrimInstance {
    let (t, c) = prim.texture().map_or(([0; 4], [0; 4]), |tex| tex_words(tex, blend));
    match *prim {
        Primitive::Sprite { ul, br, color, .. } => {
            let ur = QuadVertex::new(Vec2::new(br.pos.x, ul.pos.y), Vec2::new(br.uv.x, ul.uv.y));
            let bl = QuadVertex::new(Vec2::new(ul.pos.x, br.pos.y), Vec2::new(ul.uv.x, br.uv.y));
            let (pos, uv) = split([ul, ur, bl, br]);
            PrimInstance::quad(pos, uv, color_of(color, true), t, c)
        }
        Primitive::TexturedQuad { corners, color, .. } => {
            let (pos, uv) = split(corners);
            PrimInstance::quad(pos, uv, color_of(color, true), t, c)
        }
        Primitive::Quad { corners, color, .. } => {
            PrimInstance::quad(corners, [Vec2::zero(); 4], color_of(color, false), t, c)
        }
        Primitive::Line { from, to, color, .. } => {
            let d = to - from;
            let len = (d.x * d.x + d.y * d.y).sqrt();
            let n = if len > 0.0 {
                Vec2::new(-d.y / len, d.x / len) * LINE_HALF_WIDTH
            } else {
                Vec2::new(0.0, LINE_HALF_WIDTH)
            };
            let pos = [from - n, to - n, from + n, to + n];
            PrimInstance::quad(pos, [Vec2::zero(); 4], color_of(color, false), t, c)
        }
    }
}
