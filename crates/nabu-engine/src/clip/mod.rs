//! Rectangular clipping of screen quads.

use crate::coords::Rect;
use crate::geometry::Quad;

/// Active clip region. `None` disables clipping.
pub type ClipRect = Option<Rect>;

/// Clips `quad` against `clip`.
///
/// Returns `None` when the quad and the clip region share no area (touching
/// edges included). Otherwise every edge crossing the region is pulled in and
/// its UV moved by the same fraction of the quad's texel span.
pub fn clip_quad(quad: Quad, clip: ClipRect) -> Option<Quad> {
    let Some(clip) = clip else {
        return Some(quad);
    };
    if !quad.bounds().overlaps(clip) {
        return None;
    }

    let mut q = quad;
    let dx = q.br.pos.x - q.ul.pos.x;
    let dy = q.br.pos.y - q.ul.pos.y;
    let du = if dx != 0.0 { (q.br.uv.x - q.ul.uv.x) / dx } else { 0.0 };
    let dv = if dy != 0.0 { (q.br.uv.y - q.ul.uv.y) / dy } else { 0.0 };

    if q.ul.pos.x < clip.min.x {
        q.ul.uv.x += (clip.min.x - q.ul.pos.x) * du;
        q.ul.pos.x = clip.min.x;
    }
    if q.ul.pos.y < clip.min.y {
        q.ul.uv.y += (clip.min.y - q.ul.pos.y) * dv;
        q.ul.pos.y = clip.min.y;
    }
    if q.br.pos.x > clip.max.x {
        q.br.uv.x -= (q.br.pos.x - clip.max.x) * du;
        q.br.pos.x = clip.max.x;
    }
    if q.br.pos.y > clip.max.y {
        q.br.uv.y -= (q.br.pos.y - clip.max.y) * dv;
        q.br.pos.y = clip.max.y;
    }

    Some(q)
}
