use crate::clip::clip_quad;
use crate::coords::{Rect, Vec2};
use crate::geometry::{layout, Align, Dim, Layout, Quad, QuadVertex, Transform, VerticalShift};
use crate::gs::{BlendMode, ClutBinding, GsBackend, Primitive, TexBinding};
use crate::paint::Rgba;
use crate::texture::TextureId;
use crate::vram::{buffer_width, PixelFormat};

use super::Renderer;

impl<B: GsBackend> Renderer<B> {
    // ── primitives ────────────────────────────────────────────────────────

    /// Draws a texture anchored at `(x, y)`.
    ///
    /// Returns `false` when nothing was submitted (clipped away, bad layout,
    /// or the texture could not be made resident).
    #[allow(clippy::too_many_arguments)]
    pub fn draw_pixmap(&mut self, tex: TextureId, x: f32, y: f32, align: Align, w: Dim, h: Dim, color: Rgba) -> bool {
        match self.layout_pixmap(tex, x, y, align, w, h, color) {
            Some(quad) => self.draw_quad(tex, quad),
            None => false,
        }
    }

    /// Draws `inlay` warped into four corners relative to the overlay's
    /// top-left, then the overlay on top of it.
    ///
    /// `corners` are in strip order (ul, ur, bl, br); their x offsets are
    /// aspect scaled. The inlay is not clipped. If it cannot be prepared the
    /// whole call is skipped. Returns whether the overlay itself was drawn.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_overlay_pixmap(
        &mut self,
        overlay: TextureId,
        x: f32,
        y: f32,
        align: Align,
        w: Dim,
        h: Dim,
        color: Rgba,
        inlay: TextureId,
        corners: [Vec2; 4],
    ) -> bool {
        let Some(quad) = self.layout_pixmap(overlay, x, y, align, w, h, color) else {
            return false;
        };
        let Some(binding) = self.bind_texture(inlay) else {
            return false;
        };

        let origin = quad.ul.pos + self.transform.translation;
        let (tw, th) = (binding.width as f32, binding.height as f32);
        let uvs = [Vec2::zero(), Vec2::new(tw, 0.0), Vec2::new(0.0, th), Vec2::new(tw, th)];
        let aspect = Vec2::new(self.transform.aspect.x, 1.0);
        let warped = std::array::from_fn(|i| QuadVertex::new(origin + corners[i].scale(aspect), uvs[i]));

        if binding.format == PixelFormat::Ct32 {
            self.backend.set_blend(BlendMode::SourceAlpha);
        }
        let order = self.frame.next_order();
        self.backend.submit(Primitive::TexturedQuad {
            tex: binding,
            corners: warped,
            order,
            color: Rgba::DEFAULT,
        });
        self.backend.set_blend(BlendMode::BackToFront);

        self.draw_quad(overlay, quad)
    }

    /// Draws a flat, alpha-blended rectangle. Clipped like pixmaps.
    pub fn draw_rect(&mut self, x: f32, y: f32, align: Align, w: Dim, h: Dim, color: Rgba) -> bool {
        let req = Layout { anchor: Vec2::new(x, y), align, width: w, height: h, native: None, color };
        let quad = match layout(&req, &self.transform, self.screen_size()) {
            Ok(quad) => quad,
            Err(e) => {
                log::trace!("rect skipped: {e}");
                return false;
            }
        };
        let Some(quad) = clip_quad(quad, self.clip) else {
            return false;
        };
        let quad = quad.translated(self.transform.translation);

        self.backend.set_blend(BlendMode::SourceAlpha);
        let order = self.frame.next_order();
        self.backend.submit(Primitive::Quad { corners: quad.corners(), order, color });
        self.backend.set_blend(BlendMode::BackToFront);
        true
    }

    /// Draws a line. Endpoints go through the vertical shift and translation;
    /// lines are never clipped.
    pub fn draw_line(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba) {
        let t = self.transform.translation;
        let shift = self.transform.shift;
        let from = Vec2::new(x0, shift.apply(y0)) + t;
        let to = Vec2::new(x1, shift.apply(y1)) + t;
        let order = self.frame.next_order();
        self.backend.submit(Primitive::Line { from, to, order, color });
    }

    // ── clip ──────────────────────────────────────────────────────────────

    /// Restricts pixmaps and rects to a screen rectangle.
    ///
    /// A non-`Px` width or height extends the region to the screen edge.
    pub fn set_clip(&mut self, x: f32, y: f32, w: Dim, h: Dim) {
        let (sw, sh) = (self.screen_size().x, self.screen_size().y);
        let x1 = match w {
            Dim::Px(w) => x + w,
            Dim::Undefined | Dim::Infinite => sw,
        };
        let y1 = match h {
            Dim::Px(h) => y + h,
            Dim::Undefined | Dim::Infinite => sh,
        };
        self.clip = Some(Rect::from_edges(x, y, x1, y1));
    }

    pub fn clear_clip(&mut self) {
        self.clip = None;
    }

    #[inline]
    pub fn clip(&self) -> Option<Rect> {
        self.clip
    }

    // ── transform ─────────────────────────────────────────────────────────

    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        self.transform.aspect = Vec2::new(width, height);
    }

    pub fn reset_aspect_ratio(&mut self) {
        self.transform.aspect = Vec2::new(1.0, 1.0);
    }

    #[inline]
    pub fn aspect_ratio(&self) -> (f32, f32) {
        (self.transform.aspect.x, self.transform.aspect.y)
    }

    /// Scales vertical anchors by `ratio`, truncated to whole pixels.
    pub fn set_vertical_shift(&mut self, ratio: f32) {
        self.transform.shift = VerticalShift::Linear(ratio);
    }

    pub fn reset_vertical_shift(&mut self) {
        self.transform.shift = VerticalShift::Identity;
    }

    /// Offset added to every primitive after clipping.
    pub fn set_translation(&mut self, x: f32, y: f32) {
        self.transform.translation = Vec2::new(x, y);
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    // ── internals ─────────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    fn layout_pixmap(&self, tex: TextureId, x: f32, y: f32, align: Align, w: Dim, h: Dim, color: Rgba) -> Option<Quad> {
        let Some(texture) = self.store.texture(tex) else {
            log::trace!("pixmap skipped: unknown texture {tex:?}");
            return None;
        };
        let req = Layout {
            anchor: Vec2::new(x, y),
            align,
            width: w,
            height: h,
            native: Some(Vec2::new(texture.width() as f32, texture.height() as f32)),
            color,
        };
        match layout(&req, &self.transform, self.screen_size()) {
            Ok(quad) => Some(quad),
            Err(e) => {
                log::trace!("pixmap {tex:?} skipped: {e}");
                None
            }
        }
    }

    /// Clip, prepare, submit. Translation is applied after clipping.
    fn draw_quad(&mut self, tex: TextureId, quad: Quad) -> bool {
        let Some(quad) = clip_quad(quad, self.clip) else {
            return false;
        };
        let Some(binding) = self.bind_texture(tex) else {
            return false;
        };

        let clut_ct32 = binding.clut.is_some_and(|c| c.format == PixelFormat::Ct32);
        if binding.format == PixelFormat::Ct32 || clut_ct32 {
            self.backend.set_blend(BlendMode::SourceAlpha);
        }

        let quad = quad.translated(self.transform.translation);
        let order = self.frame.next_order();
        self.backend.submit(Primitive::Sprite {
            tex: binding,
            ul: quad.ul,
            br: quad.br,
            order,
            color: quad.color,
        });
        self.backend.set_blend(BlendMode::BackToFront);
        true
    }

    /// Prepares `tex` and describes where it now lives.
    fn bind_texture(&mut self, tex: TextureId) -> Option<TexBinding> {
        if !self.prepare_texture(tex) {
            return None;
        }
        let texture = self.store.texture(tex)?;
        let addr = texture.vram().addr()?;
        let clut = match texture.clut() {
            Some(id) => Some(ClutBinding {
                addr: texture.vram_clut().addr()?,
                format: self.store.clut(id)?.color(),
            }),
            None => None,
        };
        Some(TexBinding {
            addr,
            width: texture.width(),
            height: texture.height(),
            format: texture.format(),
            buffer_width: buffer_width(texture.width(), texture.format()),
            clut,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gs::{GsCall, RecordingBackend};
    use crate::render::RenderInit;
    use crate::texture::{Clut, Texture};
    use crate::vram::{VramAddr, VramSlot};

    fn renderer() -> Renderer<RecordingBackend> {
        let mut r = Renderer::new(RecordingBackend::new(), RenderInit { vsync: false, ..RenderInit::default() });
        r.reset_vertical_shift();
        r.backend_mut().take_calls();
        r
    }

    fn ct32(r: &mut Renderer<RecordingBackend>, w: u32, h: u32) -> TextureId {
        let tex = Texture::new(w, h, PixelFormat::Ct32, vec![0; (w * h * 4) as usize]).unwrap();
        r.textures_mut().insert_texture(tex)
    }

    fn t4_ct16(r: &mut Renderer<RecordingBackend>, w: u32, h: u32) -> TextureId {
        let clut = r
            .textures_mut()
            .insert_clut(Clut::new(PixelFormat::T4, PixelFormat::Ct16, vec![0; 32]).unwrap());
        let tex = Texture::new(w, h, PixelFormat::T4, vec![0; (w * h / 2) as usize]).unwrap();
        r.textures_mut().insert_texture(tex.with_clut(clut))
    }

    fn px(v: f32) -> Dim {
        Dim::Px(v)
    }

    fn submitted(r: &Renderer<RecordingBackend>) -> Vec<Primitive> {
        r.backend().submitted().copied().collect()
    }

    // ── order ─────────────────────────────────────────────────────────────

    #[test]
    fn three_draws_take_orders_zero_to_two() {
        let mut r = renderer();
        let tex = ct32(&mut r, 8, 8);
        r.start_frame();
        assert!(r.draw_pixmap(tex, 10.0, 10.0, Align::TopLeft, Dim::Undefined, Dim::Undefined, Rgba::DEFAULT));
        assert!(r.draw_rect(0.0, 0.0, Align::TopLeft, px(4.0), px(4.0), Rgba::DARKER));
        r.draw_line(0.0, 0.0, 5.0, 5.0, Rgba::WHITE);

        let orders: Vec<_> = submitted(&r).iter().map(Primitive::order).collect();
        assert_eq!(orders, vec![0, 1, 2]);
    }

    #[test]
    fn midframe_flush_dispatches_queued_draws_and_keeps_order() {
        let mut r = Renderer::new(RecordingBackend::with_vram(4096), RenderInit { vsync: false, ..RenderInit::default() });
        r.backend_mut().take_calls();
        let first = ct32(&mut r, 32, 24); // 3072 bytes
        let second = ct32(&mut r, 16, 20); // 1280 bytes, only fits after a flush

        assert!(r.draw_pixmap(first, 0.0, 0.0, Align::TopLeft, Dim::Undefined, Dim::Undefined, Rgba::DEFAULT));
        assert!(r.draw_pixmap(second, 64.0, 0.0, Align::TopLeft, Dim::Undefined, Dim::Undefined, Rgba::DEFAULT));

        let orders: Vec<_> = submitted(&r).iter().map(Primitive::order).collect();
        assert_eq!(orders, vec![0, 1]);

        let calls = r.backend().calls();
        let submits: Vec<_> = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, GsCall::Submit(_)))
            .map(|(i, _)| i)
            .collect();
        let dispatch = r.backend().position(|c| *c == GsCall::Dispatch).unwrap();
        assert!(submits[0] < dispatch && dispatch < submits[1]);
        let second_upload = calls
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, GsCall::Transfer(_)))
            .nth(1)
            .map(|(i, _)| i)
            .unwrap();
        assert!(dispatch < second_upload);

        assert_eq!(r.textures().texture(first).unwrap().vram(), VramSlot::Unset);
        assert_eq!(r.textures().texture(second).unwrap().vram(), VramSlot::Resident(VramAddr(0)));
        assert_eq!(r.vram().epoch(), 1);
    }

    #[test]
    fn start_frame_restarts_order() {
        let mut r = renderer();
        r.draw_line(0.0, 0.0, 1.0, 1.0, Rgba::WHITE);
        r.start_frame();
        r.backend_mut().take_calls();
        r.draw_line(0.0, 0.0, 1.0, 1.0, Rgba::WHITE);
        assert_eq!(submitted(&r)[0].order(), 0);
    }

    // ── pixmaps ───────────────────────────────────────────────────────────

    #[test]
    fn ct32_pixmap_switches_to_source_alpha_and_back() {
        let mut r = renderer();
        let tex = ct32(&mut r, 8, 8);
        r.draw_pixmap(tex, 0.0, 0.0, Align::TopLeft, Dim::Undefined, Dim::Undefined, Rgba::DEFAULT);

        let calls: Vec<_> = r
            .backend()
            .calls()
            .iter()
            .filter(|c| matches!(c, GsCall::SetBlend(_) | GsCall::Submit(_)))
            .cloned()
            .collect();
        assert!(matches!(
            calls.as_slice(),
            [
                GsCall::SetBlend(BlendMode::SourceAlpha),
                GsCall::Submit(Primitive::Sprite { .. }),
                GsCall::SetBlend(BlendMode::BackToFront),
            ]
        ));
    }

    #[test]
    fn indexed_ct16_pixmap_keeps_default_blend() {
        let mut r = renderer();
        let tex = t4_ct16(&mut r, 16, 16);
        assert!(r.draw_pixmap(tex, 0.0, 0.0, Align::TopLeft, Dim::Undefined, Dim::Undefined, Rgba::DEFAULT));
        assert_eq!(r.backend().count(|c| *c == GsCall::SetBlend(BlendMode::SourceAlpha)), 0);

        let Primitive::Sprite { tex: binding, .. } = submitted(&r)[0] else {
            panic!("expected a sprite");
        };
        let clut = binding.clut.unwrap();
        assert_eq!(clut.format, PixelFormat::Ct16);
        assert_eq!(clut.addr, VramAddr(0));
        assert_eq!(binding.addr, VramAddr(256));
        assert_eq!(binding.buffer_width, 2);
    }

    #[test]
    fn translation_is_applied_after_clipping() {
        let mut r = renderer();
        let tex = ct32(&mut r, 20, 20);
        r.set_clip(0.0, 0.0, px(100.0), px(100.0));
        r.set_translation(5.0, 5.0);
        r.draw_pixmap(tex, 90.0, 10.0, Align::TopLeft, Dim::Undefined, Dim::Undefined, Rgba::DEFAULT);

        let Primitive::Sprite { ul, br, .. } = submitted(&r)[0] else {
            panic!("expected a sprite");
        };
        assert_eq!(ul.pos, Vec2::new(95.0, 15.0));
        assert_eq!(br.pos, Vec2::new(105.0, 35.0));
        assert_eq!(br.uv, Vec2::new(10.0, 20.0));
    }

    #[test]
    fn clipped_away_pixmap_uploads_nothing() {
        let mut r = renderer();
        let tex = ct32(&mut r, 8, 8);
        r.set_clip(0.0, 0.0, px(50.0), px(50.0));
        assert!(!r.draw_pixmap(tex, 200.0, 200.0, Align::TopLeft, Dim::Undefined, Dim::Undefined, Rgba::DEFAULT));
        assert!(r.backend().calls().is_empty());
        assert_eq!(r.frame().order(), 0);

        r.clear_clip();
        assert!(r.draw_pixmap(tex, 200.0, 200.0, Align::TopLeft, Dim::Undefined, Dim::Undefined, Rgba::DEFAULT));
    }

    #[test]
    fn unpreparable_pixmap_is_skipped() {
        let mut r = renderer();
        let huge = ct32(&mut r, 1024, 1024); // the whole default pool
        assert!(!r.draw_pixmap(huge, 0.0, 0.0, Align::TopLeft, Dim::Undefined, Dim::Undefined, Rgba::DEFAULT));
        assert_eq!(r.backend().submitted().count(), 0);
        assert_eq!(r.frame().order(), 0);
    }

    #[test]
    fn centered_pixmap_layout() {
        let mut r = renderer();
        let tex = ct32(&mut r, 64, 32);
        r.draw_pixmap(tex, 100.0, 100.0, Align::Centered, Dim::Undefined, Dim::Undefined, Rgba::DEFAULT);
        let Primitive::Sprite { ul, br, .. } = submitted(&r)[0] else {
            panic!("expected a sprite");
        };
        assert_eq!((ul.pos, br.pos), (Vec2::new(68.0, 84.0), Vec2::new(132.0, 116.0)));
    }

    // ── overlay ───────────────────────────────────────────────────────────

    #[test]
    fn overlay_draws_warped_inlay_then_overlay() {
        let mut r = renderer();
        let overlay = ct32(&mut r, 32, 32);
        let inlay = t4_ct16(&mut r, 16, 8);
        r.set_aspect_ratio(0.5, 1.0);
        r.set_translation(1.0, 2.0);

        let corners = [Vec2::new(4.0, 4.0), Vec2::new(28.0, 4.0), Vec2::new(4.0, 28.0), Vec2::new(28.0, 28.0)];
        assert!(r.draw_overlay_pixmap(
            overlay,
            10.0,
            20.0,
            Align::TopLeft,
            Dim::Undefined,
            Dim::Undefined,
            Rgba::FOCUS,
            inlay,
            corners,
        ));

        let prims = submitted(&r);
        let Primitive::TexturedQuad { corners: warped, order, color, .. } = prims[0] else {
            panic!("expected the inlay first");
        };
        assert_eq!(order, 0);
        assert_eq!(color, Rgba::DEFAULT);
        assert_eq!(warped[0].pos, Vec2::new(13.0, 26.0));
        assert_eq!(warped[3].pos, Vec2::new(25.0, 50.0));
        assert_eq!(warped[1].uv, Vec2::new(16.0, 0.0));
        assert_eq!(warped[2].uv, Vec2::new(0.0, 8.0));

        let Primitive::Sprite { order, color, .. } = prims[1] else {
            panic!("expected the overlay second");
        };
        assert_eq!((order, color), (1, Rgba::FOCUS));
    }

    #[test]
    fn overlay_with_failed_inlay_draws_nothing() {
        let mut r = renderer();
        let overlay = ct32(&mut r, 32, 32);
        let inlay = r
            .textures_mut()
            .insert_texture(Texture::new(4, 4, PixelFormat::T8, vec![0; 16]).unwrap());
        let corners = [Vec2::zero(); 4];
        assert!(!r.draw_overlay_pixmap(
            overlay,
            0.0,
            0.0,
            Align::TopLeft,
            Dim::Undefined,
            Dim::Undefined,
            Rgba::DEFAULT,
            inlay,
            corners,
        ));
        assert_eq!(r.backend().submitted().count(), 0);
    }

    // ── rects and lines ───────────────────────────────────────────────────

    #[test]
    fn rect_is_a_blended_flat_quad() {
        let mut r = renderer();
        r.set_translation(10.0, 0.0);
        r.draw_rect(0.0, 0.0, Align::TopLeft, px(4.0), px(2.0), Rgba::DARKER);

        let Primitive::Quad { corners, color, .. } = submitted(&r)[0] else {
            panic!("expected a quad");
        };
        assert_eq!(color, Rgba::DARKER);
        assert_eq!(
            corners,
            [Vec2::new(10.0, 0.0), Vec2::new(14.0, 0.0), Vec2::new(10.0, 2.0), Vec2::new(14.0, 2.0)]
        );
        assert_eq!(r.backend().calls()[0], GsCall::SetBlend(BlendMode::SourceAlpha));
    }

    #[test]
    fn rect_with_undefined_size_is_skipped() {
        let mut r = renderer();
        assert!(!r.draw_rect(0.0, 0.0, Align::TopLeft, Dim::Undefined, px(2.0), Rgba::BLACK));
        assert!(r.backend().calls().is_empty());
    }

    #[test]
    fn rect_clip_trims_to_region() {
        let mut r = renderer();
        r.set_clip(0.0, 0.0, px(10.0), Dim::Infinite);
        r.draw_rect(5.0, 5.0, Align::TopLeft, px(20.0), px(20.0), Rgba::BLACK);
        let Primitive::Quad { corners, .. } = submitted(&r)[0] else {
            panic!("expected a quad");
        };
        assert_eq!(corners[3], Vec2::new(10.0, 25.0));
    }

    #[test]
    fn line_goes_through_shift_and_translation() {
        let mut r = renderer();
        r.set_vertical_shift(0.5);
        r.set_translation(1.0, 1.0);
        r.set_clip(0.0, 0.0, px(1.0), px(1.0));
        r.draw_line(0.0, 100.0, 300.0, 201.0, Rgba::WHITE);

        let Primitive::Line { from, to, .. } = submitted(&r)[0] else {
            panic!("expected a line");
        };
        assert_eq!(from, Vec2::new(1.0, 51.0));
        assert_eq!(to, Vec2::new(301.0, 101.0));
    }

    // ── state ─────────────────────────────────────────────────────────────

    #[test]
    fn clip_to_screen_edge() {
        let mut r = renderer();
        r.set_clip(100.0, 50.0, Dim::Infinite, Dim::Undefined);
        assert_eq!(r.clip(), Some(Rect::from_edges(100.0, 50.0, 640.0, 512.0)));
        r.clear_clip();
        assert_eq!(r.clip(), None);
    }

    #[test]
    fn aspect_ratio_roundtrip() {
        let mut r = renderer();
        r.set_aspect_ratio(0.75, 1.0);
        assert_eq!(r.aspect_ratio(), (0.75, 1.0));
        r.reset_aspect_ratio();
        assert_eq!(r.aspect_ratio(), (1.0, 1.0));
    }
}
