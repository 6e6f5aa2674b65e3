use crate::clip::ClipRect;
use crate::coords::Vec2;
use crate::frame::{FrameState, ModeTable, VideoMode, VsyncSignal, SCREEN_WIDTH};
use crate::geometry::Transform;
use crate::gs::{GsBackend, HwMode, ScreenConfig};
use crate::paint::Rgba;
use crate::texture::TextureStore;
use crate::vram::{PixelFormat, Resident, VramAllocator, VramPool};

use super::RenderInit;

/// Frame-bounded renderer over a [`GsBackend`].
///
/// Single-threaded: every call happens on the owning thread between
/// [`start_frame`](Self::start_frame) and [`end_frame`](Self::end_frame). The
/// only cross-thread interaction is the [`VsyncSignal`].
pub struct Renderer<B: GsBackend> {
    pub(super) backend: B,
    pub(super) store: TextureStore,
    pub(super) vram: VramAllocator,
    pub(super) frame: FrameState,
    pub(super) clip: ClipRect,
    pub(super) transform: Transform,

    modes: ModeTable,
    video_mode: VideoMode,
    hw_mode: HwMode,
    width: u32,
    height: u32,
    double_buffering: bool,
    vsync: bool,
    vsync_signal: VsyncSignal,
}

impl<B: GsBackend> Renderer<B> {
    /// Takes ownership of the backend, applies the initial video mode and
    /// sets up an empty VRAM pool over `[init.vram_base, backend.vram_size())`.
    pub fn new(backend: B, init: RenderInit) -> Self {
        let modes = ModeTable::new(backend.default_mode());
        let pool = VramPool::new(init.vram_base, backend.vram_size(), init.block_size);
        if pool.base().get() != init.vram_base {
            log::warn!(
                "renderer: vram base {:#x} is not block aligned; using {:#x}",
                init.vram_base,
                pool.base().get()
            );
        }
        log::debug!(
            "renderer: vram pool {:#x}..{:#x}, {} byte blocks",
            pool.base().get(),
            backend.vram_size(),
            pool.block_size()
        );

        let mut renderer = Self {
            backend,
            store: TextureStore::new(),
            vram: VramAllocator::new(pool),
            frame: FrameState::default(),
            clip: None,
            transform: Transform::default(),
            hw_mode: modes.default_mode(),
            modes,
            video_mode: init.video_mode,
            width: SCREEN_WIDTH,
            height: 0,
            double_buffering: true,
            vsync: init.vsync,
            vsync_signal: VsyncSignal::new(),
        };
        renderer.set_mode(init.vsync, init.video_mode);
        renderer
    }

    // ── mode ──────────────────────────────────────────────────────────────

    /// Switches vsync and video mode, reconfigures the screen and clears it.
    pub fn set_mode(&mut self, vsync: bool, mode: VideoMode) {
        self.vsync = vsync;
        self.video_mode = mode;
        self.hw_mode = self.modes.resolve(mode);
        self.width = SCREEN_WIDTH;
        self.height = self.modes.height_of(self.hw_mode);
        self.double_buffering = true;

        self.backend.configure_screen(&ScreenConfig {
            mode: self.hw_mode,
            width: self.width,
            height: self.height,
            format: PixelFormat::Ct24,
            double_buffering: self.double_buffering,
            z_buffering: false,
            prim_alpha: true,
        });
        self.backend.clear(Rgba::BLACK);
        self.backend.sync_flip();

        log::info!("video mode {:?}: {} x {}", mode, self.width, self.height);
    }

    /// Configured screen width and height in pixels.
    #[inline]
    pub fn screen_extents(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub(super) fn screen_size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    #[inline]
    pub fn video_mode(&self) -> VideoMode {
        self.video_mode
    }

    /// Hardware id the current mode resolved to.
    #[inline]
    pub fn hw_mode(&self) -> HwMode {
        self.hw_mode
    }

    /// Vertical refresh of the current mode in Hz.
    #[inline]
    pub fn refresh_hz(&self) -> u32 {
        self.modes.refresh_hz(self.hw_mode)
    }

    #[inline]
    pub fn vsync_enabled(&self) -> bool {
        self.vsync
    }

    /// Handle a vblank source notifies; `end_frame` waits on it when vsync is on.
    pub fn vsync_signal(&self) -> VsyncSignal {
        self.vsync_signal.clone()
    }

    // ── frame ─────────────────────────────────────────────────────────────

    pub fn start_frame(&mut self) {
        self.frame.reset_order();
    }

    /// Finishes the frame: drains the queue, reclaims VRAM, waits for the
    /// hardware and (past the first frame) syncs and swaps buffers.
    pub fn end_frame(&mut self) {
        self.backend.mark_finish();
        self.flush();
        self.backend.wait_finish();

        if !self.frame.is_first_frame() {
            if self.vsync {
                self.vsync_signal.wait();
            }
            if self.double_buffering {
                self.backend.display_buffer(self.frame.active_buffer() & 1);
                self.frame.swap();
            }
        }

        self.backend.set_active_buffer(self.frame.active_buffer());
        self.frame.finish_first_frame();
    }

    /// Dispatches queued primitives, then reclaims the whole VRAM pool.
    ///
    /// Every texture and palette uploaded since the previous flush reads back
    /// as `Unset` afterwards.
    pub fn flush(&mut self) {
        flush_pool(&mut self.backend, &mut self.store, &mut self.vram);
    }

    /// Final flush before the renderer is dropped.
    pub fn shutdown(&mut self) {
        self.flush();
        log::debug!("renderer: shut down after {} vram epochs", self.vram.epoch());
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[inline]
    pub fn textures(&self) -> &TextureStore {
        &self.store
    }

    #[inline]
    pub fn textures_mut(&mut self) -> &mut TextureStore {
        &mut self.store
    }

    #[inline]
    pub fn vram(&self) -> &VramAllocator {
        &self.vram
    }

    #[inline]
    pub fn frame(&self) -> &FrameState {
        &self.frame
    }
}

/// Reclaim step for [`VramAllocator::flush`] and [`VramAllocator::allocate`]:
/// queued primitives are dispatched before any slot in `ledger` is reset, so
/// nothing in flight samples VRAM that is about to be reused.
pub(super) fn reclaim_with<'a, B: GsBackend>(
    backend: &'a mut B,
    store: &'a mut TextureStore,
) -> impl FnOnce(&[Resident]) + 'a {
    move |ledger: &[Resident]| {
        backend.dispatch();
        store.invalidate(ledger);
    }
}

pub(super) fn flush_pool<B: GsBackend>(backend: &mut B, store: &mut TextureStore, vram: &mut VramAllocator) {
    vram.flush(reclaim_with(backend, store));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gs::{GsCall, RecordingBackend};
    use crate::texture::Texture;
    use crate::vram::{VramAddr, VramSlot};

    fn renderer(init: RenderInit) -> Renderer<RecordingBackend> {
        Renderer::new(RecordingBackend::new(), init)
    }

    fn no_vsync() -> RenderInit {
        RenderInit { vsync: false, ..RenderInit::default() }
    }

    // ── mode ──────────────────────────────────────────────────────────────

    #[test]
    fn init_configures_and_clears_screen() {
        let r = renderer(no_vsync());
        let calls = r.backend().calls();
        assert!(matches!(
            calls[0],
            GsCall::ConfigureScreen(ScreenConfig {
                mode: HwMode::PAL,
                width: 640,
                height: 512,
                format: PixelFormat::Ct24,
                double_buffering: true,
                z_buffering: false,
                prim_alpha: true,
            })
        ));
        assert_eq!(calls[1], GsCall::Clear(Rgba::BLACK));
        assert_eq!(calls[2], GsCall::SyncFlip);
    }

    #[test]
    fn set_mode_changes_extents() {
        let mut r = renderer(no_vsync());
        assert_eq!(r.screen_extents(), (640, 512));
        r.set_mode(false, VideoMode::Ntsc);
        assert_eq!(r.screen_extents(), (640, 448));
        assert_eq!(r.hw_mode(), HwMode::NTSC);
        assert_eq!(r.refresh_hz(), 60);
    }

    #[test]
    fn auto_mode_follows_device_default() {
        let backend = RecordingBackend::new().with_default_mode(HwMode::NTSC);
        let r = Renderer::new(backend, no_vsync());
        assert_eq!(r.hw_mode(), HwMode::NTSC);
        assert_eq!(r.screen_extents(), (640, 448));
    }

    // ── frame ─────────────────────────────────────────────────────────────

    #[test]
    fn first_end_frame_skips_swap() {
        let mut r = renderer(no_vsync());
        r.backend_mut().take_calls();
        r.start_frame();
        r.end_frame();
        assert_eq!(
            r.backend().calls(),
            &[GsCall::MarkFinish, GsCall::Dispatch, GsCall::WaitFinish, GsCall::SetActiveBuffer(0)]
        );
    }

    #[test]
    fn later_frames_swap_buffers() {
        let mut r = renderer(no_vsync());
        r.end_frame();
        r.backend_mut().take_calls();

        r.end_frame();
        assert!(r.backend().calls().ends_with(&[GsCall::DisplayBuffer(0), GsCall::SetActiveBuffer(1)]));
        r.backend_mut().take_calls();

        r.end_frame();
        assert!(r.backend().calls().ends_with(&[GsCall::DisplayBuffer(1), GsCall::SetActiveBuffer(0)]));
    }

    #[test]
    fn vsync_wait_consumes_pending_vblank() {
        let mut r = renderer(RenderInit::default());
        let signal = r.vsync_signal();
        r.end_frame();
        signal.notify();
        r.end_frame();
        assert!(!signal.is_pending());
    }

    #[test]
    fn end_frame_reclaims_vram() {
        let mut r = renderer(no_vsync());
        let id = r.textures_mut().insert_texture(Texture::new(8, 8, PixelFormat::Ct32, vec![0; 256]).unwrap());
        assert!(r.prepare_texture(id));
        assert!(matches!(r.textures().texture(id).unwrap().vram(), VramSlot::Resident(_)));

        r.end_frame();
        assert_eq!(r.textures().texture(id).unwrap().vram(), VramSlot::Unset);
        assert_eq!(r.vram().pool().cursor(), r.vram().pool().base());
        assert!(r.vram().ledger().is_empty());
    }

    #[test]
    fn reserved_vram_base_is_honored() {
        let mut r = renderer(RenderInit { vram_base: 0x4000, ..no_vsync() });
        let id = r.textures_mut().insert_texture(Texture::new(8, 8, PixelFormat::Ct32, vec![0; 256]).unwrap());
        assert_eq!(r.upload_texture(id), Ok(VramAddr(0x4000)));
        r.flush();
        assert_eq!(r.vram().pool().cursor(), VramAddr(0x4000));
    }

    #[test]
    fn unaligned_vram_base_rounds_up_to_a_block() {
        let mut r = renderer(RenderInit { vram_base: 2, ..no_vsync() });
        let id = r.textures_mut().insert_texture(Texture::new(8, 8, PixelFormat::Ct32, vec![0; 256]).unwrap());
        assert_eq!(r.upload_texture(id), Ok(VramAddr(256)));
        let t = *r.backend().transfers().next().unwrap();
        assert_eq!(t.addr.get() % 4, 0);
    }

    #[test]
    fn shutdown_flushes() {
        let mut r = renderer(no_vsync());
        r.backend_mut().take_calls();
        r.shutdown();
        assert_eq!(r.backend().calls(), &[GsCall::Dispatch]);
        assert_eq!(r.vram().epoch(), 1);
    }
}
