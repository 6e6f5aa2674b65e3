use winit::event::WindowEvent;

use crate::device::GsDevice;
use crate::render::Renderer;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by [`Runtime`](crate::window::Runtime).
pub trait App {
    /// Called once, right after the renderer is created and before the first
    /// frame. The place to register textures and palettes.
    fn init(&mut self, renderer: &mut Renderer<GsDevice<'_>>) -> anyhow::Result<()> {
        let _ = renderer;
        Ok(())
    }

    /// Called for every window event before the runtime handles it.
    fn on_window_event(&mut self, event: &WindowEvent) -> AppControl {
        let _ = event;
        AppControl::Continue
    }

    /// Called once per frame, between `start_frame` and `end_frame`.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
