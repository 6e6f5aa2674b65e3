use winit::window::Window;

use crate::device::GsDevice;
use crate::render::Renderer;
use crate::time::FrameTime;

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
/// - `'w` is the window borrow carried by the device surface
pub struct FrameCtx<'a, 'w> {
    pub window: &'a Window,
    pub renderer: &'a mut Renderer<GsDevice<'w>>,
    pub time: FrameTime,
}
