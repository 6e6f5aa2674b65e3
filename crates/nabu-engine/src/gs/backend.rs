use crate::paint::Rgba;
use crate::vram::PixelFormat;

use super::{BlendMode, Primitive, Transfer};

/// Hardware video mode identifier as understood by the display controller.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct HwMode(pub u8);

impl HwMode {
    pub const NTSC: HwMode = HwMode(0x02);
    pub const PAL: HwMode = HwMode(0x03);

    /// Highest mode id covered by the inverse lookup table.
    pub const MAX: u8 = 15;
}

/// Display configuration applied by [`GsBackend::configure_screen`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScreenConfig {
    pub mode: HwMode,
    pub width: u32,
    pub height: u32,
    /// Framebuffer pixel format.
    pub format: PixelFormat,
    pub double_buffering: bool,
    pub z_buffering: bool,
    pub prim_alpha: bool,
}

/// Capability set consumed from the GPU/DMA collaborator.
///
/// Calls are synchronous from the engine's point of view. Primitives passed to
/// [`submit`](Self::submit) are queued; they reach the rasterizer only on
/// [`dispatch`](Self::dispatch). Transfers issued after a dispatch must not be
/// observed by primitives queued before it.
pub trait GsBackend {
    /// Hardware mode the device came up in before any override.
    fn default_mode(&self) -> HwMode;

    /// Total VRAM in bytes addressable by [`transfer`](Self::transfer).
    fn vram_size(&self) -> u32;

    /// Applies a display mode and framebuffer configuration.
    fn configure_screen(&mut self, screen: &ScreenConfig);

    /// Clears the draw buffer.
    fn clear(&mut self, color: Rgba);

    /// Dispatches, waits and flips once. Used right after a mode switch.
    fn sync_flip(&mut self);

    /// Sets the alpha blend equation for subsequently queued primitives.
    fn set_blend(&mut self, blend: BlendMode);

    /// Queues a primitive.
    fn submit(&mut self, prim: Primitive);

    /// Sends every queued primitive to the rasterizer.
    fn dispatch(&mut self);

    /// Queues a completion marker; [`wait_finish`](Self::wait_finish) blocks on it.
    fn mark_finish(&mut self);

    /// Blocks until the hardware reports all prior work retired.
    fn wait_finish(&mut self);

    /// Copies pixel or palette data into VRAM.
    fn transfer(&mut self, transfer: &Transfer<'_>);

    /// Points the display at framebuffer `index` (0 or 1).
    fn display_buffer(&mut self, index: u32);

    /// Selects the framebuffer subsequent primitives draw into.
    fn set_active_buffer(&mut self, index: u32);
}
