use crate::frame::VideoMode;
use crate::vram::DEFAULT_BLOCK_SIZE;

/// Renderer startup configuration.
#[derive(Debug, Clone)]
pub struct RenderInit {
    /// Block `end_frame` on the vblank signal.
    pub vsync: bool,
    pub video_mode: VideoMode,
    /// First VRAM byte the texture pool may use. Anything below is reserved
    /// (framebuffers on hardware that shares VRAM with them).
    pub vram_base: u32,
    /// Allocation granularity; must be a power of two.
    pub block_size: u32,
}

impl Default for RenderInit {
    fn default() -> Self {
        Self {
            vsync: true,
            video_mode: VideoMode::Auto,
            vram_base: 0,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}
