//! Frame bookkeeping: video modes, the vblank wakeup and buffer parity.

mod state;
mod vmode;
mod vsync;

pub use state::FrameState;
pub use vmode::{ModeTable, VideoMode, SCREEN_WIDTH};
pub use vsync::VsyncSignal;
