//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the single window, builds the wgpu-backed
//! renderer over it and drives one `start_frame`/`end_frame` pair per redraw.

mod runtime;
mod vblank;

pub use runtime::{Runtime, RuntimeConfig};
