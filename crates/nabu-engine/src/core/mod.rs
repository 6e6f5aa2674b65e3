//! Contract between the runtime loop and applications.
//!
//! The runtime owns the window and the renderer; applications only see them
//! through [`App`] callbacks and the per-frame [`FrameCtx`].

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::FrameCtx;
