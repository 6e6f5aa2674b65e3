//! Boundary with the graphics synthesizer (the rasterizer + DMA transport).
//!
//! The engine never talks to hardware directly. Everything it needs from the
//! device is expressed by [`GsBackend`]: screen setup, primitive queueing,
//! dispatch, completion waits, VRAM transfers and buffer flips.
//!
//! Two implementations ship with the crate:
//! - [`RecordingBackend`]: headless, records every call (tests, tooling)
//! - `device::GsDevice`: wgpu-backed, renders into a window surface

mod backend;
mod prim;
mod recording;

pub use backend::{GsBackend, HwMode, ScreenConfig};
pub use prim::{BlendMode, ClutBinding, Primitive, TexBinding, Transfer, TransferKind};
pub use recording::{GsCall, RecordingBackend, TransferRecord};
