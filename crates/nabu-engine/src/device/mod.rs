//! wgpu implementation of the graphics synthesizer boundary.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - emulating VRAM as a storage buffer and rasterizing queued primitives

mod gpu;
mod gs_device;
mod instance;
mod surface;

use gpu::Gpu;
pub use gpu::GpuInit;
pub use gs_device::{GsDevice, GsInit};
pub use surface::{SurfaceErrorAction, DISPLAY_ASPECT};
