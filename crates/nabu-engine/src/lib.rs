//! Nabu engine crate.
//!
//! A frame-bounded VRAM texture allocator and a 2D draw layer over a
//! graphics-synthesizer style rasterizer. The core ([`render::Renderer`]) is
//! generic over [`gs::GsBackend`]; [`device::GsDevice`] renders through wgpu
//! and [`window::Runtime`] drives it from a winit event loop.

pub mod coords;
pub mod paint;
pub mod gs;
pub mod vram;
pub mod texture;
pub mod geometry;
pub mod clip;
pub mod frame;
pub mod render;

pub mod device;
pub mod window;
pub mod time;
pub mod core;
pub mod logging;
