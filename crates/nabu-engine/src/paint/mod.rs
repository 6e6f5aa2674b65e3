//! Color model for primitives.
//!
//! Colors are 8-bit RGBA in the rasterizer's native convention, where
//! `0x80` is full intensity for texture modulation and full opacity for alpha.

pub mod color;

pub use color::Rgba;
