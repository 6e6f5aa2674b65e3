//! Texture and palette sources plus the arena that owns them.
//!
//! Pixel data is decoded elsewhere; this module only holds it and tracks
//! where (if anywhere) each resource currently lives in VRAM.

mod resource;
mod store;

pub use resource::{Clut, Texture, TextureError};
pub use store::{ClutId, TextureId, TextureStore};
