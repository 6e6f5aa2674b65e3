//! The render context.
//!
//! [`Renderer`] owns everything a frame needs: the backend, the texture
//! arena, the VRAM allocator, the clip region and the draw transform.
//!
//! Convention:
//! - Coordinates are screen pixels (top-left origin, +Y down).
//! - Draw calls never fail loudly; a request that cannot be honored is
//!   skipped and reported through `log` at trace level.

mod config;
mod draw;
mod renderer;
mod upload;

pub use config::RenderInit;
pub use renderer::Renderer;
pub use upload::UploadError;
