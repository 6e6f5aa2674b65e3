//! Screen-space value types shared by layout, clipping and backends.
//!
//! Canonical space:
//! - device pixels of the configured video mode (e.g. 640 x 448)
//! - origin top-left
//! - +X right, +Y down
//!
//! Backends convert to their own coordinate conventions at submission time.

mod rect;
mod vec2;

pub use rect::Rect;
pub use vec2::Vec2;
