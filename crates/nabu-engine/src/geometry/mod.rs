//! Logical draw requests to absolute screen-space quads.

mod layout;
mod quad;
mod transform;

pub use layout::{layout, Align, Dim, Layout, LayoutError};
pub use quad::{Quad, QuadVertex};
pub use transform::{Transform, VerticalShift};
