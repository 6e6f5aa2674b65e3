//! Video memory bookkeeping.
//!
//! VRAM is a single fixed-size linear region. Textures and palettes are
//! bump-allocated from it in block-sized steps; there is no per-object free.
//! The only way to reclaim space is a flush, which invalidates every placement
//! made since the previous flush.

mod addr;
mod allocator;
mod format;
mod pool;

pub use addr::{VramAddr, VramSlot};
pub use allocator::{AllocError, Allocation, Placement, Resident, VramAllocator};
pub use format::{buffer_width, clut_layout, texture_size, ClutLayout, FormatError, PixelFormat};
pub use pool::{VramPool, DEFAULT_BLOCK_SIZE, DEFAULT_VRAM_SIZE};
