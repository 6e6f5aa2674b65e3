use super::VramAddr;

/// Default addressable VRAM (4 MiB).
pub const DEFAULT_VRAM_SIZE: u32 = 4 * 1024 * 1024;

/// Default allocation granularity in bytes.
pub const DEFAULT_BLOCK_SIZE: u32 = 256;

/// Linear bump allocator over `[base, end)`.
///
/// Invariants:
/// - `base <= cursor <= end`
/// - `cursor` only grows until [`reset`](Self::reset), which rewinds it to `base`
/// - `base` and every returned address are block aligned
#[derive(Debug, Clone)]
pub struct VramPool {
    base: u32,
    end: u32,
    block: u32,
    cursor: u32,
}

impl VramPool {
    /// Creates a pool covering `[base, end)` with `block`-byte granularity.
    ///
    /// `block` must be a power of two. An unaligned `base` is rounded up to
    /// the next block boundary.
    pub fn new(base: u32, end: u32, block: u32) -> Self {
        debug_assert!(block.is_power_of_two(), "block size must be a power of two");
        let base = base.checked_next_multiple_of(block).unwrap_or(end).min(end);
        Self { base, end, block, cursor: base }
    }

    /// Usable bytes in an empty pool.
    #[inline]
    pub fn capacity(&self) -> u32 {
        self.end - self.base
    }

    #[inline]
    pub fn base(&self) -> VramAddr {
        VramAddr(self.base)
    }

    #[inline]
    pub fn cursor(&self) -> VramAddr {
        VramAddr(self.cursor)
    }

    #[inline]
    pub fn used(&self) -> u32 {
        self.cursor - self.base
    }

    #[inline]
    pub fn available(&self) -> u32 {
        self.end - self.cursor
    }

    #[inline]
    pub fn block_size(&self) -> u32 {
        self.block
    }

    /// Rounds `size` up to the block granularity, saturating at `u32::MAX`.
    #[inline]
    pub fn round(&self, size: u32) -> u32 {
        size.checked_next_multiple_of(self.block).unwrap_or(u32::MAX)
    }

    /// Returns `true` if `rounded` bytes could never fit, even in an empty pool.
    ///
    /// An object spanning the whole pool is treated as too large.
    #[inline]
    pub fn exceeds_capacity(&self, rounded: u32) -> bool {
        rounded >= self.capacity()
    }

    /// Places `rounded` bytes at the cursor, or returns `None` if they do not fit.
    pub fn try_place(&mut self, rounded: u32) -> Option<VramAddr> {
        if rounded > self.available() {
            return None;
        }
        let addr = VramAddr(self.cursor);
        self.cursor += rounded;
        Some(addr)
    }

    /// Rewinds the cursor to the pool base, invalidating every placement.
    #[inline]
    pub fn reset(&mut self) {
        self.cursor = self.base;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_up_to_block() {
        let pool = VramPool::new(0, 4096, 256);
        assert_eq!(pool.round(0), 0);
        assert_eq!(pool.round(1), 256);
        assert_eq!(pool.round(256), 256);
        assert_eq!(pool.round(257), 512);
    }

    #[test]
    fn placements_are_contiguous_and_disjoint() {
        let mut pool = VramPool::new(0, 4096, 256);
        assert_eq!(pool.try_place(512), Some(VramAddr(0)));
        assert_eq!(pool.try_place(256), Some(VramAddr(512)));
        assert_eq!(pool.cursor(), VramAddr(768));
        assert_eq!(pool.used(), 768);
    }

    #[test]
    fn exact_fill_is_allowed_and_overflow_is_not() {
        let mut pool = VramPool::new(0, 1024, 256);
        assert!(pool.try_place(1024).is_some());
        assert_eq!(pool.available(), 0);
        assert!(pool.try_place(256).is_none());
        assert_eq!(pool.cursor(), VramAddr(1024));
    }

    #[test]
    fn reset_rewinds_to_base() {
        let mut pool = VramPool::new(2048, 8192, 256);
        pool.try_place(512);
        pool.reset();
        assert_eq!(pool.cursor(), pool.base());
        assert_eq!(pool.try_place(256), Some(VramAddr(2048)));
    }

    #[test]
    fn unaligned_base_rounds_up_to_block() {
        let mut pool = VramPool::new(2, 4096, 256);
        assert_eq!(pool.base(), VramAddr(256));
        assert_eq!(pool.capacity(), 3840);
        assert_eq!(pool.try_place(256), Some(VramAddr(256)));
        assert_eq!(pool.try_place(512), Some(VramAddr(512)));
    }

    #[test]
    fn base_past_end_leaves_an_empty_pool() {
        let pool = VramPool::new(4000, 4096, 256);
        assert_eq!(pool.capacity(), 0);
        assert_eq!(pool.available(), 0);
    }

    #[test]
    fn capacity_is_measured_from_base() {
        let pool = VramPool::new(1024, 4096, 256);
        assert_eq!(pool.capacity(), 3072);
        assert!(pool.exceeds_capacity(3072));
        assert!(!pool.exceeds_capacity(2816));
    }
}
