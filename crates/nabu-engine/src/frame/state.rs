/// Per-frame counters owned by the renderer.
#[derive(Debug, Clone)]
pub struct FrameState {
    order: u32,
    first_frame: bool,
    active_buffer: u32,
    context: u32,
}

impl Default for FrameState {
    fn default() -> Self {
        Self { order: 0, first_frame: true, active_buffer: 0, context: 0 }
    }
}

impl FrameState {
    /// Draw-order value the next primitive will receive.
    #[inline]
    pub fn order(&self) -> u32 {
        self.order
    }

    /// Returns the current draw-order value and advances the counter.
    #[inline]
    pub fn next_order(&mut self) -> u32 {
        let order = self.order;
        self.order = self.order.wrapping_add(1);
        order
    }

    #[inline]
    pub fn reset_order(&mut self) {
        self.order = 0;
    }

    /// `true` until the first `end_frame` completes.
    #[inline]
    pub fn is_first_frame(&self) -> bool {
        self.first_frame
    }

    #[inline]
    pub fn finish_first_frame(&mut self) {
        self.first_frame = false;
    }

    /// Framebuffer the rasterizer draws into (0 or 1).
    #[inline]
    pub fn active_buffer(&self) -> u32 {
        self.active_buffer
    }

    /// Primitive context parity (0 or 1), toggled alongside the buffer.
    #[inline]
    pub fn context(&self) -> u32 {
        self.context
    }

    /// Swaps buffer and context parity.
    #[inline]
    pub fn swap(&mut self) {
        self.active_buffer ^= 1;
        self.context ^= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_counts_from_zero_after_reset() {
        let mut s = FrameState::default();
        s.next_order();
        s.next_order();
        s.reset_order();
        assert_eq!([s.next_order(), s.next_order(), s.next_order()], [0, 1, 2]);
    }

    #[test]
    fn swap_toggles_parity() {
        let mut s = FrameState::default();
        s.swap();
        assert_eq!((s.active_buffer(), s.context()), (1, 1));
        s.swap();
        assert_eq!((s.active_buffer(), s.context()), (0, 0));
    }
}
