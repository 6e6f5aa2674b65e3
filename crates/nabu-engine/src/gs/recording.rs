use crate::paint::Rgba;
use crate::vram::{PixelFormat, VramAddr, DEFAULT_VRAM_SIZE};

use super::{BlendMode, GsBackend, HwMode, Primitive, ScreenConfig, Transfer, TransferKind};

/// Metadata of a recorded VRAM transfer (payload length instead of bytes).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct TransferRecord {
    pub addr: VramAddr,
    pub len: usize,
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub buffer_width: u32,
    pub kind: TransferKind,
}

/// One call made against a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum GsCall {
    ConfigureScreen(ScreenConfig),
    Clear(Rgba),
    SyncFlip,
    SetBlend(BlendMode),
    Submit(Primitive),
    Dispatch,
    MarkFinish,
    WaitFinish,
    Transfer(TransferRecord),
    DisplayBuffer(u32),
    SetActiveBuffer(u32),
}

/// Headless backend that records every call in order.
///
/// Useful for tests and for driving the engine without a display.
#[derive(Debug, Clone)]
pub struct RecordingBackend {
    vram_size: u32,
    default_mode: HwMode,
    calls: Vec<GsCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::with_vram(DEFAULT_VRAM_SIZE)
    }

    /// Backend reporting `vram_size` bytes of VRAM.
    pub fn with_vram(vram_size: u32) -> Self {
        Self {
            vram_size,
            default_mode: HwMode::PAL,
            calls: Vec::new(),
        }
    }

    /// Overrides the mode reported by [`GsBackend::default_mode`].
    pub fn with_default_mode(mut self, mode: HwMode) -> Self {
        self.default_mode = mode;
        self
    }

    #[inline]
    pub fn calls(&self) -> &[GsCall] {
        &self.calls
    }

    /// Drains the call log.
    pub fn take_calls(&mut self) -> Vec<GsCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn transfers(&self) -> impl Iterator<Item = &TransferRecord> {
        self.calls.iter().filter_map(|c| match c {
            GsCall::Transfer(t) => Some(t),
            _ => None,
        })
    }

    pub fn submitted(&self) -> impl Iterator<Item = &Primitive> {
        self.calls.iter().filter_map(|c| match c {
            GsCall::Submit(p) => Some(p),
            _ => None,
        })
    }

    /// Number of recorded calls matching `pred`.
    pub fn count(&self, pred: impl Fn(&GsCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Index of the first recorded call matching `pred`.
    pub fn position(&self, pred: impl Fn(&GsCall) -> bool) -> Option<usize> {
        self.calls.iter().position(pred)
    }
}

impl Default for RecordingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GsBackend for RecordingBackend {
    fn default_mode(&self) -> HwMode {
        self.default_mode
    }

    fn vram_size(&self) -> u32 {
        self.vram_size
    }

    fn configure_screen(&mut self, screen: &ScreenConfig) {
        self.calls.push(GsCall::ConfigureScreen(*screen));
    }

    fn clear(&mut self, color: Rgba) {
        self.calls.push(GsCall::Clear(color));
    }

    fn sync_flip(&mut self) {
        self.calls.push(GsCall::SyncFlip);
    }

    fn set_blend(&mut self, blend: BlendMode) {
        self.calls.push(GsCall::SetBlend(blend));
    }

    fn submit(&mut self, prim: Primitive) {
        self.calls.push(GsCall::Submit(prim));
    }

    fn dispatch(&mut self) {
        self.calls.push(GsCall::Dispatch);
    }

    fn mark_finish(&mut self) {
        self.calls.push(GsCall::MarkFinish);
    }

    fn wait_finish(&mut self) {
        self.calls.push(GsCall::WaitFinish);
    }

    fn transfer(&mut self, transfer: &Transfer<'_>) {
        self.calls.push(GsCall::Transfer(TransferRecord {
            addr: transfer.addr,
            len: transfer.data.len(),
            width: transfer.width,
            height: transfer.height,
            format: transfer.format,
            buffer_width: transfer.buffer_width,
            kind: transfer.kind,
        }));
    }

    fn display_buffer(&mut self, index: u32) {
        self.calls.push(GsCall::DisplayBuffer(index));
    }

    fn set_active_buffer(&mut self, index: u32) {
        self.calls.push(GsCall::SetActiveBuffer(index));
    }
}
