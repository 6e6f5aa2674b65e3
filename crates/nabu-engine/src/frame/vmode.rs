use crate::gs::HwMode;

/// Screen width for every supported mode.
pub const SCREEN_WIDTH: u32 = 640;

/// Height used when a hardware mode has no logical counterpart.
const FALLBACK_HEIGHT: u32 = 512;

/// Logical video mode selector.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum VideoMode {
    /// Whatever the device came up in.
    #[default]
    Auto,
    Pal,
    Ntsc,
}

impl VideoMode {
    pub const ALL: [VideoMode; 3] = [VideoMode::Auto, VideoMode::Pal, VideoMode::Ntsc];

    #[inline]
    const fn index(self) -> usize {
        match self {
            VideoMode::Auto => 0,
            VideoMode::Pal => 1,
            VideoMode::Ntsc => 2,
        }
    }

    /// Fixed hardware id; `None` for `Auto`.
    #[inline]
    pub const fn fixed_hw(self) -> Option<HwMode> {
        match self {
            VideoMode::Auto => None,
            VideoMode::Pal => Some(HwMode::PAL),
            VideoMode::Ntsc => Some(HwMode::NTSC),
        }
    }
}

/// Forward and inverse mode tables, resolved against the device default.
#[derive(Debug, Clone)]
pub struct ModeTable {
    default_mode: HwMode,
    inverse: [Option<VideoMode>; HwMode::MAX as usize + 1],
    heights: [u32; 3],
}

impl ModeTable {
    pub fn new(default_mode: HwMode) -> Self {
        let mut inverse = [None; HwMode::MAX as usize + 1];
        for mode in VideoMode::ALL {
            if let Some(hw) = mode.fixed_hw() {
                if hw.0 <= HwMode::MAX {
                    inverse[hw.0 as usize] = Some(mode);
                }
            }
        }

        let mut table = Self { default_mode, inverse, heights: [448, 512, 448] };
        table.heights[VideoMode::Auto.index()] = table.height_of(default_mode);
        table
    }

    #[inline]
    pub fn default_mode(&self) -> HwMode {
        self.default_mode
    }

    /// Hardware id for a logical mode.
    #[inline]
    pub fn resolve(&self, mode: VideoMode) -> HwMode {
        mode.fixed_hw().unwrap_or(self.default_mode)
    }

    /// Logical mode of a hardware id, if it has one.
    pub fn logical(&self, hw: HwMode) -> Option<VideoMode> {
        self.inverse.get(hw.0 as usize).copied().flatten()
    }

    /// Screen height for a hardware id.
    pub fn height_of(&self, hw: HwMode) -> u32 {
        match self.logical(hw) {
            Some(mode) => self.heights[mode.index()],
            None => FALLBACK_HEIGHT,
        }
    }

    /// Screen height of a logical mode.
    #[inline]
    pub fn height(&self, mode: VideoMode) -> u32 {
        self.heights[mode.index()]
    }

    /// Vertical refresh of a hardware id in Hz.
    #[inline]
    pub fn refresh_hz(&self, hw: HwMode) -> u32 {
        if hw == HwMode::PAL { 50 } else { 60 }
    }
}
