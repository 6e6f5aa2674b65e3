use std::fmt;

/// Pixel storage formats understood by the rasterizer.
///
/// `Ct*` formats store colors directly; `T8`/`T4` store palette indices and
/// need a CLUT. Palettes themselves use `T8`/`T4` as their index depth and one
/// of the `Ct*` formats as their entry color format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum PixelFormat {
    /// 32-bit RGBA, 8 bits per channel.
    Ct32,
    /// 24-bit RGB stored in 32-bit words; alpha is ignored.
    Ct24,
    /// 16-bit RGBA 5:5:5:1.
    Ct16,
    /// 16-bit RGBA 5:5:5:1, signed-compare variant.
    Ct16s,
    /// 8-bit palette index.
    T8,
    /// 4-bit palette index, two texels per byte (low nibble first).
    T4,
}

impl PixelFormat {
    #[inline]
    pub fn is_indexed(self) -> bool {
        matches!(self, PixelFormat::T8 | PixelFormat::T4)
    }

    /// Register value of the format.
    #[inline]
    pub const fn hw_id(self) -> u8 {
        match self {
            PixelFormat::Ct32 => 0x00,
            PixelFormat::Ct24 => 0x01,
            PixelFormat::Ct16 => 0x02,
            PixelFormat::Ct16s => 0x0A,
            PixelFormat::T8 => 0x13,
            PixelFormat::T4 => 0x14,
        }
    }
}

/// Format combination the upload path cannot handle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FormatError {
    /// A palette's index depth is not `T8` or `T4`.
    NotAnIndexDepth(PixelFormat),
    /// A palette's entry format is not a direct-color format.
    NotAPaletteColor(PixelFormat),
    /// An indexed texture has no palette attached.
    MissingClut(PixelFormat),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::NotAnIndexDepth(p) => write!(f, "{p:?} is not a palette index depth"),
            FormatError::NotAPaletteColor(p) => write!(f, "{p:?} is not a palette entry format"),
            FormatError::MissingClut(p) => write!(f, "{p:?} texture has no palette attached"),
        }
    }
}

impl std::error::Error for FormatError {}

/// VRAM footprint of a `width` x `height` texture, in bytes (before block rounding).
pub fn texture_size(width: u32, height: u32, format: PixelFormat) -> u32 {
    let texels = width.saturating_mul(height);
    match format {
        PixelFormat::Ct32 | PixelFormat::Ct24 => texels.saturating_mul(4),
        PixelFormat::Ct16 | PixelFormat::Ct16s => texels.saturating_mul(2),
        PixelFormat::T8 => texels,
        PixelFormat::T4 => texels.div_ceil(2),
    }
}

/// Texture buffer width in 64-pixel units (never below 1).
///
/// Indexed formats align the width to 128 pixels first; direct formats to 64.
pub fn buffer_width(width: u32, format: PixelFormat) -> u32 {
    let align = if format.is_indexed() { 128 } else { 64 };
    let aligned = width.next_multiple_of(align);
    (aligned / 64).max(1)
}

/// Palette geometry and footprint.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClutLayout {
    /// Entries per palette row.
    pub width: u32,
    /// Palette rows.
    pub height: u32,
    /// Bytes, before block rounding.
    pub size: u32,
}

impl ClutLayout {
    #[inline]
    pub fn entries(self) -> u32 {
        self.width * self.height
    }
}

/// Palette geometry for a given index depth and entry color format.
///
/// `T4` palettes are laid out as 8x2 entries, `T8` palettes as 16x16.
pub fn clut_layout(depth: PixelFormat, color: PixelFormat) -> Result<ClutLayout, FormatError> {
    let (width, height) = match depth {
        PixelFormat::T4 => (8, 2),
        PixelFormat::T8 => (16, 16),
        other => return Err(FormatError::NotAnIndexDepth(other)),
    };

    let bytes_per_entry = match color {
        PixelFormat::Ct32 | PixelFormat::Ct24 => 4,
        PixelFormat::Ct16 | PixelFormat::Ct16s => 2,
        other => return Err(FormatError::NotAPaletteColor(other)),
    };

    Ok(ClutLayout {
        width,
        height,
        size: width * height * bytes_per_entry,
    })
}
