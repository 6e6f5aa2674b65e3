use std::fmt;

use crate::vram::{clut_layout, texture_size, PixelFormat, VramSlot};

use super::ClutId;

/// Why a texture or palette source was rejected at construction.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TextureError {
    /// Width or height is zero.
    EmptyExtent { width: u32, height: u32 },
    /// The source buffer is shorter than the format requires.
    ShortBuffer { expected: usize, actual: usize },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::EmptyExtent { width, height } => {
                write!(f, "texture extent {width}x{height} is empty")
            }
            TextureError::ShortBuffer { expected, actual } => {
                write!(f, "source buffer holds {actual} bytes, {expected} required")
            }
        }
    }
}

impl std::error::Error for TextureError {}

/// A decoded texture plus its VRAM residency.
#[derive(Debug, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    format: PixelFormat,
    pixels: Vec<u8>,
    clut: Option<ClutId>,
    pub(crate) vram: VramSlot,
    pub(crate) vram_clut: VramSlot,
}

impl Texture {
    /// Wraps `pixels` laid out row-major in `format`.
    ///
    /// `Ct24` texels are stored in 32-bit words like `Ct32`.
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::EmptyExtent { width, height });
        }
        let expected = texture_size(width, height, format) as usize;
        if pixels.len() < expected {
            return Err(TextureError::ShortBuffer { expected, actual: pixels.len() });
        }
        Ok(Self {
            width,
            height,
            format,
            pixels,
            clut: None,
            vram: VramSlot::Unset,
            vram_clut: VramSlot::Unset,
        })
    }

    /// Attaches a palette. Indexed formats need one to be drawable.
    pub fn with_clut(mut self, clut: ClutId) -> Self {
        self.clut = Some(clut);
        self
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn clut(&self) -> Option<ClutId> {
        self.clut
    }

    /// Where the texels live, if uploaded in the current epoch.
    #[inline]
    pub fn vram(&self) -> VramSlot {
        self.vram
    }

    /// Copy of the palette address taken when the texture was prepared.
    #[inline]
    pub fn vram_clut(&self) -> VramSlot {
        self.vram_clut
    }
}

/// A palette shared by any number of indexed textures.
#[derive(Debug, Clone)]
pub struct Clut {
    depth: PixelFormat,
    color: PixelFormat,
    entries: Vec<u8>,
    pub(crate) vram: VramSlot,
}

impl Clut {
    /// Wraps palette `entries` for textures of index depth `depth`, each entry
    /// stored in `color`.
    ///
    /// The buffer length is only checked for recognized combinations; anything
    /// else is accepted here and refused when first prepared.
    pub fn new(depth: PixelFormat, color: PixelFormat, entries: Vec<u8>) -> Result<Self, TextureError> {
        if let Ok(layout) = clut_layout(depth, color) {
            let expected = layout.size as usize;
            if entries.len() < expected {
                return Err(TextureError::ShortBuffer { expected, actual: entries.len() });
            }
        }
        Ok(Self { depth, color, entries, vram: VramSlot::Unset })
    }

    /// Index depth of the textures this palette serves.
    #[inline]
    pub fn depth(&self) -> PixelFormat {
        self.depth
    }

    /// Color format of each entry.
    #[inline]
    pub fn color(&self) -> PixelFormat {
        self.color
    }

    #[inline]
    pub fn entries(&self) -> &[u8] {
        &self.entries
    }

    #[inline]
    pub fn vram(&self) -> VramSlot {
        self.vram
    }
}
