/// 8-bit RGBA color as consumed by the rasterizer.
///
/// Conventions:
/// - `a = 0x80` is fully opaque; values above are clamped by backends.
/// - When modulating a texture, `r/g/b = 0x80` leaves texels unchanged.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    /// Untinted, opaque. Used for textured primitives that should render as-is.
    pub const DEFAULT: Rgba = Rgba::new(0x80, 0x80, 0x80, 0x80);
    pub const WHITE: Rgba = Rgba::new(0xFF, 0xFF, 0xFF, 0x00);
    pub const BLACK: Rgba = Rgba::new(0x00, 0x00, 0x00, 0x00);
    pub const DARKER: Rgba = Rgba::new(0x00, 0x00, 0x00, 0x60);
    pub const FOCUS: Rgba = Rgba::new(0xFF, 0xFF, 0xFF, 0x50);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Alpha as a `[0, 1]` opacity (`0x80` and above map to 1).
    #[inline]
    pub fn opacity(self) -> f32 {
        (self.a as f32 / 128.0).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opacity_saturates_at_0x80() {
        assert_eq!(Rgba::DEFAULT.opacity(), 1.0);
        assert_eq!(Rgba::new(0, 0, 0, 0xFF).opacity(), 1.0);
        assert_eq!(Rgba::new(0, 0, 0, 0x40).opacity(), 0.5);
    }
}
