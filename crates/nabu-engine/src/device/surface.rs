//! Surface policy: format and alpha choice, error triage, and where the
//! logical screen lands inside the window.

use winit::dpi::PhysicalSize;

/// Both PAL and NTSC frames are shown at 4:3 regardless of line count.
pub const DISPLAY_ASPECT: f32 = 4.0 / 3.0;

/// High-level response after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; rendering may resume next frame.
    Reconfigured,
    /// Transient error; skip the current frame.
    SkipFrame,
    /// Unrecoverable (commonly OOM).
    Fatal,
}

impl SurfaceErrorAction {
    pub(crate) fn of(err: &wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::Reconfigured,
            wgpu::SurfaceError::OutOfMemory => Self::Fatal,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => Self::SkipFrame,
        }
    }
}

/// Picks a swapchain format.
///
/// Texel and vertex colors are already display-encoded bytes, so a plain
/// `Unorm` target reproduces them as-is; sRGB targets only when asked.
pub(crate) fn choose_format(formats: &[wgpu::TextureFormat], prefer_srgb: bool) -> Option<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|f| f.is_srgb() == prefer_srgb)
        .or_else(|| formats.first().copied())
}

/// Requested mode if supported, else opaque, else whatever comes first.
pub(crate) fn choose_alpha_mode(
    modes: &[wgpu::CompositeAlphaMode],
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .into_iter()
        .chain([wgpu::CompositeAlphaMode::Opaque])
        .find(|m| modes.contains(m))
        .or_else(|| modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

/// Pixel rectangle of the window the logical screen is mapped onto.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct DisplayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Largest centered [`DISPLAY_ASPECT`] rectangle inside `size`; the rest is
/// letterbox. `None` for a zero-area window.
pub(crate) fn display_rect(size: PhysicalSize<u32>) -> Option<DisplayRect> {
    if size.width == 0 || size.height == 0 {
        return None;
    }
    let (w, h) = (size.width as f32, size.height as f32);
    let (width, height) = if w / h > DISPLAY_ASPECT {
        (h * DISPLAY_ASPECT, h)
    } else {
        (w, w / DISPLAY_ASPECT)
    };
    Some(DisplayRect {
        x: ((w - width) / 2.0).floor(),
        y: ((h - height) / 2.0).floor(),
        width,
        height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{CompositeAlphaMode, TextureFormat};

    #[test]
    fn unorm_preferred_unless_srgb_requested() {
        let formats = [TextureFormat::Bgra8UnormSrgb, TextureFormat::Bgra8Unorm];
        assert_eq!(choose_format(&formats, false), Some(TextureFormat::Bgra8Unorm));
        assert_eq!(choose_format(&formats, true), Some(TextureFormat::Bgra8UnormSrgb));
        assert_eq!(choose_format(&formats[..1], false), Some(TextureFormat::Bgra8UnormSrgb));
        assert_eq!(choose_format(&[], false), None);
    }

    #[test]
    fn alpha_mode_falls_back_to_opaque_then_first() {
        let modes = [CompositeAlphaMode::PreMultiplied, CompositeAlphaMode::Opaque];
        assert_eq!(choose_alpha_mode(&modes, Some(CompositeAlphaMode::PostMultiplied)), CompositeAlphaMode::Opaque);
        assert_eq!(choose_alpha_mode(&modes, Some(CompositeAlphaMode::PreMultiplied)), CompositeAlphaMode::PreMultiplied);
        assert_eq!(choose_alpha_mode(&modes[..1], None), CompositeAlphaMode::PreMultiplied);
        assert_eq!(choose_alpha_mode(&[], None), CompositeAlphaMode::Auto);
    }

    #[test]
    fn wide_window_is_pillarboxed() {
        let r = display_rect(PhysicalSize::new(1600, 900)).unwrap();
        assert_eq!((r.x, r.y, r.width, r.height), (200.0, 0.0, 1200.0, 900.0));
    }

    #[test]
    fn tall_window_is_letterboxed() {
        let r = display_rect(PhysicalSize::new(800, 800)).unwrap();
        assert_eq!((r.x, r.y, r.width, r.height), (0.0, 100.0, 800.0, 600.0));
    }

    #[test]
    fn minimized_window_has_no_display() {
        assert_eq!(display_rect(PhysicalSize::new(0, 480)), None);
    }

    #[test]
    fn lost_and_outdated_reconfigure() {
        assert_eq!(SurfaceErrorAction::of(&wgpu::SurfaceError::Lost), SurfaceErrorAction::Reconfigured);
        assert_eq!(SurfaceErrorAction::of(&wgpu::SurfaceError::Timeout), SurfaceErrorAction::SkipFrame);
        assert_eq!(SurfaceErrorAction::of(&wgpu::SurfaceError::OutOfMemory), SurfaceErrorAction::Fatal);
    }
}
