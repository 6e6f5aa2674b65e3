//! Procedural textures and palettes for the demo scene.

use anyhow::Result;
use nabu_engine::texture::{Clut, ClutId, Texture, TextureId, TextureStore};
use nabu_engine::vram::PixelFormat;

/// Handles to everything the scene draws.
pub struct Assets {
    pub checker: TextureId,
    pub frame: TextureId,
    pub plasma: TextureId,
    pub stripes: TextureId,
    pub rings: TextureId,
}

impl Assets {
    pub fn load(store: &mut TextureStore) -> Result<Self> {
        let plasma_clut = store.insert_clut(Clut::new(PixelFormat::T8, PixelFormat::Ct32, fire_palette())?);
        // Both 4-bit textures index the same sixteen colors.
        let shared = store.insert_clut(Clut::new(PixelFormat::T4, PixelFormat::Ct32, sixteen_colors())?);

        Ok(Self {
            checker: store.insert_texture(checker(64, 64)?),
            frame: store.insert_texture(frame(96, 72, 10)?),
            plasma: store.insert_texture(plasma(64, 64, plasma_clut)?),
            stripes: store.insert_texture(nibbles(32, 32, shared, |x, y| ((x + y) / 4) % 16)?),
            rings: store.insert_texture(nibbles(32, 32, shared, |x, y| {
                let (dx, dy) = (x as i32 - 16, y as i32 - 16);
                ((dx * dx + dy * dy) as u32 / 16) % 16
            })?),
        })
    }
}

fn rgba(r: u8, g: u8, b: u8, a: u8) -> [u8; 4] {
    [r, g, b, a]
}

/// True-color checkerboard with a horizontal alpha ramp.
fn checker(w: u32, h: u32) -> Result<Texture> {
    let mut px = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let on = ((x / 8) + (y / 8)) % 2 == 0;
            let a = (0x20 + x * 0x60 / w.max(1)) as u8;
            px.extend_from_slice(&if on { rgba(0xF0, 0xC0, 0x40, a) } else { rgba(0x30, 0x60, 0xD0, a) });
        }
    }
    Ok(Texture::new(w, h, PixelFormat::Ct32, px)?)
}

/// Opaque border with a fully transparent window, used as an overlay.
fn frame(w: u32, h: u32, border: u32) -> Result<Texture> {
    let mut px = Vec::with_capacity((w * h * 4) as usize);
    for y in 0..h {
        for x in 0..w {
            let inside = x >= border && x < w - border && y >= border && y < h - border;
            px.extend_from_slice(&if inside { rgba(0, 0, 0, 0) } else { rgba(0xA0, 0xA0, 0xB0, 0x80) });
        }
    }
    Ok(Texture::new(w, h, PixelFormat::Ct32, px)?)
}

fn plasma(w: u32, h: u32, clut: ClutId) -> Result<Texture> {
    let mut px = Vec::with_capacity((w * h) as usize);
    for y in 0..h {
        for x in 0..w {
            let (fx, fy) = (x as f32 / 8.0, y as f32 / 6.0);
            let v = (fx.sin() + fy.cos() + ((fx + fy) / 2.0).sin()) / 3.0;
            px.push(((v + 1.0) * 127.5) as u8);
        }
    }
    Ok(Texture::new(w, h, PixelFormat::T8, px)?.with_clut(clut))
}

/// Packs a 4-bit index image, low nibble first.
fn nibbles(w: u32, h: u32, clut: ClutId, index: impl Fn(u32, u32) -> u32) -> Result<Texture> {
    let mut px = vec![0u8; (w * h).div_ceil(2) as usize];
    for y in 0..h {
        for x in 0..w {
            let i = (y * w + x) as usize;
            let v = (index(x, y) & 0xF) as u8;
            px[i / 2] |= if i % 2 == 0 { v } else { v << 4 };
        }
    }
    Ok(Texture::new(w, h, PixelFormat::T4, px)?.with_clut(clut))
}

/// 256 entries, black through red and yellow to white.
fn fire_palette() -> Vec<u8> {
    (0..256u32)
        .flat_map(|i| {
            let r = (i * 3).min(255) as u8;
            let g = (i * 3).saturating_sub(255).min(255) as u8;
            let b = (i * 3).saturating_sub(510).min(255) as u8;
            rgba(r, g, b, 0x80)
        })
        .collect()
}

fn sixteen_colors() -> Vec<u8> {
    (0..16u32)
        .flat_map(|i| {
            let hue = i as f32 / 16.0 * std::f32::consts::TAU;
            let ch = |phase: f32| ((hue + phase).sin() * 0.5 + 0.5) * 255.0;
            rgba(ch(0.0) as u8, ch(2.1) as u8, ch(4.2) as u8, 0x80)
        })
        .collect()
}
