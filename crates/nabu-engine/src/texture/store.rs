use crate::vram::{Resident, VramSlot};

use super::{Clut, Texture};

/// Handle to a texture in a [`TextureStore`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct TextureId(pub(crate) u32);

/// Handle to a palette in a [`TextureStore`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ClutId(pub(crate) u32);

/// Arena owning every texture and palette the renderer may draw.
///
/// Resources are never removed; handles stay valid for the store's lifetime.
#[derive(Debug, Default, Clone)]
pub struct TextureStore {
    textures: Vec<Texture>,
    cluts: Vec<Clut>,
}

impl TextureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_texture(&mut self, texture: Texture) -> TextureId {
        let id = TextureId(self.textures.len() as u32);
        self.textures.push(texture);
        id
    }

    pub fn insert_clut(&mut self, clut: Clut) -> ClutId {
        let id = ClutId(self.cluts.len() as u32);
        self.cluts.push(clut);
        id
    }

    #[inline]
    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0 as usize)
    }

    #[inline]
    pub fn texture_mut(&mut self, id: TextureId) -> Option<&mut Texture> {
        self.textures.get_mut(id.0 as usize)
    }

    #[inline]
    pub fn clut(&self, id: ClutId) -> Option<&Clut> {
        self.cluts.get(id.0 as usize)
    }

    #[inline]
    pub fn clut_mut(&mut self, id: ClutId) -> Option<&mut Clut> {
        self.cluts.get_mut(id.0 as usize)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn clut_count(&self) -> usize {
        self.cluts.len()
    }

    /// Resets the residency of every listed resource to `Unset`.
    ///
    /// Called with the allocator ledger on flush; `Failed` slots are never in
    /// the ledger and keep their state.
    pub fn invalidate(&mut self, ledger: &[Resident]) {
        for entry in ledger {
            match *entry {
                Resident::Texture(id) => {
                    if let Some(tex) = self.texture_mut(id) {
                        tex.vram = VramSlot::Unset;
                        tex.vram_clut = VramSlot::Unset;
                    }
                }
                Resident::Clut(id) => {
                    if let Some(clut) = self.clut_mut(id) {
                        clut.vram = VramSlot::Unset;
                    }
                }
            }
        }
    }
}
