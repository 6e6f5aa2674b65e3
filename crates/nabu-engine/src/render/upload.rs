use std::fmt;

use crate::gs::{GsBackend, Transfer, TransferKind};
use crate::texture::{ClutId, TextureId, TextureStore};
use crate::vram::{
    buffer_width, clut_layout, texture_size, AllocError, FormatError, Placement, Resident, VramAddr,
    VramAllocator, VramSlot,
};

use super::renderer::{flush_pool, reclaim_with};
use super::Renderer;

/// Why a texture or palette could not be made resident.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum UploadError {
    UnknownTexture(TextureId),
    UnknownClut(ClutId),
    /// The resource failed permanently on an earlier attempt.
    Failed,
    Format(FormatError),
    Alloc(AllocError),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::UnknownTexture(id) => write!(f, "unknown texture {id:?}"),
            UploadError::UnknownClut(id) => write!(f, "unknown palette {id:?}"),
            UploadError::Failed => f.write_str("resource previously failed to upload"),
            UploadError::Format(e) => write!(f, "unsupported format: {e}"),
            UploadError::Alloc(e) => write!(f, "vram: {e}"),
        }
    }
}

impl std::error::Error for UploadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UploadError::Format(e) => Some(e),
            UploadError::Alloc(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FormatError> for UploadError {
    fn from(e: FormatError) -> Self {
        UploadError::Format(e)
    }
}

impl From<AllocError> for UploadError {
    fn from(e: AllocError) -> Self {
        UploadError::Alloc(e)
    }
}

impl<B: GsBackend> Renderer<B> {
    /// Makes `id` (and its palette) resident. `false` means draws using it
    /// should be skipped.
    pub fn prepare_texture(&mut self, id: TextureId) -> bool {
        match self.upload_texture(id) {
            Ok(_) => true,
            Err(e) => {
                log::trace!("texture {id:?} not drawable: {e}");
                false
            }
        }
    }

    /// Ensures the texture is resident, uploading it (palette first) if needed.
    ///
    /// No-op when it already is. May flush VRAM mid-frame to make room.
    pub fn upload_texture(&mut self, id: TextureId) -> Result<VramAddr, UploadError> {
        self.uploader().texture(id)
    }

    /// Ensures the palette is resident. Shared palettes are uploaded once per
    /// VRAM epoch no matter how many textures reference them.
    pub fn upload_clut(&mut self, id: ClutId) -> Result<VramAddr, UploadError> {
        self.uploader().clut(id)
    }

    fn uploader(&mut self) -> Uploader<'_, B> {
        Uploader {
            backend: &mut self.backend,
            store: &mut self.store,
            vram: &mut self.vram,
        }
    }
}

/// Disjoint borrows of the pieces an upload touches.
struct Uploader<'a, B: GsBackend> {
    backend: &'a mut B,
    store: &'a mut TextureStore,
    vram: &'a mut VramAllocator,
}

impl<B: GsBackend> Uploader<'_, B> {
    fn clut(&mut self, id: ClutId) -> Result<VramAddr, UploadError> {
        let clut = self.store.clut(id).ok_or(UploadError::UnknownClut(id))?;
        match clut.vram() {
            VramSlot::Resident(addr) => return Ok(addr),
            VramSlot::Failed => return Err(UploadError::Failed),
            VramSlot::Unset => {}
        }

        let layout = match clut_layout(clut.depth(), clut.color()) {
            Ok(layout) => layout,
            Err(e) => {
                log::warn!("palette {id:?}: {e}");
                return Err(self.fail_clut(id, e.into()));
            }
        };

        let placed = {
            let Self { backend, store, vram } = self;
            vram.allocate(layout.size, Resident::Clut(id), reclaim_with(&mut **backend, &mut **store))
        };
        let alloc = match placed {
            Ok(alloc) => alloc,
            Err(e @ AllocError::TooLarge { .. }) => {
                log::warn!("palette {id:?}: {e}");
                return Err(self.fail_clut(id, e.into()));
            }
            Err(e) => return Err(e.into()),
        };
        if alloc.flushed {
            log::debug!("vram: palette {id:?} placed at the pool base after a mid-frame flush");
        }
        log::trace!("vram: palette {id:?} at {:#x}, {} bytes", alloc.addr.get(), alloc.size);

        let clut = self.store.clut_mut(id).ok_or(UploadError::UnknownClut(id))?;
        clut.vram = VramSlot::Resident(alloc.addr);

        let entries = clut.entries();
        self.backend.transfer(&Transfer {
            data: entries.get(..layout.size as usize).unwrap_or(entries),
            addr: alloc.addr,
            width: layout.width,
            height: layout.height,
            format: clut.color(),
            buffer_width: 1,
            kind: TransferKind::Palette,
        });
        Ok(alloc.addr)
    }

    fn texture(&mut self, id: TextureId) -> Result<VramAddr, UploadError> {
        let tex = self.store.texture(id).ok_or(UploadError::UnknownTexture(id))?;
        match tex.vram() {
            VramSlot::Resident(addr) => return Ok(addr),
            VramSlot::Failed => return Err(UploadError::Failed),
            VramSlot::Unset => {}
        }

        let (width, height, format, clut) = (tex.width(), tex.height(), tex.format(), tex.clut());
        if format.is_indexed() && clut.is_none() {
            let e = FormatError::MissingClut(format);
            log::warn!("texture {id:?}: {e}");
            return Err(self.fail_texture(id, e.into()));
        }

        if let Some(clut) = clut {
            self.attach_clut(id, clut)?;
        }

        let size = texture_size(width, height, format);
        let (rounded, placement) = match self.vram.plan(size) {
            Ok(plan) => plan,
            Err(e) => {
                log::warn!("texture {id:?} ({width}x{height} {format:?}): {e}");
                return Err(self.fail_texture(id, e.into()));
            }
        };

        if placement == Placement::NeedsFlush {
            log::debug!(
                "vram: texture {id:?} needs {rounded} bytes, {} free; flushing mid-frame",
                self.vram.pool().available()
            );
            flush_pool(&mut *self.backend, &mut *self.store, &mut *self.vram);
            // The flush dropped the palette as well.
            if let Some(clut) = clut {
                self.attach_clut(id, clut)?;
            }
        }

        let addr = self.vram.commit(rounded, Resident::Texture(id))?;
        let tex = self.store.texture_mut(id).ok_or(UploadError::UnknownTexture(id))?;
        tex.vram = VramSlot::Resident(addr);

        let pixels = tex.pixels();
        self.backend.transfer(&Transfer {
            data: pixels.get(..size as usize).unwrap_or(pixels),
            addr,
            width,
            height,
            format,
            buffer_width: buffer_width(width, format),
            kind: if clut.is_some() { TransferKind::Indexed } else { TransferKind::Direct },
        });
        Ok(addr)
    }

    /// Uploads the palette if needed and records its address on the texture.
    fn attach_clut(&mut self, id: TextureId, clut: ClutId) -> Result<(), UploadError> {
        let addr = self.clut(clut)?;
        if let Some(tex) = self.store.texture_mut(id) {
            tex.vram_clut = VramSlot::Resident(addr);
        }
        Ok(())
    }

    /// Marks the texture permanently failed. A palette address attached
    /// earlier in this call is dropped with it, since it only lives until the
    /// next flush.
    fn fail_texture(&mut self, id: TextureId, err: UploadError) -> UploadError {
        if let Some(tex) = self.store.texture_mut(id) {
            tex.vram = VramSlot::Failed;
            tex.vram_clut = VramSlot::Unset;
        }
        err
    }

    fn fail_clut(&mut self, id: ClutId, err: UploadError) -> UploadError {
        if let Some(clut) = self.store.clut_mut(id) {
            clut.vram = VramSlot::Failed;
        }
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gs::{GsCall, RecordingBackend};
    use crate::render::RenderInit;
    use crate::texture::{Clut, Texture};
    use crate::vram::PixelFormat;

    fn renderer(vram: u32) -> Renderer<RecordingBackend> {
        let mut r = Renderer::new(
            RecordingBackend::with_vram(vram),
            RenderInit { vsync: false, ..RenderInit::default() },
        );
        r.backend_mut().take_calls();
        r
    }

    fn ct32(r: &mut Renderer<RecordingBackend>, w: u32, h: u32) -> TextureId {
        let tex = Texture::new(w, h, PixelFormat::Ct32, vec![0xAB; (w * h * 4) as usize]).unwrap();
        r.textures_mut().insert_texture(tex)
    }

    fn t4_clut(r: &mut Renderer<RecordingBackend>) -> ClutId {
        let clut = Clut::new(PixelFormat::T4, PixelFormat::Ct32, vec![0; 64]).unwrap();
        r.textures_mut().insert_clut(clut)
    }

    fn t4(r: &mut Renderer<RecordingBackend>, w: u32, h: u32, clut: ClutId) -> TextureId {
        let tex = Texture::new(w, h, PixelFormat::T4, vec![0; (w * h / 2) as usize]).unwrap();
        r.textures_mut().insert_texture(tex.with_clut(clut))
    }

    fn palette_transfers(r: &Renderer<RecordingBackend>) -> usize {
        r.backend().transfers().filter(|t| t.kind == TransferKind::Palette).count()
    }

    // ── residency ─────────────────────────────────────────────────────────

    #[test]
    fn prepare_is_idempotent() {
        let mut r = renderer(4096);
        let id = ct32(&mut r, 8, 8);
        assert!(r.prepare_texture(id));
        assert!(r.prepare_texture(id));
        assert_eq!(r.backend().transfers().count(), 1);
    }

    #[test]
    fn direct_texture_transfer_metadata() {
        let mut r = renderer(4096);
        let id = ct32(&mut r, 8, 4);
        r.prepare_texture(id);
        let t = *r.backend().transfers().next().unwrap();
        assert_eq!(t.addr, VramAddr(0));
        assert_eq!((t.width, t.height, t.len), (8, 4, 128));
        assert_eq!(t.buffer_width, 1);
        assert_eq!(t.kind, TransferKind::Direct);
    }

    #[test]
    fn shared_clut_uploads_once_per_epoch() {
        let mut r = renderer(16 * 1024);
        let clut = t4_clut(&mut r);
        let textures: Vec<_> = (0..3).map(|_| t4(&mut r, 16, 16, clut)).collect();

        for &id in &textures {
            assert!(r.prepare_texture(id));
        }

        assert_eq!(palette_transfers(&r), 1);
        let clut_addr = r.textures().clut(clut).unwrap().vram();
        assert_eq!(clut_addr, VramSlot::Resident(VramAddr(0)));
        for &id in &textures {
            assert_eq!(r.textures().texture(id).unwrap().vram_clut(), clut_addr);
        }

        let first = r.backend().transfers().next().unwrap();
        assert_eq!((first.width, first.height, first.buffer_width), (8, 2, 1));
        let indexed = r.backend().transfers().filter(|t| t.kind == TransferKind::Indexed).count();
        assert_eq!(indexed, 3);

        // Next epoch uploads it again, once.
        r.flush();
        for &id in &textures {
            r.prepare_texture(id);
        }
        assert_eq!(palette_transfers(&r), 2);
    }

    #[test]
    fn flush_resets_every_slot_and_rewinds() {
        let mut r = renderer(16 * 1024);
        let clut = t4_clut(&mut r);
        let a = t4(&mut r, 16, 16, clut);
        let b = ct32(&mut r, 8, 8);
        r.prepare_texture(a);
        r.prepare_texture(b);

        r.flush();

        let store = r.textures();
        assert_eq!(store.texture(a).unwrap().vram(), VramSlot::Unset);
        assert_eq!(store.texture(a).unwrap().vram_clut(), VramSlot::Unset);
        assert_eq!(store.texture(b).unwrap().vram(), VramSlot::Unset);
        assert_eq!(store.clut(clut).unwrap().vram(), VramSlot::Unset);
        assert_eq!(r.vram().pool().cursor(), VramAddr(0));
    }

    // ── failures ──────────────────────────────────────────────────────────

    #[test]
    fn oversize_texture_fails_once_and_is_not_retried() {
        let mut r = renderer(4096);
        let id = ct32(&mut r, 32, 32); // 4096 bytes, the whole pool

        assert_eq!(
            r.upload_texture(id),
            Err(UploadError::Alloc(AllocError::TooLarge { size: 4096, capacity: 4096 }))
        );
        assert_eq!(r.textures().texture(id).unwrap().vram(), VramSlot::Failed);

        assert_eq!(r.upload_texture(id), Err(UploadError::Failed));
        assert!(r.backend().calls().is_empty());
    }

    #[test]
    fn oversize_clut_fails_once_and_blocks_its_texture() {
        let mut r = renderer(1024);
        let clut = r
            .textures_mut()
            .insert_clut(Clut::new(PixelFormat::T8, PixelFormat::Ct32, vec![0; 1024]).unwrap());
        let tex = Texture::new(4, 4, PixelFormat::T8, vec![0; 16]).unwrap().with_clut(clut);
        let id = r.textures_mut().insert_texture(tex);

        assert_eq!(
            r.upload_texture(id),
            Err(UploadError::Alloc(AllocError::TooLarge { size: 1024, capacity: 1024 }))
        );
        assert_eq!(r.textures().clut(clut).unwrap().vram(), VramSlot::Failed);

        assert_eq!(r.upload_texture(id), Err(UploadError::Failed));
        assert_eq!(r.backend().transfers().count(), 0);
        assert!(!r.backend().calls().contains(&GsCall::Dispatch));
    }

    #[test]
    fn oversize_indexed_texture_drops_its_clut_address() {
        let mut r = renderer(4096);
        let clut = t4_clut(&mut r);
        let id = t4(&mut r, 128, 64, clut); // 4096 bytes of indices

        assert_eq!(
            r.upload_texture(id),
            Err(UploadError::Alloc(AllocError::TooLarge { size: 4096, capacity: 4096 }))
        );
        let tex = r.textures().texture(id).unwrap();
        assert_eq!(tex.vram(), VramSlot::Failed);
        assert_eq!(tex.vram_clut(), VramSlot::Unset);

        r.flush();
        let tex = r.textures().texture(id).unwrap();
        assert_eq!(tex.vram_clut(), VramSlot::Unset);
        assert_eq!(r.textures().clut(clut).unwrap().vram(), VramSlot::Unset);
    }

    #[test]
    fn failed_slot_survives_flush() {
        let mut r = renderer(4096);
        let id = ct32(&mut r, 32, 32);
        r.prepare_texture(id);
        r.flush();
        assert_eq!(r.textures().texture(id).unwrap().vram(), VramSlot::Failed);
    }

    #[test]
    fn unsupported_clut_blocks_texture() {
        let mut r = renderer(4096);
        let clut = r
            .textures_mut()
            .insert_clut(Clut::new(PixelFormat::T8, PixelFormat::T4, vec![0; 256]).unwrap());
        let tex = Texture::new(4, 4, PixelFormat::T8, vec![0; 16]).unwrap().with_clut(clut);
        let id = r.textures_mut().insert_texture(tex);

        assert_eq!(
            r.upload_texture(id),
            Err(UploadError::Format(FormatError::NotAPaletteColor(PixelFormat::T4)))
        );
        assert_eq!(r.textures().clut(clut).unwrap().vram(), VramSlot::Failed);
        assert_eq!(r.textures().texture(id).unwrap().vram(), VramSlot::Unset);
        assert_eq!(r.backend().transfers().count(), 0);
    }

    #[test]
    fn indexed_texture_without_clut_is_unsupported() {
        let mut r = renderer(4096);
        let id = r
            .textures_mut()
            .insert_texture(Texture::new(4, 4, PixelFormat::T8, vec![0; 16]).unwrap());
        assert_eq!(
            r.upload_texture(id),
            Err(UploadError::Format(FormatError::MissingClut(PixelFormat::T8)))
        );
        assert!(!r.prepare_texture(id));
    }

    // ── overflow ──────────────────────────────────────────────────────────

    #[test]
    fn overflow_reuploads_clut_before_texture() {
        let mut r = renderer(4096);
        let filler = ct32(&mut r, 32, 24); // 3072 bytes
        let clut = t4_clut(&mut r); // 64 -> 256 bytes
        let tex = t4(&mut r, 64, 32, clut); // 1024 bytes

        assert!(r.prepare_texture(filler));
        assert!(r.prepare_texture(tex));

        let transfers: Vec<_> = r.backend().transfers().map(|t| (t.kind, t.addr)).collect();
        assert_eq!(
            transfers,
            vec![
                (TransferKind::Direct, VramAddr(0)),
                (TransferKind::Palette, VramAddr(3072)),
                (TransferKind::Palette, VramAddr(0)),
                (TransferKind::Indexed, VramAddr(256)),
            ]
        );

        // The queue was drained before the pool was reused.
        let dispatch = r.backend().position(|c| *c == GsCall::Dispatch).unwrap();
        let second_palette = r
            .backend()
            .calls()
            .iter()
            .enumerate()
            .filter(|(_, c)| matches!(c, GsCall::Transfer(t) if t.kind == TransferKind::Palette))
            .nth(1)
            .map(|(i, _)| i)
            .unwrap();
        assert!(dispatch < second_palette);

        let store = r.textures();
        assert_eq!(store.texture(filler).unwrap().vram(), VramSlot::Unset);
        assert_eq!(store.texture(tex).unwrap().vram_clut(), store.clut(clut).unwrap().vram());
        assert_eq!(r.vram().epoch(), 1);
    }

    #[test]
    fn clut_overflow_flushes_through_the_same_reclaim() {
        let mut r = renderer(4096);
        let a = ct32(&mut r, 30, 32); // 3840 bytes
        let b = ct32(&mut r, 8, 8); // 256 bytes, pool now full
        let clut = t4_clut(&mut r);
        let tex = t4(&mut r, 16, 16, clut);

        assert!(r.prepare_texture(a));
        assert!(r.prepare_texture(b));
        assert!(r.prepare_texture(tex));

        let transfers: Vec<_> = r.backend().transfers().map(|t| (t.kind, t.addr)).collect();
        assert_eq!(
            transfers[2..],
            [(TransferKind::Palette, VramAddr(0)), (TransferKind::Indexed, VramAddr(256))]
        );
        let dispatch = r.backend().position(|c| *c == GsCall::Dispatch).unwrap();
        assert_eq!(dispatch, 2);
        assert_eq!(r.backend().count(|c| *c == GsCall::Dispatch), 1);

        let store = r.textures();
        assert_eq!(store.texture(a).unwrap().vram(), VramSlot::Unset);
        assert_eq!(store.texture(b).unwrap().vram(), VramSlot::Unset);
        assert_eq!(r.vram().ledger(), &[Resident::Clut(clut), Resident::Texture(tex)]);
        assert_eq!(r.vram().epoch(), 1);
    }

    #[test]
    fn texture_that_cannot_share_pool_with_its_clut_fails_transiently() {
        let mut r = renderer(4096);
        let clut = r
            .textures_mut()
            .insert_clut(Clut::new(PixelFormat::T8, PixelFormat::Ct32, vec![0; 1024]).unwrap());
        let tex = Texture::new(64, 56, PixelFormat::T8, vec![0; 64 * 56]).unwrap().with_clut(clut);
        let id = r.textures_mut().insert_texture(tex);

        assert_eq!(
            r.upload_texture(id),
            Err(UploadError::Alloc(AllocError::OutOfSpace { size: 3584, available: 3072 }))
        );
        assert_eq!(r.textures().texture(id).unwrap().vram(), VramSlot::Unset);
    }

    #[test]
    fn unknown_handles_are_reported() {
        let mut r = renderer(4096);
        assert_eq!(r.upload_texture(TextureId(7)), Err(UploadError::UnknownTexture(TextureId(7))));
        assert_eq!(r.upload_clut(ClutId(2)), Err(UploadError::UnknownClut(ClutId(2))));
    }
}
