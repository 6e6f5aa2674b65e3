/// Byte offset into VRAM.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VramAddr(pub u32);

impl VramAddr {
    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }
}

/// Residency of a texture or palette.
///
/// `Failed` is sticky: it marks a resource that can never be placed (larger
/// than the whole pool, or an unsupported format) so later draws skip it
/// without retrying. Flushes reset only `Resident` slots.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum VramSlot {
    #[default]
    Unset,
    Failed,
    Resident(VramAddr),
}

impl VramSlot {
    #[inline]
    pub fn addr(self) -> Option<VramAddr> {
        match self {
            VramSlot::Resident(a) => Some(a),
            VramSlot::Unset | VramSlot::Failed => None,
        }
    }
}
