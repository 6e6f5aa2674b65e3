use std::fmt;

use crate::texture::{ClutId, TextureId};

use super::{VramAddr, VramPool};

/// Ledger entry: a resource that received a placement since the last flush.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Resident {
    Texture(TextureId),
    Clut(ClutId),
}

/// Why a placement could not be made.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AllocError {
    /// The object can never fit, even in an empty pool. Permanent.
    TooLarge { size: u32, capacity: u32 },
    /// The object did not fit after reclaiming the whole pool.
    OutOfSpace { size: u32, available: u32 },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::TooLarge { size, capacity } => {
                write!(f, "allocation of {size} bytes is larger than VRAM ({capacity} bytes)")
            }
            AllocError::OutOfSpace { size, available } => {
                write!(f, "allocation of {size} bytes does not fit ({available} bytes free after flush)")
            }
        }
    }
}

impl std::error::Error for AllocError {}

/// Whether a sized request fits behind the cursor.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Placement {
    Fits,
    NeedsFlush,
}

/// A successful placement.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Allocation {
    pub addr: VramAddr,
    /// Block-rounded size that was reserved.
    pub size: u32,
    /// `true` if the pool had to be flushed to make room; every placement made
    /// before this call is gone.
    pub flushed: bool,
}

/// Bump allocator plus the ledger of everything it placed.
///
/// The ledger is an append-only list cleared by truncation on flush. Callers
/// provide the reclaim step (dispatching pending work and resetting the
/// resources' residency) as a closure receiving the ledger.
#[derive(Debug, Clone)]
pub struct VramAllocator {
    pool: VramPool,
    ledger: Vec<Resident>,
    epoch: u64,
}

impl VramAllocator {
    pub fn new(pool: VramPool) -> Self {
        Self { pool, ledger: Vec::new(), epoch: 0 }
    }

    #[inline]
    pub fn pool(&self) -> &VramPool {
        &self.pool
    }

    /// Resources placed since the last flush, in placement order.
    #[inline]
    pub fn ledger(&self) -> &[Resident] {
        &self.ledger
    }

    /// Number of flushes performed so far.
    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Sizes a request against the pool without placing it.
    ///
    /// Returns the block-rounded size and whether it fits behind the cursor
    /// or needs a flush first.
    pub fn plan(&self, size: u32) -> Result<(u32, Placement), AllocError> {
        let rounded = self.pool.round(size);
        if self.pool.exceeds_capacity(rounded) {
            return Err(AllocError::TooLarge { size: rounded, capacity: self.pool.capacity() });
        }
        let placement = if rounded > self.pool.available() {
            Placement::NeedsFlush
        } else {
            Placement::Fits
        };
        Ok((rounded, placement))
    }

    /// Places an already rounded request at the cursor and records `owner`.
    pub fn commit(&mut self, rounded: u32, owner: Resident) -> Result<VramAddr, AllocError> {
        let addr = self.pool.try_place(rounded).ok_or(AllocError::OutOfSpace {
            size: rounded,
            available: self.pool.available(),
        })?;
        self.ledger.push(owner);
        Ok(addr)
    }

    /// Reserves `size` bytes for `owner`.
    ///
    /// On overflow the whole pool is flushed through `reclaim` and the
    /// placement is retried once against the empty pool.
    pub fn allocate<F>(&mut self, size: u32, owner: Resident, reclaim: F) -> Result<Allocation, AllocError>
    where
        F: FnOnce(&[Resident]),
    {
        let (rounded, placement) = self.plan(size)?;
        let flushed = placement == Placement::NeedsFlush;
        if flushed {
            log::debug!(
                "vram: {rounded} bytes do not fit ({} free); flushing mid-frame",
                self.pool.available()
            );
            self.flush(reclaim);
        }
        let addr = self.commit(rounded, owner)?;
        Ok(Allocation { addr, size: rounded, flushed })
    }

    /// Reclaims the whole pool.
    ///
    /// `reclaim` sees every ledger entry exactly once, then the ledger is
    /// truncated and the cursor rewound to the pool base.
    pub fn flush<F>(&mut self, reclaim: F)
    where
        F: FnOnce(&[Resident]),
    {
        reclaim(&self.ledger);
        self.ledger.clear();
        self.pool.reset();
        self.epoch = self.epoch.wrapping_add(1);
    }
}
