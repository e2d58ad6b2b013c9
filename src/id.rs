//! # Identifiers
//!
//! `PoolId` is a stable integer handle to a cell; valid across growth.

/// Stable handle to a cell owned by a [`crate::Pool`].
///
/// A `PoolId` returned by [`crate::Pool::alloc`] continues to resolve via
/// [`crate::Pool::get`] to the same logical cell until that cell is swept,
/// even if the pool's backing storage has since moved due to growth.
///
/// Cell payloads routinely need to store other cells' ids (a linked list
/// or graph built out of pool cells, say), so the raw `u32` is exposed via
/// [`PoolId::as_u32`]/[`PoolId::from_u32`] for that purpose. The pool
/// itself never inspects payload bytes — round-tripping an id through a
/// payload is entirely the caller's convention.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct PoolId(u32);

impl PoolId {
    /// Sentinel value meaning "no id". Distinguishable from every id a
    /// pool can actually hand out, since no pool can grow to `u32::MAX`
    /// cells.
    pub const NONE: PoolId = PoolId(u32::MAX);

    /// Wraps a raw slot index as a `PoolId`.
    #[inline]
    #[must_use]
    pub(crate) const fn from_index(index: usize) -> Self {
        // Pools never grow past u32::MAX slots; see Pool::grow.
        #[allow(clippy::cast_possible_truncation)]
        Self(index as u32)
    }

    /// Returns this id's slot index, for indexing into pool-internal arrays.
    #[inline]
    #[must_use]
    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }

    /// Returns `true` if this is the [`PoolId::NONE`] sentinel.
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == Self::NONE.0
    }

    /// Returns the raw id value, for storing inside a cell payload.
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Reconstructs a `PoolId` from a raw value previously obtained from
    /// [`PoolId::as_u32`] (typically read back out of a cell payload).
    #[inline]
    #[must_use]
    pub const fn from_u32(value: u32) -> Self {
        Self(value)
    }
}
