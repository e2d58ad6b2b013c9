//! # Pool
//!
//! The mark-and-sweep cell pool itself: identifier table, free-list
//! allocator, collector, and the storage/provider glue that unifies
//! growable and fixed pools behind one type.

use tracing::{debug, trace, warn};

use crate::error::PoolError;
use crate::id::PoolId;
use crate::mark::MarkCtx;
use crate::provider::MemoryProvider;

/// Bookkeeping overhead (in bytes) reserved out of a fixed pool's backing
/// region before computing how many cells fit. Mirrors the reference
/// implementation's pool descriptor size, so a fixed region sized as
/// `overhead + n * cell_size` yields exactly `n` cells.
const FIXED_POOL_OVERHEAD_BYTES: usize = 88;

/// A pool's backing cell storage: either owned by the pool (growable) or
/// borrowed from the caller for the pool's lifetime (fixed).
enum Storage<'a> {
    /// Pool-owned storage, resized through a [`MemoryProvider`] on growth.
    Owned(Vec<u8>),
    /// Caller-owned storage. Never grows; the pool borrows it for as long
    /// as the pool exists and never otherwise touches it (no release on
    /// drop).
    Borrowed(&'a mut [u8]),
}

impl<'a> Storage<'a> {
    fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Owned(buf) => buf,
            Storage::Borrowed(buf) => buf,
        }
    }

    fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            Storage::Owned(buf) => buf,
            Storage::Borrowed(buf) => buf,
        }
    }
}

/// An embeddable mark-and-sweep pool of fixed-size cells.
///
/// Construct with [`Pool::new_growable`] or [`Pool::new_fixed`]. Cells are
/// requested with [`Pool::alloc`] and addressed with [`Pool::get`] /
/// [`Pool::get_mut`]; unreachable cells are reclaimed by [`Pool::force_gc`]
/// or automatically when [`Pool::alloc`] finds the free list empty.
///
/// Not thread-safe: use one pool per thread, or synchronize externally.
pub struct Pool<'a> {
    cell_size: usize,
    storage: Storage<'a>,
    capacity: usize,
    /// `true` for slots currently owned by the caller (returned by `alloc`
    /// and not yet swept). Lets sweep tell "allocated but unmarked" apart
    /// from "already on the free list" without a free-list membership scan.
    allocated: Vec<bool>,
    /// Mark bitmap; meaningful only during a collection.
    marks: Vec<bool>,
    free_head: PoolId,
    /// Parallel free-list link array: `free_next[id]` is the next free id
    /// after `id`, or `PoolId::NONE`. Kept out-of-band from cell payload
    /// bytes so no cell size is ever too small to hold a free-list link.
    free_next: Vec<PoolId>,
    /// `None` for fixed pools, which can never grow.
    provider: Option<Box<dyn MemoryProvider>>,
    mark_callback: Box<dyn FnMut(&mut MarkCtx<'_>) -> i32>,
    free_hook: Box<dyn FnMut(PoolId, &[u8])>,
}

impl<'a> Pool<'a> {
    /// Creates a growable pool with `initial_capacity` cells of
    /// `cell_size` bytes each, all free and zeroed.
    ///
    /// `provider` is invoked to grow storage when [`Pool::alloc`] finds
    /// both the free list empty and a collection unable to free anything,
    /// and once more (with `new_size == 0`) when the pool is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ZeroCellSize`] if `cell_size == 0`, or
    /// [`PoolError::ZeroCapacity`] if `initial_capacity == 0`.
    pub fn new_growable(
        cell_size: usize,
        initial_capacity: usize,
        provider: Box<dyn MemoryProvider>,
        mark_callback: Box<dyn FnMut(&mut MarkCtx<'_>) -> i32>,
        free_hook: Box<dyn FnMut(PoolId, &[u8])>,
    ) -> Result<Pool<'static>, PoolError> {
        if cell_size == 0 {
            return Err(PoolError::ZeroCellSize);
        }
        if initial_capacity == 0 {
            return Err(PoolError::ZeroCapacity);
        }

        let buf = vec![0u8; cell_size * initial_capacity];
        let mut pool = Pool {
            cell_size,
            storage: Storage::Owned(buf),
            capacity: initial_capacity,
            allocated: vec![false; initial_capacity],
            marks: vec![false; initial_capacity],
            free_head: PoolId::NONE,
            free_next: vec![PoolId::NONE; initial_capacity],
            provider: Some(provider),
            mark_callback,
            free_hook,
        };
        pool.push_range_onto_free_list(0, initial_capacity);
        trace!(cell_size, initial_capacity, "growable pool constructed");
        Ok(pool)
    }

    /// Creates a fixed pool backed by `storage`, which the caller
    /// continues to own for the pool's entire lifetime. The pool never
    /// grows; when collection frees nothing, [`Pool::alloc`] reports
    /// exhaustion.
    ///
    /// Capacity is the largest number of `cell_size`-byte cells that fit
    /// in `storage` after reserving bookkeeping overhead; `storage` must
    /// be large enough for at least one cell.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::ZeroCellSize`] if `cell_size == 0`, or
    /// [`PoolError::InsufficientStorage`] if `storage` cannot hold even
    /// one cell after overhead.
    pub fn new_fixed(
        cell_size: usize,
        storage: &'a mut [u8],
        mark_callback: Box<dyn FnMut(&mut MarkCtx<'_>) -> i32>,
        free_hook: Box<dyn FnMut(PoolId, &[u8])>,
    ) -> Result<Pool<'a>, PoolError> {
        if cell_size == 0 {
            return Err(PoolError::ZeroCellSize);
        }
        let available = storage.len();
        let usable = available.saturating_sub(FIXED_POOL_OVERHEAD_BYTES);
        let capacity = usable / cell_size;
        if capacity == 0 {
            return Err(PoolError::InsufficientStorage {
                required: FIXED_POOL_OVERHEAD_BYTES + cell_size,
                available,
            });
        }

        let cell_bytes = capacity * cell_size;
        storage[..cell_bytes].fill(0);
        let mut pool = Pool {
            cell_size,
            storage: Storage::Borrowed(&mut storage[..cell_bytes]),
            capacity,
            allocated: vec![false; capacity],
            marks: vec![false; capacity],
            free_head: PoolId::NONE,
            free_next: vec![PoolId::NONE; capacity],
            provider: None,
            mark_callback,
            free_hook,
        };
        pool.push_range_onto_free_list(0, capacity);
        trace!(cell_size, capacity, "fixed pool constructed");
        Ok(pool)
    }

    /// Returns the current total number of slots (allocated plus free).
    ///
    /// Monotonically non-decreasing across a growable pool's lifetime;
    /// constant for a fixed pool.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.capacity
    }

    /// Requests a fresh cell, returning its id, or [`PoolId::NONE`] if the
    /// pool is exhausted.
    ///
    /// The returned cell's payload is zeroed. Tries, in order: the free
    /// list, then a collection (which may free cells), then growth
    /// (growable pools only).
    pub fn alloc(&mut self) -> PoolId {
        if let Some(id) = self.pop_free() {
            return id;
        }

        let _ = self.collect();
        if let Some(id) = self.pop_free() {
            return id;
        }

        if self.grow() {
            if let Some(id) = self.pop_free() {
                return id;
            }
        }

        warn!(capacity = self.capacity, "pool exhausted");
        PoolId::NONE
    }

    /// Returns the payload bytes for `id`, or `None` if `id` is out of
    /// range.
    ///
    /// Valid for free cells too; callers must not rely on a free cell's
    /// contents. The returned slice borrows `self` and so cannot outlive
    /// the next call that may allocate, grow, or collect.
    #[must_use]
    pub fn get(&self, id: PoolId) -> Option<&[u8]> {
        let i = id.index();
        if i >= self.capacity {
            return None;
        }
        let start = i * self.cell_size;
        Some(&self.storage.as_slice()[start..start + self.cell_size])
    }

    /// Mutable counterpart to [`Pool::get`].
    pub fn get_mut(&mut self, id: PoolId) -> Option<&mut [u8]> {
        let i = id.index();
        if i >= self.capacity {
            return None;
        }
        let start = i * self.cell_size;
        let cell_size = self.cell_size;
        Some(&mut self.storage.as_mut_slice()[start..start + cell_size])
    }

    /// Runs one full collection unconditionally: clear marks, run the
    /// mark callback, sweep unmarked allocated cells.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::MarkCallbackFailed`] if the mark callback
    /// returned non-zero; the sweep is skipped for that cycle, but the
    /// pool remains usable and a later call may succeed.
    pub fn force_gc(&mut self) -> Result<(), PoolError> {
        self.collect()
    }

    /// Clear, mark, (maybe) sweep. Shared by `alloc`'s exhaustion path and
    /// `force_gc`.
    fn collect(&mut self) -> Result<(), PoolError> {
        trace!("collection: clear");
        for m in &mut self.marks {
            *m = false;
        }

        trace!("collection: mark");
        let status = {
            let mut ctx = MarkCtx {
                cells: self.storage.as_slice(),
                cell_size: self.cell_size,
                marks: &mut self.marks,
            };
            (self.mark_callback)(&mut ctx)
        };
        if status != 0 {
            warn!(status, "mark callback failed, sweep skipped");
            return Err(PoolError::MarkCallbackFailed(status));
        }

        trace!("collection: sweep");
        let mut swept = 0usize;
        for i in 0..self.capacity {
            if self.allocated[i] && !self.marks[i] {
                let id = PoolId::from_index(i);
                let start = i * self.cell_size;
                let end = start + self.cell_size;
                {
                    let cell = &self.storage.as_slice()[start..end];
                    (self.free_hook)(id, cell);
                }
                self.allocated[i] = false;
                self.push_free(id);
                swept += 1;
            }
        }
        trace!(swept, "collection: done");
        Ok(())
    }

    /// Doubles capacity via the memory provider. Returns `false` for fixed
    /// pools, or if the provider refuses.
    fn grow(&mut self) -> bool {
        let Some(provider) = self.provider.as_mut() else {
            return false;
        };
        let old_capacity = self.capacity;
        let Some(new_capacity) = old_capacity.checked_mul(2).filter(|&c| c > old_capacity) else {
            return false;
        };
        let new_size = new_capacity * self.cell_size;

        let resized = match &mut self.storage {
            Storage::Owned(buf) => {
                let old_buf = std::mem::take(buf);
                match provider.resize(old_buf, new_size) {
                    Some(new_buf) => {
                        *buf = new_buf;
                        true
                    }
                    None => false,
                }
            }
            Storage::Borrowed(_) => false,
        };
        if !resized {
            warn!(old_capacity, new_capacity, "provider refused growth");
            return false;
        }

        self.allocated.resize(new_capacity, false);
        self.marks.resize(new_capacity, false);
        self.free_next.resize(new_capacity, PoolId::NONE);
        self.capacity = new_capacity;
        self.push_range_onto_free_list(old_capacity, new_capacity);
        debug!(old_capacity, new_capacity, "pool grown");
        true
    }

    /// Pushes `[start, end)` onto the free list in ascending order, so
    /// that popping the list hands out ids 0, 1, 2, ... in order when no
    /// cell has been freed out of sequence.
    fn push_range_onto_free_list(&mut self, start: usize, end: usize) {
        for i in (start..end).rev() {
            self.free_next[i] = self.free_head;
            self.free_head = PoolId::from_index(i);
        }
    }

    /// Pushes a single id onto the free list head.
    fn push_free(&mut self, id: PoolId) {
        self.free_next[id.index()] = self.free_head;
        self.free_head = id;
    }

    /// Pops the free list head, zeroing its payload and marking it
    /// allocated. Returns `None` if the free list is empty.
    fn pop_free(&mut self) -> Option<PoolId> {
        if self.free_head.is_none() {
            return None;
        }
        let id = self.free_head;
        let i = id.index();
        self.free_head = self.free_next[i];
        self.free_next[i] = PoolId::NONE;
        self.allocated[i] = true;

        let start = i * self.cell_size;
        let cell_size = self.cell_size;
        self.storage.as_mut_slice()[start..start + cell_size].fill(0);
        Some(id)
    }
}

impl<'a> Drop for Pool<'a> {
    fn drop(&mut self) {
        if let (Storage::Owned(buf), Some(provider)) = (&mut self.storage, self.provider.as_mut())
        {
            let owned = std::mem::take(buf);
            let _ = provider.resize(owned, 0);
        }
    }
}
