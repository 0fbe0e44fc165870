//! # User Heap Facade
//!
//! [`UserHeap`] ties the [`OccupancyTable`] to the outside world: it rounds
//! requests to whole pages, checks capacity, asks the [`PlacementSource`] which
//! strategy to run, commits the result to the table and finally tells the
//! [`KernelMemory`] service which range to map or unmap.
//!
//! Every failure is reported before anything is mutated, so on `Err` the table,
//! the free-space counter and the kernel are exactly as they were.
//!
//! ## Example
//! ```rust
//! use uheap::{KernelMemory, PlacementPolicy, UserHeap, VirtualAddress};
//!
//! struct NoopKernel;
//!
//! impl KernelMemory for NoopKernel {
//!     fn map(&mut self, _: VirtualAddress, _: u64) {}
//!     fn unmap(&mut self, _: VirtualAddress, _: u64) {}
//!     fn copy_range(&mut self, _: VirtualAddress, _: VirtualAddress, _: u64) {}
//! }
//!
//! let base = VirtualAddress::new(0x8000_0000);
//! let mut heap = UserHeap::<_, _, 4>::new(base, NoopKernel, PlacementPolicy::FirstFit);
//!
//! let a = heap.allocate(8192).unwrap();
//! assert_eq!(a, base);
//! heap.release(a).unwrap();
//! assert_eq!(heap.free_bytes(), heap.capacity());
//! ```

use crate::addresses::{VirtualAddress, bytes_to_pages, pages_to_bytes, round_up_to_page};
use crate::kernel::KernelMemory;
use crate::occupancy::{OccupancyTable, PageEntry};
use crate::placement::{PlacementPolicy, PlacementSource};
use core::cmp::Ordering;
use log::{debug, trace, warn};

/// Page-granular heap over `PAGES` pages starting at `base`.
pub struct UserHeap<K, P, const PAGES: usize> {
    base: VirtualAddress,
    table: OccupancyTable<PAGES>,
    kernel: K,
    placement: P,
}

impl<K, P, const PAGES: usize> UserHeap<K, P, PAGES>
where
    K: KernelMemory,
    P: PlacementSource,
{
    /// Create an empty heap. Nothing is mapped until the first allocation.
    ///
    /// # Panics
    /// If `base` is not page-aligned.
    #[must_use]
    pub const fn new(base: VirtualAddress, kernel: K, placement: P) -> Self {
        assert!(base.is_page_aligned(), "heap base must be page-aligned");
        Self {
            base,
            table: OccupancyTable::new(),
            kernel,
            placement,
        }
    }

    #[inline]
    #[must_use]
    pub const fn base(&self) -> VirtualAddress {
        self.base
    }

    /// One past the last heap address.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> VirtualAddress {
        VirtualAddress::new(self.base.as_u64() + self.capacity())
    }

    /// Total size of the heap window in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> u64 {
        pages_to_bytes(PAGES)
    }

    #[inline]
    #[must_use]
    pub const fn free_bytes(&self) -> u64 {
        self.table.free_bytes()
    }

    #[inline]
    #[must_use]
    pub const fn table(&self) -> &OccupancyTable<PAGES> {
        &self.table
    }

    #[inline]
    #[must_use]
    pub const fn kernel(&self) -> &K {
        &self.kernel
    }

    #[inline]
    pub const fn kernel_mut(&mut self) -> &mut K {
        &mut self.kernel
    }

    #[inline]
    #[must_use]
    pub const fn placement(&self) -> &P {
        &self.placement
    }

    /// Size of the live block starting at `address`, if there is one.
    #[must_use]
    pub fn block_size(&self, address: VirtualAddress) -> Option<u64> {
        let index = self.page_index(address)?;
        match self.table.entry(index)? {
            PageEntry::Head { block_size } => Some(block_size),
            _ => None,
        }
    }

    /// Live blocks as `(start, size)` in address order.
    pub fn blocks(&self) -> impl Iterator<Item = (VirtualAddress, u64)> + '_ {
        self.table
            .entries()
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| match *entry {
                PageEntry::Head { block_size } => Some((self.address_of(index), block_size)),
                _ => None,
            })
    }

    /// Allocate at least `size` bytes, rounded up to whole pages.
    ///
    /// The placement source is asked once; its strategy picks the pages, and
    /// the kernel is asked to map them.
    ///
    /// # Errors
    /// - [`HeapError::ZeroSize`] for a zero-byte request.
    /// - [`HeapError::CapacityExceeded`] if the rounded size is not strictly
    ///   smaller than both the heap and the free space.
    /// - [`HeapError::NoSuitableBlock`] if the active strategy finds no free run.
    pub fn allocate(&mut self, size: u64) -> Result<VirtualAddress, HeapError> {
        let rounded = self.checked_request(size)?;
        let policy = self.placement.current_placement_policy();
        self.allocate_with(policy, rounded)
    }

    /// Release the block starting at `address`.
    ///
    /// Any address inside the block's first page is accepted; the kernel is
    /// asked to unmap from `address` for the block's full size.
    ///
    /// # Errors
    /// [`HeapError::InvalidAddress`] if `address` lies outside the heap, on a
    /// free page, or inside a block but not on its first page. Releasing the
    /// same block twice lands in the free-page case.
    pub fn release(&mut self, address: VirtualAddress) -> Result<(), HeapError> {
        let (index, size) = self.lookup_block(address)?;
        self.release_block(address, index, size);
        Ok(())
    }

    /// Change the size of the block at `address`.
    ///
    /// - `None` acts as [`allocate`](Self::allocate) and reports its errors.
    /// - A `new_size` of zero acts as [`release`](Self::release) and returns `Ok(None)`.
    /// - Shrinking always happens in place; the freed tail is unmapped.
    /// - Growing asks the placement source once. The block grows in place if
    ///   that policy would place the added pages right after the block; only
    ///   the added tail is mapped.
    /// - Otherwise a new block is allocated, the old contents are copied over
    ///   by the kernel and the old block is released. The new block is placed
    ///   by the same policy.
    ///
    /// On success the returned address replaces `address`.
    ///
    /// # Errors
    /// - [`HeapError::InvalidAddress`] if `address` is not a live block start.
    /// - [`HeapError::NoChange`] if the block can neither grow in place nor be
    ///   moved. The old block stays valid and untouched.
    pub fn resize(
        &mut self,
        address: Option<VirtualAddress>,
        new_size: u64,
    ) -> Result<Option<VirtualAddress>, HeapError> {
        let Some(address) = address else {
            return self.allocate(new_size).map(Some);
        };

        if new_size == 0 {
            self.release(address)?;
            return Ok(None);
        }

        let (index, old_size) = self.lookup_block(address)?;
        let Some(new_rounded) = round_up_to_page(new_size).filter(|&n| n < self.capacity())
        else {
            return Err(HeapError::NoChange);
        };

        let old_pages = bytes_to_pages(old_size);
        let new_pages = bytes_to_pages(new_rounded);

        match new_rounded.cmp(&old_size) {
            Ordering::Equal => Ok(Some(address)),
            Ordering::Less => {
                self.table.resize_block(index, old_pages, new_pages, new_rounded);
                let tail = self.address_of(index + new_pages);
                self.kernel.unmap(tail, old_size - new_rounded);
                debug!("Shrunk block at {address} to {new_rounded:#x} bytes");
                Ok(Some(address))
            }
            Ordering::Greater => {
                let policy = self.placement.current_placement_policy();
                if self.can_grow_in_place(policy, index, old_pages, new_pages) {
                    self.table.resize_block(index, old_pages, new_pages, new_rounded);
                    let tail = self.address_of(index + old_pages);
                    self.kernel.map(tail, new_rounded - old_size);
                    debug!("Grew block at {address} to {new_rounded:#x} bytes in place");
                    return Ok(Some(address));
                }

                let moved = self
                    .checked_request(new_size)
                    .and_then(|rounded| self.allocate_with(policy, rounded))
                    .map_err(|error| {
                        debug!("Cannot move block at {address} to {new_rounded:#x} bytes: {error}");
                        HeapError::NoChange
                    })?;
                let start = self.address_of(index);
                self.kernel.copy_range(start, moved, old_size);
                self.release_block(address, index, old_size);
                debug!("Moved block from {address} to {moved}");
                Ok(Some(moved))
            }
        }
    }

    /// Rounded size of a request that passes the size and capacity checks.
    fn checked_request(&self, size: u64) -> Result<u64, HeapError> {
        if size == 0 {
            return Err(HeapError::ZeroSize);
        }

        let free = self.table.free_bytes();
        let exceeded = |requested| HeapError::CapacityExceeded { requested, free };
        let rounded = round_up_to_page(size).ok_or_else(|| exceeded(size))?;
        if rounded >= self.capacity() || rounded >= free {
            return Err(exceeded(rounded));
        }
        Ok(rounded)
    }

    fn allocate_with(
        &mut self,
        policy: PlacementPolicy,
        rounded: u64,
    ) -> Result<VirtualAddress, HeapError> {
        let pages = bytes_to_pages(rounded);
        let Some(start) = policy.find(&self.table, pages) else {
            trace!("{policy:?}: no free run of {pages} pages");
            return Err(HeapError::NoSuitableBlock { pages });
        };
        trace!("{policy:?}: placing {pages} pages at index {start}");

        self.table.mark(start, pages, rounded);
        let address = self.address_of(start);
        self.kernel.map(address, rounded);

        debug!("Allocated {rounded:#x} bytes at {address}");
        Ok(address)
    }

    const fn address_of(&self, index: usize) -> VirtualAddress {
        VirtualAddress::new(self.base.as_u64() + pages_to_bytes(index))
    }

    fn page_index(&self, address: VirtualAddress) -> Option<usize> {
        let offset = address.align_down().offset_from(self.base)?;
        (offset < self.capacity()).then_some(bytes_to_pages(offset))
    }

    /// Page index and size of the block whose first page contains `address`.
    fn lookup_block(&self, address: VirtualAddress) -> Result<(usize, u64), HeapError> {
        let entry = self
            .page_index(address)
            .and_then(|index| Some((index, self.table.entry(index)?)));
        match entry {
            Some((index, PageEntry::Head { block_size })) => Ok((index, block_size)),
            Some((_, entry)) => {
                warn!("Rejecting {address}: page is {entry:?}, not a block start");
                Err(HeapError::InvalidAddress(address))
            }
            None => {
                warn!("Rejecting {address}: outside the heap");
                Err(HeapError::InvalidAddress(address))
            }
        }
    }

    fn release_block(&mut self, address: VirtualAddress, index: usize, size: u64) {
        self.table.clear(index, bytes_to_pages(size));
        self.kernel.unmap(address, size);
        debug!("Released {size:#x} bytes at {address}");
    }

    /// The pages right after the block are where `policy` would place the
    /// added pages, and the delta passes the capacity check.
    fn can_grow_in_place(
        &self,
        policy: PlacementPolicy,
        index: usize,
        old_pages: usize,
        new_pages: usize,
    ) -> bool {
        let added = new_pages - old_pages;
        pages_to_bytes(added) < self.table.free_bytes()
            && policy.find(&self.table, added) == Some(index + old_pages)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum HeapError {
    #[error("zero-sized allocation")]
    ZeroSize,
    #[error("request of {requested:#x} bytes exceeds the heap ({free:#x} bytes free)")]
    CapacityExceeded { requested: u64, free: u64 },
    #[error("no free run of {pages} pages")]
    NoSuitableBlock { pages: usize },
    #[error("{0} is not the start of a live heap block")]
    InvalidAddress(VirtualAddress),
    #[error("block could not be resized")]
    NoChange,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_info::memory::PAGE_SIZE;

    #[derive(Default)]
    struct CountingKernel {
        mapped: u64,
        unmapped: u64,
    }

    impl KernelMemory for CountingKernel {
        fn map(&mut self, _: VirtualAddress, size: u64) {
            self.mapped += size;
        }
        fn unmap(&mut self, _: VirtualAddress, size: u64) {
            self.unmapped += size;
        }
        fn copy_range(&mut self, _: VirtualAddress, _: VirtualAddress, _: u64) {}
    }

    const BASE: VirtualAddress = VirtualAddress::new(0x8000_0000);

    fn heap<const N: usize>() -> UserHeap<CountingKernel, PlacementPolicy, N> {
        UserHeap::new(BASE, CountingKernel::default(), PlacementPolicy::FirstFit)
    }

    #[test]
    fn page_index_covers_the_window_only() {
        let heap = heap::<4>();
        assert_eq!(heap.page_index(BASE), Some(0));
        assert_eq!(heap.page_index(BASE + PAGE_SIZE + 12), Some(1));
        assert_eq!(heap.page_index(BASE + 3 * PAGE_SIZE), Some(3));
        assert_eq!(heap.page_index(heap.end()), None);
        assert_eq!(heap.page_index(VirtualAddress::new(0x1000)), None);
    }

    #[test]
    fn unaligned_address_in_first_page_releases_block() {
        let mut heap = heap::<4>();
        let a = heap.allocate(2 * PAGE_SIZE).unwrap();
        heap.release(a + 123).unwrap();
        assert_eq!(heap.free_bytes(), heap.capacity());
        assert_eq!(heap.kernel().unmapped, 2 * PAGE_SIZE);
    }

    #[test]
    fn interior_page_is_not_a_block_start() {
        let mut heap = heap::<4>();
        let a = heap.allocate(2 * PAGE_SIZE).unwrap();
        let interior = a + PAGE_SIZE;
        assert_eq!(heap.release(interior), Err(HeapError::InvalidAddress(interior)));
        assert_eq!(heap.block_size(interior), None);
        assert_eq!(heap.block_size(a), Some(2 * PAGE_SIZE));
        assert_eq!(heap.kernel().unmapped, 0);
    }

    #[test]
    fn blocks_lists_heads_in_order() {
        let mut heap = heap::<8>();
        let a = heap.allocate(1).unwrap();
        let b = heap.allocate(3 * PAGE_SIZE).unwrap();
        let blocks: Vec<_> = heap.blocks().collect();
        assert_eq!(blocks, [(a, PAGE_SIZE), (b, 3 * PAGE_SIZE)]);
        assert_eq!(heap.kernel().mapped, 4 * PAGE_SIZE);
    }
}
