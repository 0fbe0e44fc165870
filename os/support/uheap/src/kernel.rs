//! Kernel memory service as seen from the heap.
//!
//! The heap only does the bookkeeping; backing pages with memory is the
//! kernel's job. Calls are synchronous and have no failure path visible to
//! userland, so the methods return nothing.

use crate::addresses::VirtualAddress;

pub trait KernelMemory {
    /// Back `[start, start + size)` with memory. `size` is a page multiple.
    fn map(&mut self, start: VirtualAddress, size: u64);

    /// Release the memory and any page file storage of `[start, start + size)`.
    fn unmap(&mut self, start: VirtualAddress, size: u64);

    /// Copy `size` bytes from `src` to `dst`; both ranges are mapped.
    fn copy_range(&mut self, src: VirtualAddress, dst: VirtualAddress, size: u64);
}

impl<K: KernelMemory + ?Sized> KernelMemory for &mut K {
    #[inline]
    fn map(&mut self, start: VirtualAddress, size: u64) {
        (**self).map(start, size);
    }

    #[inline]
    fn unmap(&mut self, start: VirtualAddress, size: u64) {
        (**self).unmap(start, size);
    }

    #[inline]
    fn copy_range(&mut self, src: VirtualAddress, dst: VirtualAddress, size: u64) {
        (**self).copy_range(src, dst, size);
    }
}
