//! Kernel-backed collaborators for a process's own heap.
//!
//! [`SyscallKernelMemory`] forwards map/unmap/copy requests to the kernel's
//! memory manager, and [`KernelPlacementPolicy`] asks the kernel which
//! placement strategy the process was started with.
//!
//! The occupancy table of [`SyscallUserHeap`] has one entry per page of the
//! whole window, too large for a userland stack. Build it with the `const`
//! [`user_heap`] into a `static`, behind whatever lock the process uses.

use crate::addresses::VirtualAddress;
use crate::heap::UserHeap;
use crate::kernel::KernelMemory;
use crate::placement::{PlacementPolicy, PlacementSource};
use kernel_info::memory::{USER_HEAP_PAGES, USER_HEAP_START};
use stdlib::syscall::{sys_allocate_mem, sys_free_mem, sys_move_mem, sys_uheap_placement_strategy};
use stdlib::syscall_abi::{UHEAP_PLACEMENT_BEST_FIT, UHEAP_PLACEMENT_FIRST_FIT};

/// The process heap over the full user heap window.
pub type SyscallUserHeap = UserHeap<SyscallKernelMemory, KernelPlacementPolicy, USER_HEAP_PAGES>;

/// An empty heap over `[USER_HEAP_START, USER_HEAP_MAX)`.
#[must_use]
pub const fn user_heap() -> SyscallUserHeap {
    UserHeap::new(
        VirtualAddress::new(USER_HEAP_START),
        SyscallKernelMemory,
        KernelPlacementPolicy,
    )
}

#[derive(Debug, Copy, Clone, Default)]
pub struct SyscallKernelMemory;

impl KernelMemory for SyscallKernelMemory {
    #[inline]
    fn map(&mut self, start: VirtualAddress, size: u64) {
        sys_allocate_mem(start.as_u64(), size);
    }

    #[inline]
    fn unmap(&mut self, start: VirtualAddress, size: u64) {
        sys_free_mem(start.as_u64(), size);
    }

    #[inline]
    fn copy_range(&mut self, src: VirtualAddress, dst: VirtualAddress, size: u64) {
        sys_move_mem(src.as_u64(), dst.as_u64(), size);
    }
}

#[derive(Debug, Copy, Clone, Default)]
pub struct KernelPlacementPolicy;

impl PlacementSource for KernelPlacementPolicy {
    fn current_placement_policy(&self) -> PlacementPolicy {
        match sys_uheap_placement_strategy() {
            UHEAP_PLACEMENT_FIRST_FIT => PlacementPolicy::FirstFit,
            UHEAP_PLACEMENT_BEST_FIT => PlacementPolicy::BestFit,
            other => {
                log::warn!("Unknown placement strategy {other:#x}, using first fit");
                PlacementPolicy::FirstFit
            }
        }
    }
}
