#[repr(u64)]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Sysno {
    /// Write a single byte to a kernel-chosen “debug” sink.
    DebugWriteByte = 1,
    /// Back `[va, va + size)` of the calling process with fresh pages.
    ///
    /// `rdi` = page-aligned virtual address, `rsi` = size in bytes (page multiple).
    AllocateMem = 3,
    /// Unmap `[va, va + size)` and drop any page file copies of it.
    ///
    /// `rdi` = virtual address, `rsi` = size in bytes.
    FreeMem = 4,
    /// Copy `size` bytes from `src` to `dst` inside the calling process.
    ///
    /// `rdi` = source address, `rsi` = destination address, `rdx` = size in bytes.
    MoveMem = 5,
    /// Query the user heap placement strategy configured for this process.
    ///
    /// Returns one of the `UHEAP_PLACEMENT_*` values.
    UHeapPlacementStrategy = 6,
}

/// Returned by [`Sysno::UHeapPlacementStrategy`] for first-fit placement.
pub const UHEAP_PLACEMENT_FIRST_FIT: u64 = 1;

/// Returned by [`Sysno::UHeapPlacementStrategy`] for best-fit placement.
pub const UHEAP_PLACEMENT_BEST_FIT: u64 = 2;
