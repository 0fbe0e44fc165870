//! # Memory Layout

/// End of userspace VA range after which Kernel space begins.
pub const USERSPACE_END: u64 = 0xffff_0000_0000_0000;

/// Size of a single page in bytes; the unit of user heap accounting.
pub const PAGE_SIZE: u64 = 4096;

/// First address of the user heap window.
///
/// The kernel keeps this range unmapped until the process asks for pages
/// through the `AllocateMem` system call.
pub const USER_HEAP_START: u64 = 0x8000_0000;

/// One past the last address of the user heap window.
pub const USER_HEAP_MAX: u64 = 0xA000_0000;

/// Size of the user heap window in bytes.
pub const USER_HEAP_SIZE: u64 = USER_HEAP_MAX - USER_HEAP_START;

/// Number of pages in the user heap window.
#[allow(clippy::cast_possible_truncation)]
pub const USER_HEAP_PAGES: usize = (USER_HEAP_SIZE / PAGE_SIZE) as usize;

const _: () = {
    assert!(PAGE_SIZE.is_power_of_two());
    assert!(USER_HEAP_START.is_multiple_of(PAGE_SIZE));
    assert!(USER_HEAP_MAX.is_multiple_of(PAGE_SIZE));
    assert!(USER_HEAP_MAX > USER_HEAP_START);
    assert!(USER_HEAP_MAX <= USERSPACE_END);
    assert!(USER_HEAP_START != 0, "null must never be a heap address");
};
