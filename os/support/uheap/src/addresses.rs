use core::fmt;
use core::ops::Add;
use kernel_info::memory::PAGE_SIZE;

/// Virtual address inside the calling process.
///
/// A thin `u64` wrapper so heap addresses cannot be confused with byte sizes
/// or page indices.
#[repr(transparent)]
#[derive(Copy, Clone, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct VirtualAddress(u64);

impl VirtualAddress {
    #[inline]
    #[must_use]
    pub const fn new(v: u64) -> Self {
        Self(v)
    }

    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Round down to the start of the containing page.
    #[inline]
    #[must_use]
    pub const fn align_down(self) -> Self {
        Self(self.0 & !(PAGE_SIZE - 1))
    }

    #[inline]
    #[must_use]
    pub const fn is_page_aligned(self) -> bool {
        self.0.is_multiple_of(PAGE_SIZE)
    }

    /// Byte distance from `base` to `self`, or `None` if `self` lies below `base`.
    #[inline]
    #[must_use]
    pub const fn offset_from(self, base: Self) -> Option<u64> {
        self.0.checked_sub(base.0)
    }
}

impl fmt::Debug for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VA(0x{:016X})", self.0)
    }
}

impl fmt::Display for VirtualAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

impl From<u64> for VirtualAddress {
    #[inline]
    fn from(v: u64) -> Self {
        Self::new(v)
    }
}

impl Add<u64> for VirtualAddress {
    type Output = Self;
    #[inline]
    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}

/// Round `bytes` up to a whole number of pages, or `None` on overflow.
#[inline]
#[must_use]
pub const fn round_up_to_page(bytes: u64) -> Option<u64> {
    bytes.checked_next_multiple_of(PAGE_SIZE)
}

/// Byte size of `pages` pages.
#[inline]
#[must_use]
pub const fn pages_to_bytes(pages: usize) -> u64 {
    pages as u64 * PAGE_SIZE
}

/// Number of pages in `bytes`, which must be a page multiple no larger than
/// a heap window (so the count fits the table's `usize` indices).
#[inline]
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub const fn bytes_to_pages(bytes: u64) -> usize {
    debug_assert!(bytes.is_multiple_of(PAGE_SIZE));
    (bytes / PAGE_SIZE) as usize
}
