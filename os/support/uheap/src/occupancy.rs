//! # Page Occupancy Table
//!
//! One entry per page of the heap window. A free page holds [`PageEntry::Free`];
//! an occupied page holds the **total byte size of the block that owns it**,
//! so every page of a block carries the same value. The first page of a block
//! is tagged [`PageEntry::Head`], the rest [`PageEntry::Body`]:
//!
//! ```text
//! index:   0      1      2      3      4      5
//!        ┌──────┬──────┬──────┬──────┬──────┬──────┐
//!        │ H 8K │ B 8K │ free │ H 4K │ free │ free │
//!        └──────┴──────┴──────┴──────┴──────┴──────┘
//!          block A      run   block B   run (len 2)
//! ```
//!
//! The table is the allocation registry: there is no other record of live
//! blocks. Alongside it the table keeps a free-space counter that always equals
//! `PAGE_SIZE × (number of free entries)`. Every mutation updates both.
//!
//! Mutating methods take indices the caller has already validated; an
//! out-of-range index panics.

use crate::addresses::pages_to_bytes;
use core::iter::FusedIterator;

/// State of a single page.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum PageEntry {
    #[default]
    Free,
    /// First page of a block of `block_size` bytes.
    Head { block_size: u64 },
    /// Any later page of a block of `block_size` bytes.
    Body { block_size: u64 },
}

impl PageEntry {
    #[inline]
    #[must_use]
    pub const fn is_free(&self) -> bool {
        matches!(self, Self::Free)
    }

    /// Size of the owning block, or `None` for a free page.
    #[inline]
    #[must_use]
    pub const fn block_size(&self) -> Option<u64> {
        match *self {
            Self::Free => None,
            Self::Head { block_size } | Self::Body { block_size } => Some(block_size),
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_block_start(&self) -> bool {
        matches!(self, Self::Head { .. })
    }
}

/// A maximal run of consecutive free pages.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FreeRun {
    /// Index of the first free page.
    pub start: usize,
    /// Number of free pages in the run.
    pub len: usize,
}

/// Per-page occupancy table over `PAGES` pages plus the free-space counter.
#[derive(Clone)]
pub struct OccupancyTable<const PAGES: usize> {
    entries: [PageEntry; PAGES],
    free_bytes: u64,
}

impl<const PAGES: usize> OccupancyTable<PAGES> {
    /// A table with every page free.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: [PageEntry::Free; PAGES],
            free_bytes: pages_to_bytes(PAGES),
        }
    }

    /// Number of pages tracked.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes currently unallocated.
    #[inline]
    #[must_use]
    pub const fn free_bytes(&self) -> u64 {
        self.free_bytes
    }

    #[inline]
    #[must_use]
    pub fn entry(&self, index: usize) -> Option<PageEntry> {
        self.entries.get(index).copied()
    }

    #[inline]
    #[must_use]
    pub const fn entries(&self) -> &[PageEntry] {
        &self.entries
    }

    /// Maximal free runs in ascending index order.
    #[must_use]
    pub fn free_runs(&self) -> FreeRuns<'_> {
        FreeRuns {
            entries: &self.entries,
            index: 0,
        }
    }

    /// Claim `[start, start + count)` for a block of `block_size` bytes.
    pub fn mark(&mut self, start: usize, count: usize, block_size: u64) {
        debug_assert!(
            self.entries[start..start + count].iter().all(PageEntry::is_free),
            "marking used pages"
        );
        self.tag(start, count, block_size);
        self.free_bytes -= pages_to_bytes(count);
    }

    /// Return `[start, start + count)` to the free pool.
    pub fn clear(&mut self, start: usize, count: usize) {
        let pages = &mut self.entries[start..start + count];
        debug_assert!(pages.iter().all(|e| !e.is_free()), "clearing free pages");
        pages.fill(PageEntry::Free);
        self.free_bytes += pages_to_bytes(count);
    }

    /// Grow or shrink the block at `start` from `old_pages` to `new_pages`,
    /// keeping its head in place and retagging every page with `block_size`.
    ///
    /// When growing, the pages past the old tail must be free.
    pub fn resize_block(
        &mut self,
        start: usize,
        old_pages: usize,
        new_pages: usize,
        block_size: u64,
    ) {
        if new_pages < old_pages {
            self.clear(start + new_pages, old_pages - new_pages);
        } else if new_pages > old_pages {
            debug_assert!(
                self.entries[start + old_pages..start + new_pages]
                    .iter()
                    .all(PageEntry::is_free),
                "growing into used pages"
            );
            self.free_bytes -= pages_to_bytes(new_pages - old_pages);
        }
        self.tag(start, new_pages, block_size);
    }

    fn tag(&mut self, start: usize, count: usize, block_size: u64) {
        let pages = &mut self.entries[start..start + count];
        if let Some((head, body)) = pages.split_first_mut() {
            *head = PageEntry::Head { block_size };
            body.fill(PageEntry::Body { block_size });
        }
    }
}

impl<const PAGES: usize> Default for OccupancyTable<PAGES> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the maximal free runs of an [`OccupancyTable`].
pub struct FreeRuns<'a> {
    entries: &'a [PageEntry],
    index: usize,
}

impl Iterator for FreeRuns<'_> {
    type Item = FreeRun;

    fn next(&mut self) -> Option<FreeRun> {
        let rest = self.entries.get(self.index..)?;
        let start = self.index + rest.iter().position(PageEntry::is_free)?;
        let len = self.entries[start..]
            .iter()
            .take_while(|entry| entry.is_free())
            .count();
        self.index = start + len;
        Some(FreeRun { start, len })
    }
}

impl FusedIterator for FreeRuns<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_info::memory::PAGE_SIZE;

    fn free_pages<const N: usize>(table: &OccupancyTable<N>) -> u64 {
        table.entries().iter().filter(|e| e.is_free()).count() as u64
    }

    #[test]
    fn new_table_is_all_free() {
        let table = OccupancyTable::<8>::new();
        assert_eq!(table.free_bytes(), 8 * PAGE_SIZE);
        assert_eq!(table.free_runs().collect::<Vec<_>>(), [FreeRun { start: 0, len: 8 }]);
    }

    #[test]
    fn mark_tags_head_and_body_with_block_size() {
        let mut table = OccupancyTable::<8>::new();
        table.mark(2, 3, 3 * PAGE_SIZE);

        assert_eq!(table.entry(1), Some(PageEntry::Free));
        assert_eq!(table.entry(2), Some(PageEntry::Head { block_size: 3 * PAGE_SIZE }));
        assert_eq!(table.entry(3), Some(PageEntry::Body { block_size: 3 * PAGE_SIZE }));
        assert_eq!(table.entry(4), Some(PageEntry::Body { block_size: 3 * PAGE_SIZE }));
        assert_eq!(table.entry(5), Some(PageEntry::Free));
        assert_eq!(table.entry(8), None);
        assert_eq!(table.free_bytes(), 5 * PAGE_SIZE);
        assert_eq!(table.free_bytes(), free_pages(&table) * PAGE_SIZE);
    }

    #[test]
    fn clear_restores_entries_and_counter() {
        let mut table = OccupancyTable::<8>::new();
        table.mark(0, 4, 4 * PAGE_SIZE);
        table.clear(0, 4);
        assert!(table.entries().iter().all(PageEntry::is_free));
        assert_eq!(table.free_bytes(), 8 * PAGE_SIZE);
    }

    #[test]
    fn adjacent_equal_blocks_stay_distinct() {
        let mut table = OccupancyTable::<4>::new();
        table.mark(0, 2, 2 * PAGE_SIZE);
        table.mark(2, 2, 2 * PAGE_SIZE);
        assert!(table.entry(0).is_some_and(|e| e.is_block_start()));
        assert!(table.entry(2).is_some_and(|e| e.is_block_start()));
        assert!(table.entry(3).is_some_and(|e| !e.is_block_start()));
        assert_eq!(table.free_runs().next(), None);
    }

    #[test]
    fn free_runs_reports_maximal_runs_in_order() {
        let mut table = OccupancyTable::<10>::new();
        table.mark(0, 1, PAGE_SIZE);
        table.mark(3, 2, 2 * PAGE_SIZE);
        table.mark(9, 1, PAGE_SIZE);

        let runs: Vec<_> = table.free_runs().collect();
        assert_eq!(
            runs,
            [FreeRun { start: 1, len: 2 }, FreeRun { start: 5, len: 4 }]
        );
    }

    #[test]
    fn resize_block_grows_and_shrinks_at_tail() {
        let mut table = OccupancyTable::<8>::new();
        table.mark(1, 2, 2 * PAGE_SIZE);

        table.resize_block(1, 2, 4, 4 * PAGE_SIZE);
        assert_eq!(table.entry(1), Some(PageEntry::Head { block_size: 4 * PAGE_SIZE }));
        assert_eq!(table.entry(4), Some(PageEntry::Body { block_size: 4 * PAGE_SIZE }));
        assert_eq!(table.free_bytes(), 4 * PAGE_SIZE);

        table.resize_block(1, 4, 1, PAGE_SIZE);
        assert_eq!(table.entry(1), Some(PageEntry::Head { block_size: PAGE_SIZE }));
        assert_eq!(table.entry(2), Some(PageEntry::Free));
        assert_eq!(table.free_bytes(), 7 * PAGE_SIZE);
        assert_eq!(table.free_bytes(), free_pages(&table) * PAGE_SIZE);
    }
}
