//! # Placement Strategies
//!
//! Both strategies are pure searches over the [`OccupancyTable`]: they return
//! the index of the first page of the chosen free run and leave the table
//! untouched. The allocation always takes the **leading** pages of the run;
//! whatever remains of an oversized run stays free.
//!
//! | Strategy  | Chosen run                                   | Cost                 |
//! |-----------|----------------------------------------------|----------------------|
//! | First-Fit | lowest-index run with `len >= pages`         | stops at first match |
//! | Best-Fit  | shortest run with `len >= pages`, lowest wins ties | full scan      |
//!
//! Which strategy runs is not the heap's decision. A [`PlacementSource`] is
//! asked once per allocation.

use crate::occupancy::{FreeRun, OccupancyTable};
use core::cell::Cell;

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum PlacementPolicy {
    #[default]
    FirstFit,
    BestFit,
}

impl PlacementPolicy {
    /// Run this policy's search for `pages` consecutive free pages.
    #[must_use]
    pub fn find<const N: usize>(self, table: &OccupancyTable<N>, pages: usize) -> Option<usize> {
        match self {
            Self::FirstFit => first_fit(table, pages),
            Self::BestFit => best_fit(table, pages),
        }
    }
}

/// Start of the first free run of at least `pages` pages.
#[must_use]
pub fn first_fit<const N: usize>(table: &OccupancyTable<N>, pages: usize) -> Option<usize> {
    debug_assert!(pages > 0);
    table
        .free_runs()
        .find(|run| run.len >= pages)
        .map(|run| run.start)
}

/// Start of the tightest free run of at least `pages` pages.
#[must_use]
pub fn best_fit<const N: usize>(table: &OccupancyTable<N>, pages: usize) -> Option<usize> {
    debug_assert!(pages > 0);
    // min_by_key keeps the first of several equal minima.
    table
        .free_runs()
        .filter(|run| run.len >= pages)
        .min_by_key(|run: &FreeRun| run.len)
        .map(|run| run.start)
}

/// Where the heap learns which [`PlacementPolicy`] is active.
pub trait PlacementSource {
    fn current_placement_policy(&self) -> PlacementPolicy;
}

impl PlacementSource for PlacementPolicy {
    #[inline]
    fn current_placement_policy(&self) -> PlacementPolicy {
        *self
    }
}

/// Switchable at runtime by whoever holds a shared reference.
impl PlacementSource for Cell<PlacementPolicy> {
    #[inline]
    fn current_placement_policy(&self) -> PlacementPolicy {
        self.get()
    }
}

impl PlacementSource for fn() -> PlacementPolicy {
    #[inline]
    fn current_placement_policy(&self) -> PlacementPolicy {
        self()
    }
}

impl<T: PlacementSource + ?Sized> PlacementSource for &T {
    #[inline]
    fn current_placement_policy(&self) -> PlacementPolicy {
        (**self).current_placement_policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel_info::memory::PAGE_SIZE;

    /// Free runs of length 2, 5 and 3, in that order:
    ///
    /// ```text
    /// 0  1 2  3  4 5 6 7 8  9  10 11 12  13 14 15
    /// U  . .  U  . . . . .  U  .  .  .   U  U  U
    /// ```
    fn fragmented() -> OccupancyTable<16> {
        let mut table = OccupancyTable::new();
        table.mark(0, 1, PAGE_SIZE);
        table.mark(3, 1, PAGE_SIZE);
        table.mark(9, 1, PAGE_SIZE);
        table.mark(13, 3, 3 * PAGE_SIZE);
        table
    }

    #[test]
    fn first_fit_takes_first_sufficient_run_even_if_looser() {
        let table = fragmented();
        assert_eq!(first_fit(&table, 3), Some(4));
        assert_eq!(first_fit(&table, 2), Some(1));
        assert_eq!(first_fit(&table, 1), Some(1));
        assert_eq!(first_fit(&table, 5), Some(4));
    }

    #[test]
    fn best_fit_takes_tightest_run() {
        let table = fragmented();
        assert_eq!(best_fit(&table, 3), Some(10));
        assert_eq!(best_fit(&table, 4), Some(4));
        assert_eq!(best_fit(&table, 2), Some(1));
    }

    #[test]
    fn best_fit_breaks_ties_by_lowest_index() {
        let mut table = OccupancyTable::<9>::new();
        // Runs: [0..2), [3..5), [6..9)
        table.mark(2, 1, PAGE_SIZE);
        table.mark(5, 1, PAGE_SIZE);
        assert_eq!(best_fit(&table, 2), Some(0));
        assert_eq!(best_fit(&table, 3), Some(6));
    }

    #[test]
    fn no_sufficient_run_fails() {
        let table = fragmented();
        assert_eq!(first_fit(&table, 6), None);
        assert_eq!(best_fit(&table, 6), None);

        let tiny = OccupancyTable::<2>::new();
        assert_eq!(first_fit(&tiny, 3), None);
        assert_eq!(best_fit(&tiny, 3), None);
    }

    #[test]
    fn searches_do_not_mutate_the_table() {
        let table = fragmented();
        let before = table.clone();
        let _ = first_fit(&table, 2);
        let _ = best_fit(&table, 2);
        assert_eq!(table.entries(), before.entries());
        assert_eq!(table.free_bytes(), before.free_bytes());
    }

    #[test]
    fn policy_dispatches_to_strategy() {
        let table = fragmented();
        assert_eq!(PlacementPolicy::FirstFit.find(&table, 3), Some(4));
        assert_eq!(PlacementPolicy::BestFit.find(&table, 3), Some(10));
    }

    #[test]
    fn placement_sources() {
        let cell = Cell::new(PlacementPolicy::FirstFit);
        let by_ref = &cell;
        assert_eq!(by_ref.current_placement_policy(), PlacementPolicy::FirstFit);
        cell.set(PlacementPolicy::BestFit);
        assert_eq!(by_ref.current_placement_policy(), PlacementPolicy::BestFit);

        let f: fn() -> PlacementPolicy = || PlacementPolicy::BestFit;
        assert_eq!(f.current_placement_policy(), PlacementPolicy::BestFit);
        assert_eq!(
            PlacementPolicy::default().current_placement_policy(),
            PlacementPolicy::FirstFit
        );
    }
}
