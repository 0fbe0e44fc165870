//! # Page-Granular User Heap
//!
//! The userland half of the process heap. The kernel owns page tables and
//! backing memory; this crate decides *which* pages of the user heap window a
//! request gets and tells the kernel what to map and unmap.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 UserHeap (facade)                   │
//! │    • allocate / release / resize                    │
//! │    • page rounding and capacity checks              │
//! └───────┬───────────────────┬──────────────────┬──────┘
//!         │                   │                  │
//! ┌───────▼────────┐ ┌────────▼────────┐ ┌───────▼──────────┐
//! │ Placement      │ │ Occupancy Table │ │ KernelMemory     │
//! │ First-/Best-Fit│ │ + free counter  │ │ map / unmap /    │
//! │ (pure search)  │ │ (the registry)  │ │ copy_range       │
//! └───────▲────────┘ └─────────────────┘ └──────────────────┘
//!         │
//! ┌───────┴────────┐
//! │ PlacementSource│  asked once per allocation
//! └────────────────┘
//! ```
//!
//! ## Core Components
//!
//! ### Occupancy Table ([`occupancy`])
//! One entry per page. Free pages are empty; occupied pages carry the byte
//! size of their block, with the block's first page marked as its head. A
//! running free-space counter always matches the number of free entries.
//!
//! ### Placement ([`placement`])
//! First-Fit picks the lowest free run that is long enough, Best-Fit the
//! shortest one (lowest index on ties). Both take the leading pages of the run
//! and never mutate the table.
//!
//! ### Facade ([`heap`])
//! [`UserHeap`] owns the table, the [`KernelMemory`] service and the
//! [`PlacementSource`]. There is no global state; every heap is an independent
//! value, which is also how the tests build small heaps.
//!
//! ## Allocation Granularity
//!
//! Requests are rounded up to whole [`PAGE_SIZE`] pages. A request must be
//! strictly smaller than both the heap and the current free space:
//!
//! ```text
//! allocate(5000)  →  round up to 8192  →  8192 < capacity && 8192 < free ?
//!                 →  policy.find(2 pages)  →  mark table  →  kernel.map(va, 8192)
//! ```
//!
//! ## Concurrency
//!
//! Every operation takes `&mut self` and runs to completion. Sharing a heap
//! between threads requires an outer lock around each call.
//!
//! ## Kernel Integration
//!
//! With the `syscall` feature, the `syscall` module provides collaborators that talk to
//! the kernel through the `AllocateMem`, `FreeMem`, `MoveMem` and
//! `UHeapPlacementStrategy` system calls.

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod addresses;
pub mod heap;
pub mod kernel;
pub mod occupancy;
pub mod placement;

#[cfg(feature = "syscall")]
pub mod syscall;

pub use addresses::VirtualAddress;
pub use heap::{HeapError, UserHeap};
pub use kernel::KernelMemory;
pub use kernel_info::memory::PAGE_SIZE;
pub use occupancy::{FreeRun, OccupancyTable, PageEntry};
pub use placement::{PlacementPolicy, PlacementSource};
