//! # Shared Memory Layout Configuration
//!
//! This crate is the single source of truth for the address space layout that
//! the kernel and userland agree on. Both sides read the same constants, so the
//! kernel's view of the user heap window can never drift from the allocator's.
//!
//! ## User Address Space
//!
//! ```text
//! Virtual Address Space Layout (userland view):
//!
//! 0x0000_0000_0000_0000 ┌─────────────────────────────────┐
//!                       │   Program Text, Data, Stack     │
//! USER_HEAP_START       ├─────────────────────────────────┤ 0x0000_0000_8000_0000
//!                       │          User Heap              │
//!                       │  (page-granular, mapped on      │
//!                       │   demand via AllocateMem)       │
//! USER_HEAP_MAX         ├─────────────────────────────────┤ 0x0000_0000_A000_0000
//!                       │          Unused                 │
//! USERSPACE_END         ├─────────────────────────────────┤ 0xffff_0000_0000_0000
//!                       │       Kernel Space              │
//! 0xFFFF_FFFF_FFFF_FFFF └─────────────────────────────────┘
//! ```
//!
//! The heap window is divided into [`PAGE_SIZE`](memory::PAGE_SIZE) pages. The
//! user heap allocator keeps one accounting entry per page, so
//! [`USER_HEAP_PAGES`](memory::USER_HEAP_PAGES) is also the length of its
//! occupancy table.
//!
//! ## Compile-Time Checks
//!
//! All constants are `const` values. Invalid combinations (unaligned bounds,
//! an empty window, a window reaching into kernel space) fail the build.
//!
//! ```rust
//! use kernel_info::memory::{PAGE_SIZE, USER_HEAP_MAX, USER_HEAP_PAGES, USER_HEAP_START};
//!
//! assert_eq!((USER_HEAP_MAX - USER_HEAP_START) / PAGE_SIZE, USER_HEAP_PAGES as u64);
//! ```

#![cfg_attr(not(any(test, doctest)), no_std)]
#![deny(unsafe_code)]

pub mod memory;
