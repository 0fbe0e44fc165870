//! Raw `syscall` wrappers.
//!
//! Arguments travel in `rdi`, `rsi` and `rdx`; the number goes in `rax` and the
//! result comes back in `rax`. `SYSCALL` clobbers `rcx` and `r11`.

use crate::syscall_abi::Sysno;

#[inline(always)]
#[allow(clippy::inline_always)]
fn syscall3(sysno: Sysno, arg0: u64, arg1: u64, arg2: u64) -> u64 {
    let mut ret: u64;
    unsafe {
        core::arch::asm!(
            "syscall",
            inlateout("rax") sysno as u64 => ret,
            in("rdi") arg0,
            in("rsi") arg1,
            in("rdx") arg2,
            lateout("rcx") _, // clobbered by SYSCALL
            lateout("r11") _, // clobbered by SYSCALL
            options(nostack)
        );
    }
    ret
}

#[inline(always)]
#[allow(clippy::inline_always)]
pub fn debug_byte(b: u8) {
    syscall3(Sysno::DebugWriteByte, u64::from(b), 0, 0);
}

/// Ask the kernel to back `[va, va + size)` with memory.
#[inline]
pub fn sys_allocate_mem(va: u64, size: u64) {
    syscall3(Sysno::AllocateMem, va, size, 0);
}

/// Ask the kernel to release `[va, va + size)`, including page file copies.
#[inline]
pub fn sys_free_mem(va: u64, size: u64) {
    syscall3(Sysno::FreeMem, va, size, 0);
}

/// Ask the kernel to copy `size` bytes from `src` to `dst`.
#[inline]
pub fn sys_move_mem(src: u64, dst: u64, size: u64) {
    syscall3(Sysno::MoveMem, src, dst, size);
}

/// Raw placement strategy value, see [`UHEAP_PLACEMENT_FIRST_FIT`](crate::syscall_abi::UHEAP_PLACEMENT_FIRST_FIT).
#[inline]
#[must_use]
pub fn sys_uheap_placement_strategy() -> u64 {
    syscall3(Sysno::UHeapPlacementStrategy, 0, 0, 0)
}
