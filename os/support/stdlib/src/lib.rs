#![no_std]
#![cfg_attr(not(feature = "syscall"), forbid(unsafe_code))]
#![cfg_attr(feature = "syscall", allow(unsafe_code))]

#[cfg(feature = "syscall")]
pub mod syscall;

#[cfg(feature = "syscall-abi")]
pub mod syscall_abi;

#[cfg(feature = "logger")]
pub mod logger;

#[cfg(feature = "logger")]
pub use logger::SyscallLogger;

#[cfg(all(feature = "userland", target_os = "none"))]
mod panic {
    #[panic_handler]
    fn panic(info: &core::panic::PanicInfo) -> ! {
        log::error!("{info}");
        loop {
            core::hint::spin_loop();
        }
    }
}
