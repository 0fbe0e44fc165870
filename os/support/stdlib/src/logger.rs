//! # `log` sink for userland processes
//!
//! Formats records as `"[LEVEL] target: message\n"` and pushes them byte by
//! byte through the `DebugWriteByte` system call. No allocation is involved.

use crate::syscall::debug_byte;
use core::fmt::{self, Write};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

struct SyscallSink;

impl Write for SyscallSink {
    #[inline]
    fn write_str(&mut self, s: &str) -> fmt::Result {
        s.bytes().for_each(debug_byte);
        Ok(())
    }
}

pub struct SyscallLogger {
    max_level: LevelFilter,
}

impl SyscallLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }

    /// Install `logger` as the global logger.
    ///
    /// Call this once at process start; the logger must live for the rest of
    /// the process, which a `static` gives for free.
    ///
    /// # Errors
    /// Fails if a logger was already installed.
    pub fn init(logger: &'static Self) -> Result<(), SetLoggerError> {
        log::set_logger(logger)?;
        log::set_max_level(logger.max_level);
        Ok(())
    }
}

impl Log for SyscallLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        // Best-effort debug output; a failing sink has nowhere to report to.
        writeln!(
            SyscallSink,
            "[{}] {}: {}",
            record.level(),
            record.target(),
            record.args()
        )
        .ok();
    }

    fn flush(&self) {}
}
