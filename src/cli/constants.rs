//! CLI-wide constants and the display-level machinery.
//!
//! Diagnostics go to stderr through a small numeric verbosity gate:
//! 0 = silent, 1 = errors, 2 = progress + results (default), 3 = chatty,
//! 4 = debug.

use std::sync::atomic::{AtomicI32, Ordering};

/// Default suffix appended to compressed files.
pub const PKD_EXTENSION: &str = ".pkd";

/// Marker accepted on the command line for stdin/stdout.
pub const STDIO_MARK: &str = "-";

/// Tool name used in messages and usage text.
pub const COMPRESSOR_NAME: &str = "pkdcl";

static DISPLAY_LEVEL: AtomicI32 = AtomicI32::new(2);

/// Current global display level.
pub fn display_level() -> i32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Set the global display level (clamped to 0..=4).
pub fn set_display_level(level: i32) {
    DISPLAY_LEVEL.store(level.clamp(0, 4), Ordering::Relaxed);
}

/// Print to stderr unconditionally.
#[macro_export]
macro_rules! display {
    ($($arg:tt)*) => { eprint!($($arg)*) };
}

/// Print to stderr at or above `level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::cli::constants::display_level() >= $level {
            eprint!($($arg)*);
        }
    };
}
