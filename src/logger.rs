// This file implements the application's logging system.
// It provides macros for the different log levels (INFO, WARN, ERROR, DEBUG)
// and gates debug output behind a global flag, with colored terminal output.
//
// The macros write to stderr so that resolution units running on worker threads
// never interleave with anything a command prints to stdout (tables, lists).

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// `log_info!` for general progress and informational messages.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => (eprintln!("{} {}", ::colored::Colorize::bright_green("[INFO]"), format!($($arg)*)));
}

/// `log_warn!` for non-critical issues or noteworthy conditions.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => (eprintln!("{} {}", ::colored::Colorize::bright_yellow("[WARN]"), format!($($arg)*)));
}

/// `log_error!` for failures that need the user's attention.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => (eprintln!("{} {}", ::colored::Colorize::bright_red("[ERROR]"), format!($($arg)*)));
}

/// `log_debug!` for detailed internal tracing.
/// Messages are only printed if debug mode is enabled via [`init`].
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if $crate::logger::is_debug_enabled() {
           eprintln!("{} {}", ::colored::Colorize::dimmed("[DEBUG]"), format!($($arg)*));
        }
    };
}

// Global flag to control debug logging, initialized once.
static DEBUG_ENABLED: OnceLock<AtomicBool> = OnceLock::new();

/// Initializes the logger, setting the global debug mode.
/// Call once at application startup; calling again just updates the flag.
///
/// # Arguments
/// * `debug`: If `true`, enables debug logging; otherwise only info, warn and error are printed.
pub fn init(debug: bool) {
    DEBUG_ENABLED
        .get_or_init(|| AtomicBool::new(debug))
        .store(debug, Ordering::Relaxed);

    if debug {
        log_debug!("Logger initialized in DEBUG mode");
    }
}

/// Checks if debug logging is currently enabled.
/// Used by the `log_debug!` macro; `false` when [`init`] was never called.
pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED
        .get()
        .map(|f| f.load(Ordering::Relaxed))
        .unwrap_or(false)
}
