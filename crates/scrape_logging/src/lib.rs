#![deny(missing_docs)]
//! Shared logging utilities for the feedscrape workspace.
//!
//! This crate provides the `scrape_*` logging macros used across the codebase,
//! a per-thread virtual clock reading that log lines can carry, and a minimal
//! test initializer for the global logger.

use std::cell::Cell;

thread_local! {
    /// Thread-local storage for the session's current virtual time in milliseconds.
    static VIRTUAL_MS: Cell<u64> = const { Cell::new(0) };
}

/// Records the session clock reading for the current thread.
/// The run loop calls this whenever it advances time.
pub fn set_virtual_ms(ms: u64) {
    VIRTUAL_MS.with(|v| v.set(ms));
}

/// Retrieves the last recorded session clock reading for the current thread.
/// Returns 0 if no session has advanced time yet.
pub fn virtual_ms() -> u64 {
    VIRTUAL_MS.with(|v| v.get())
}

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! scrape_trace {
    ($($arg:tt)*) => {{
        log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message prefixed with the session clock.
#[macro_export]
macro_rules! scrape_debug {
    ($($arg:tt)*) => {{
        log::debug!("[t={}ms] {}", $crate::virtual_ms(), format_args!($($arg)*));
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! scrape_info {
    ($($arg:tt)*) => {{
        log::info!($($arg)*);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! scrape_warn {
    ($($arg:tt)*) => {{
        log::warn!($($arg)*);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! scrape_error {
    ($($arg:tt)*) => {{
        log::error!($($arg)*);
    }};
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
