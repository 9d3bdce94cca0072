//! FILENAME: core/catalog/src/logging.rs
// PURPOSE: Category-tagged logging macros shared by the engine crates.
// CONTEXT: Every message carries a category ("CATALOG", "CODELIST", "SELECTION",
// "QUERY", "LAYOUT") which becomes the `log` target. The host application
// installs the backend; these crates never do.

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

#[macro_export]
macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        $crate::__log::debug!(target: $cat, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        $crate::__log::info!(target: $cat, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        $crate::__log::warn!(target: $cat, $($arg)*)
    };
}

#[macro_export]
macro_rules! log_error {
    ($cat:expr, $($arg:tt)*) => {
        $crate::__log::error!(target: $cat, $($arg)*)
    };
}

// ENTER/EXIT macros for function tracing

#[macro_export]
macro_rules! log_enter {
    ($cat:expr, $func:expr) => {
        $crate::__log::debug!(target: $cat, "[ENTER] {}", $func)
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::__log::debug!(target: $cat, "[ENTER] {} {}", $func, format!($($arg)*))
    };
}

#[macro_export]
macro_rules! log_exit {
    ($cat:expr, $func:expr) => {
        $crate::__log::debug!(target: $cat, "[EXIT] {}", $func)
    };
    ($cat:expr, $func:expr, $($arg:tt)*) => {
        $crate::__log::debug!(target: $cat, "[EXIT] {} {}", $func, format!($($arg)*))
    };
}

// Re-export the macros so they can be imported via `use catalog::logging::log_info;`
pub use log_debug;
pub use log_info;
pub use log_warn;
pub use log_error;
pub use log_enter;
pub use log_exit;
