//! Conditional logging macros gated on a module-level `ENABLE_LOGS` flag.
//!
//! Chatty loops (the capture collector, file replay) opt in by defining
//! `const ENABLE_LOGS: bool` and using these instead of the bare `log`
//! macros.

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
