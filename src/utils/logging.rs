//! Logging switches for hot paths (playback ticks, transcript fragments).
//!
//! A module opts in by declaring its own flag next to its imports:
//! ```rust,ignore
//! const ENABLE_LOGS: bool = false;
//! use crate::{log_debug, log_info};
//! ```
//! With the flag off the calls compile to nothing, so per-second chatter can
//! stay in the code without flooding `RUST_LOG=debug` output.

/// `log::debug!` gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::debug!($($arg)*);
        }
    };
}

/// `log::info!` gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// `log::warn!` gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// `log::error!` gated on the calling module's `ENABLE_LOGS`.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}

/// Debug-level detail is on when `MINDWELL_DEBUG` is `1` or `true`.
pub fn debug_enabled() -> bool {
    std::env::var("MINDWELL_DEBUG")
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
