//! Logging macros gated on a module-level `ENABLE_LOGS` flag.
//!
//! The session controller and the periodic scheduler log on every tick and
//! every sync step. Flipping their `ENABLE_LOGS` to `false` silences that
//! module alone while `RUST_LOG` keeps governing the rest of the crate.
//!
//! ```rust,ignore
//! const ENABLE_LOGS: bool = true;
//!
//! use crate::{log_info, log_warn};
//!
//! log_info!("Recorded {} bpm at {}", sample.bpm, sample.timestamp_label);
//! log_warn!("Threshold {} clamped to {}", requested, stored);
//! ```
//!
//! When the flag is `false` the format arguments are never evaluated.

/// `log::info!` when the calling module's `ENABLE_LOGS` is true.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::info!($($arg)*);
        }
    };
}

/// `log::warn!` when the calling module's `ENABLE_LOGS` is true.
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::warn!($($arg)*);
        }
    };
}

/// `log::error!` when the calling module's `ENABLE_LOGS` is true.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        if ENABLE_LOGS {
            log::error!($($arg)*);
        }
    };
}
