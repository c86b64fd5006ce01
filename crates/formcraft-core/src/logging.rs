//! Logging shim shared by the engine crates.
//!
//! With the `tracing` feature enabled the usual `tracing` event macros are
//! re-exported from the crate root (`formcraft_core::debug!` and friends).
//! Without it the same names expand to nothing, so the tree, layout and markup
//! crates can log unconditionally without pulling `tracing` into hosts that
//! do not want it.

#[cfg(feature = "tracing")]
pub use tracing::{debug, error, info, trace, warn};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// Discards a trace-level event.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// Discards a debug-level event.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }

    /// Discards an info-level event.
    #[macro_export]
    macro_rules! info {
        ($($arg:tt)*) => {};
    }

    /// Discards a warn-level event.
    #[macro_export]
    macro_rules! warn {
        ($($arg:tt)*) => {};
    }

    /// Discards an error-level event.
    #[macro_export]
    macro_rules! error {
        ($($arg:tt)*) => {};
    }
}
