//! Logging facilities for textgate.
//!
//! textgate uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every event carries one of the [`targets`] so hosts can filter a single
//! subsystem, e.g. `RUST_LOG=textgate::length=trace`.

/// Span names used throughout textgate for tracing.
pub mod span_names {
    /// One complete mutation cycle (admission through placeholder sync).
    pub const MUTATION: &str = "textgate::mutation";
    /// Deferred tick processing.
    pub const TICK: &str = "textgate::tick";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core foundations target.
    pub const CORE: &str = "textgate_core";
    /// Signal delivery target.
    pub const SIGNAL: &str = "textgate_core::signal";
    /// Mutation gate target.
    pub const GATE: &str = "textgate::gate";
    /// Length policy target.
    pub const LENGTH: &str = "textgate::length";
    /// Caret scroll reconciliation target.
    pub const SCROLL: &str = "textgate::scroll";
    /// Placeholder synchronizer target.
    pub const PLACEHOLDER: &str = "textgate::placeholder";
    /// Auto-resize measurement target.
    pub const MEASURE: &str = "textgate::measure";
    /// Observer relay target.
    pub const RELAY: &str = "textgate::relay";
}

/// A guard that keeps a tracing span entered until it is dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "textgate::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are thin wrappers around the `tracing` macros with consistent
/// target naming.
#[macro_export]
macro_rules! textgate_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "textgate_core", $($arg)*)
    };
}

#[macro_export]
macro_rules! textgate_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "textgate_core", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        // No subscriber installed; entering and dropping must be harmless.
        let _span = PerfSpan::new(span_names::MUTATION);
    }

    #[test]
    fn test_targets_are_namespaced() {
        for target in [
            targets::GATE,
            targets::LENGTH,
            targets::SCROLL,
            targets::PLACEHOLDER,
            targets::MEASURE,
            targets::RELAY,
        ] {
            assert!(target.starts_with("textgate::"));
        }
        assert!(targets::SIGNAL.starts_with(targets::CORE));
    }
}
