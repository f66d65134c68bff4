//! Logging facilities for Horizon Pane.
//!
//! Horizon Pane uses the `tracing` crate for instrumentation. Nothing is
//! printed unless the embedding application installs a subscriber:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_pane::grab=trace,horizon_pane=debug")
//!         .init();
//!
//!     // ...
//! }
//! ```
//!
//! Window lifecycle (creation, release, class registration failures) is
//! logged at `debug`/`error`; individual messages at `trace`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Message dispatch and window lifetime.
    pub const DISPATCH: &str = "horizon_pane::dispatch";
    /// Top-level window switchboard.
    pub const WINDOW: &str = "horizon_pane::window";
    /// Focus grab and activation filtering.
    pub const GRAB: &str = "horizon_pane::grab";
    /// Full-screen transitions.
    pub const FULL_SCREEN: &str = "horizon_pane::full_screen";
    /// Application window and main-thread work.
    pub const APPLICATION: &str = "horizon_pane::application";
    /// Platform layer.
    pub const PLATFORM: &str = "horizon_pane::platform";
}

/// Span names for the message loops.
pub mod span_names {
    /// A nested message loop.
    pub const NESTED_LOOP: &str = "horizon_pane::nested_loop";
}
