//! Core types for Horizon Pane.
//!
//! This crate holds everything the window object model shares with the
//! windowing system underneath it:
//!
//! - **Handles**: [`WindowHandle`] and the small resource handles
//! - **Geometry**: [`Point`], [`Size`], [`Rect`], [`Insets`]
//! - **Messages**: the [`Message`] enum every window procedure consumes and
//!   the [`MessageResult`] it answers with
//! - **Styles**: window style bits, positioning flags and z-order bands
//! - **Platform**: the [`Platform`] trait and the in-memory
//!   [`HeadlessPlatform`]
//! - **Errors**, **logging targets** and **thread affinity checks**
//!
//! # Example
//!
//! ```
//! use horizon_pane_core::{HeadlessPlatform, Platform, Rect};
//!
//! let platform = HeadlessPlatform::default();
//! let class = platform.register_class("ExamplePane1", None).unwrap();
//! assert!(platform.is_class_registered("ExamplePane1"));
//! assert!(platform.unregister_class(class));
//!
//! let monitor = platform.monitor_from_rect(Rect::new(10, 10, 100, 100));
//! assert!(monitor.primary);
//! ```

pub mod error;
pub mod geometry;
pub mod handle;
pub mod logging;
pub mod message;
pub mod platform;
pub mod style;
pub mod thread_check;

pub use error::{PaneError, Result};
pub use geometry::{Insets, Point, Rect, Size};
pub use handle::{ClassToken, CreationToken, IconHandle, MenuHandle, MonitorId, TimerId, ViewId, WindowHandle};
pub use message::{
    ActivateState, ButtonAction, HitTest, ImeEvent, KeyInput, Message, MessageResult, MinMaxInfo,
    Modifiers, MouseActivation, MouseButton, SizeCode, TouchPhase, TouchPoint, WindowPos,
};
pub use platform::{
    CreateParams, FrameMetrics, HeadlessConfig, HeadlessPlatform, MessageSink, MonitorInfo,
    Platform, ShowCommand,
};
pub use style::{ExStyle, Style, SwpFlags, ZOrder};
pub use thread_check::ThreadAffinity;

pub use cursor_icon::CursorIcon;
