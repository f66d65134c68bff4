//! Horizon Pane - the native windowing core.
//!
//! This crate sits between an embedding UI layer and the windowing system.
//! It owns window lifetime and message dispatch, and drives the state
//! machines of a desktop window:
//!
//! - [`WindowContext`]: handle registry, dispatcher, focus-grab slot and
//!   activation hook
//! - [`BaseWindow`] / [`WindowProc`]: reentrancy-safe window procedures that
//!   release their object exactly once
//! - [`TopLevelWindow`]: the switchboard of an application window (sizing,
//!   activation, focus, input forwarding, min/max constraints)
//! - Focus grab and delegate windows (`grab_focus`, `check_ungrab`,
//!   `set_delegate_window`)
//! - Full-screen presentation with [`FullScreenWindow`] and the fading
//!   [`BackgroundWindow`]
//! - [`ApplicationWindow`]: the main-thread work queue, nested loops and
//!   the cross-thread [`MainThreadHandle`]
//! - [`EventRouter`]: feeds winit window events into the switchboard
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use horizon_pane::{TopLevelConfig, TopLevelWindow, WindowContext};
//! use horizon_pane_core::HeadlessPlatform;
//!
//! let ctx = WindowContext::new(Rc::new(HeadlessPlatform::default())).unwrap();
//! let window = TopLevelWindow::create(&ctx, TopLevelConfig::new("Hello"), None).unwrap();
//! window.set_visible(&ctx, true);
//!
//! ctx.execute_on_main_thread_later(|ctx| ctx.quit());
//! ctx.run().unwrap();
//! ```

mod application;
mod base_window;
mod config;
mod context;
mod debug;
mod full_screen;
mod grab;
mod router;
mod top_level;
mod view;
mod work;

pub use application::{ApplicationWindow, MainThreadHandle};
pub use base_window::{BaseWindow, WindowKind, WindowProc};
pub use config::{TopLevelConfig, WindowLevel, WindowStyleMask};
pub use context::{ActivationHookGuard, WindowContext, WindowParams};
pub use debug::{TreeFormatOptions, WindowTreeDebug};
pub use full_screen::{BackgroundWindow, FullScreenSnapshot, FullScreenWindow};
pub use router::{EventRouter, from_winit_modifiers, from_winit_mouse_button, virtual_key};
pub use top_level::{BoundsRequest, ChangeReason, TopLevelWindow, WindowState};
pub use view::{MovingRequest, ResizeKind, ResizeMode, ViewContainer, WindowDelegate};
pub use work::{
    CompletionHandle, CompletionWaiter, PendingWork, SendWork, Work, WorkMode, WorkOutcome,
    completion_pair,
};

pub use horizon_pane_core as core;
