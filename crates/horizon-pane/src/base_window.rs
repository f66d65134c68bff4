//! The shared part of every window object.
//!
//! [`BaseWindow`] owns one platform window handle and implements the
//! reentrancy-safe message-processing protocol: a window may be destroyed
//! from inside one of its own handlers, possibly several dispatch frames
//! deep, and the object must outlive every frame still running on it.
//!
//! The protocol is two counters' worth of state:
//!
//! - `begin_message_processing` increments the in-flight count, and marks the
//!   window dead when the message is [`Message::NcDestroy`];
//! - `end_message_processing` decrements it and reports whether the object
//!   may now be released (dead and no frame left).
//!
//! Only the dispatcher acts on that report, so a window is released exactly
//! once and never while a handler is still on the stack.

use std::any::Any;
use std::cell::Cell;
use std::rc::Rc;

use horizon_pane_core::{ClassToken, CursorIcon, HitTest, Message, MessageResult, WindowHandle};

use crate::context::WindowContext;

/// The closed set of window kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowKind {
    /// A decorated or undecorated application top-level window.
    TopLevel,
    /// Undecorated topmost host used during full-screen presentation.
    FullScreen,
    /// Translucent backdrop behind a full-screen host.
    Background,
    /// The process-wide message-only window.
    Application,
}

/// A window procedure: the polymorphic part of a window object.
pub trait WindowProc {
    /// The shared window state.
    fn base(&self) -> &BaseWindow;

    /// Which kind of window this is.
    fn kind(&self) -> WindowKind;

    /// Prefix for this window's generated class name.
    fn class_name_suffix(&self) -> &'static str;

    /// Handle one message. Unhandled messages should end in
    /// [`BaseWindow::common_window_proc`].
    fn window_proc(&self, ctx: &WindowContext, hwnd: WindowHandle, msg: Message) -> MessageResult;

    /// Upcast for downcasting to the concrete window type.
    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;

    /// Called once, after the final destroy notification, when the last
    /// dispatch frame has unwound.
    fn on_final_release(&self, _ctx: &WindowContext) {}
}

/// State shared by every window kind.
#[derive(Debug, Default)]
pub struct BaseWindow {
    handle: Cell<Option<WindowHandle>>,
    ancestor: Cell<Option<WindowHandle>>,
    class: Cell<Option<ClassToken>>,
    cursor: Cell<Option<CursorIcon>>,
    common_dialog_owner: Cell<bool>,
    in_flight: Cell<u32>,
    dead: Cell<bool>,
}

impl BaseWindow {
    /// Create state for a window whose owner or parent is `ancestor`.
    pub fn new(ancestor: Option<WindowHandle>) -> Self {
        Self {
            ancestor: Cell::new(ancestor),
            cursor: Cell::new(Some(CursorIcon::Default)),
            ..Self::default()
        }
    }

    /// The platform handle, once the creation message has bound it.
    pub fn handle(&self) -> Option<WindowHandle> {
        self.handle.get()
    }

    pub(crate) fn bind(&self, hwnd: WindowHandle) {
        self.handle.set(Some(hwnd));
    }

    /// Owner or parent.
    pub fn ancestor(&self) -> Option<WindowHandle> {
        self.ancestor.get()
    }

    /// Replace the owner or parent.
    pub fn set_ancestor(&self, ancestor: Option<WindowHandle>) {
        self.ancestor.set(ancestor);
    }

    /// The class registered for this window.
    pub fn class(&self) -> Option<ClassToken> {
        self.class.get()
    }

    pub(crate) fn set_class(&self, class: Option<ClassToken>) {
        self.class.set(class);
    }

    /// The stored cursor shape. `None` means hidden.
    pub fn cursor(&self) -> Option<CursorIcon> {
        self.cursor.get()
    }

    /// Whether a common dialog is currently owned by this window.
    pub fn is_common_dialog_owner(&self) -> bool {
        self.common_dialog_owner.get()
    }

    /// Mark or unmark this window as the owner of an open common dialog.
    pub fn set_common_dialog_owner(&self, owner: bool) {
        self.common_dialog_owner.set(owner);
    }

    /// Number of dispatch frames currently running on this window.
    pub fn in_flight(&self) -> u32 {
        self.in_flight.get()
    }

    /// Whether the final destroy notification has been seen.
    pub fn is_dead(&self) -> bool {
        self.dead.get()
    }

    /// Enter a dispatch frame.
    pub fn begin_message_processing(&self, msg: &Message) {
        self.in_flight.set(self.in_flight.get() + 1);
        if matches!(msg, Message::NcDestroy) {
            self.dead.set(true);
        }
    }

    /// Leave a dispatch frame. Returns `true` when the object may be released.
    pub fn end_message_processing(&self) -> bool {
        self.in_flight.set(self.in_flight.get().saturating_sub(1));
        self.dead.get() && self.in_flight.get() == 0
    }

    /// Store a cursor shape and apply it right away.
    pub fn set_cursor(&self, ctx: &WindowContext, cursor: Option<CursorIcon>) {
        self.cursor.set(cursor);
        ctx.platform().set_cursor(cursor);
    }

    /// Handling shared by every window kind, ending in the platform default.
    pub fn common_window_proc(
        &self,
        ctx: &WindowContext,
        hwnd: WindowHandle,
        msg: &Message,
    ) -> MessageResult {
        if let Message::SetCursor { hit: HitTest::Client } = msg {
            ctx.platform().set_cursor(self.cursor.get());
            return MessageResult::Handled(1);
        }
        ctx.platform().default_window_proc(ctx, hwnd, msg)
    }
}
