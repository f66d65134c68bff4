//! The two interfaces a top-level window talks to.
//!
//! [`ViewContainer`] is the content view attached to a window: it receives
//! input, paint and size events and owns the drag-and-drop target and the
//! gesture processor. [`WindowDelegate`] is the embedding layer observing
//! the window itself: geometry, focus and lifecycle notifications.
//!
//! Every method has a no-op default so implementors only write what they
//! care about. Implementations may call back into the window system; the
//! window never holds a borrow of its own state across these calls.

use horizon_pane_core::{
    HitTest, ImeEvent, Insets, KeyInput, Message, MonitorInfo, Point, Rect, TimerId, TouchPoint,
    ViewId, WindowHandle,
};

use crate::context::WindowContext;

/// How a window-position change may resize the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeMode {
    /// The user is dragging a border; leave the size alone.
    Disable,
    /// Keep the point under the cursor fixed while resizing.
    AroundAnchor,
}

/// The size change a [`WindowDelegate::notify_resize`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeKind {
    /// Ordinary resize in the normal state.
    Resize,
    /// Back to normal from minimized or maximized.
    Restore,
    /// Minimized.
    Minimize,
    /// Maximized.
    Maximize,
}

/// A pending window-position change offered to the embedding layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovingRequest {
    /// Proposed frame rectangle.
    pub proposed: Rect,
    /// Cursor offset from the proposed origin while this window holds
    /// capture, otherwise zero.
    pub anchor: Point,
    /// How the change may resize the window.
    pub resize_mode: ResizeMode,
    /// Current frame insets.
    pub insets: Insets,
}

/// The content view hosted by a window.
#[allow(unused_variables)]
pub trait ViewContainer {
    /// Identity of the view.
    fn id(&self) -> ViewId;

    /// The view area changed size.
    fn handle_size(&self, ctx: &WindowContext, hwnd: WindowHandle, width: i32, height: i32) {}

    /// Mouse input. Returns `true` if consumed.
    fn handle_mouse(&self, ctx: &WindowContext, hwnd: WindowHandle, msg: &Message) -> bool {
        false
    }

    /// Context menu request. `point` is `None` for keyboard-invoked menus.
    fn handle_menu(&self, ctx: &WindowContext, hwnd: WindowHandle, point: Option<Point>) {}

    /// Key press or release.
    fn handle_key(&self, ctx: &WindowContext, hwnd: WindowHandle, key: &KeyInput) {}

    /// A typed character.
    fn handle_typed(&self, ctx: &WindowContext, hwnd: WindowHandle, ch: char) {}

    /// Input method event. Returns `true` if consumed.
    fn handle_input_method(&self, ctx: &WindowContext, hwnd: WindowHandle, event: &ImeEvent) -> bool {
        false
    }

    /// Repaint.
    fn handle_paint(&self, ctx: &WindowContext, hwnd: WindowHandle) {}

    /// Touch input. An empty slice cancels the current sequence. Returns the
    /// number of touch points still down.
    fn handle_touch(&self, ctx: &WindowContext, hwnd: WindowHandle, points: &[TouchPoint]) -> usize {
        0
    }

    /// A view timer fired.
    fn handle_timer(&self, ctx: &WindowContext, hwnd: WindowHandle, id: TimerId) {}

    /// The keyboard layout changed.
    fn handle_input_language_change(&self, ctx: &WindowContext, hwnd: WindowHandle) {}

    /// Mouse capture moved to `new`.
    fn notify_capture_changed(
        &self,
        ctx: &WindowContext,
        hwnd: WindowHandle,
        new: Option<WindowHandle>,
    ) {
    }

    /// Accessible object for `object_id`, if the view exposes one.
    fn get_accessible(&self, ctx: &WindowContext, hwnd: WindowHandle, object_id: i64) -> Option<isize> {
        None
    }

    /// Register the view as a drop target of `hwnd`.
    fn init_drop_target(&self, ctx: &WindowContext, hwnd: WindowHandle) {}

    /// Revoke the drop target.
    fn release_drop_target(&self, ctx: &WindowContext, hwnd: WindowHandle) {}

    /// Start gesture recognition for `hwnd`.
    fn init_manipulation_processor(&self, ctx: &WindowContext, hwnd: WindowHandle) {}

    /// Stop gesture recognition.
    fn release_manipulation_processor(&self, ctx: &WindowContext, hwnd: WindowHandle) {}

    /// Forget the pointer-inside state so the next move reports an enter.
    fn reset_mouse_tracking(&self, ctx: &WindowContext, hwnd: WindowHandle) {}
}

/// The embedding layer observing a top-level window.
#[allow(unused_variables)]
pub trait WindowDelegate {
    /// The frame moved to `(x, y)`.
    fn notify_move(&self, ctx: &WindowContext, hwnd: WindowHandle, x: i32, y: i32) {}

    /// The frame changed size or size state.
    fn notify_resize(
        &self,
        ctx: &WindowContext,
        hwnd: WindowHandle,
        kind: ResizeKind,
        width: i32,
        height: i32,
    ) {
    }

    /// A position change is about to happen. Return a rectangle to override
    /// it, or `None` to approve it.
    fn notify_moving(&self, ctx: &WindowContext, hwnd: WindowHandle, request: &MovingRequest) -> Option<Rect> {
        None
    }

    /// The window moved onto another monitor.
    fn notify_monitor_changed(&self, ctx: &WindowContext, hwnd: WindowHandle, monitor: MonitorInfo) {}

    /// The window gained or lost focus.
    fn notify_focus(&self, ctx: &WindowContext, hwnd: WindowHandle, focused: bool) {}

    /// Activation of a disabled window was refused.
    fn notify_focus_disabled(&self, ctx: &WindowContext, hwnd: WindowHandle) {}

    /// The window lost the focus grab.
    fn notify_focus_ungrab(&self, ctx: &WindowContext, hwnd: WindowHandle) {}

    /// The user asked to close the window.
    fn notify_close(&self, ctx: &WindowContext, hwnd: WindowHandle) {}

    /// The platform window is being destroyed.
    fn notify_destroy(&self, ctx: &WindowContext, hwnd: WindowHandle) {}

    /// Events are now redirected to `delegate`, or back to the window itself.
    fn notify_delegate_window(
        &self,
        ctx: &WindowContext,
        hwnd: WindowHandle,
        delegate: Option<WindowHandle>,
    ) {
    }

    /// Hit test for windows drawing their own frame. `point` is relative to
    /// the frame origin. `None` leaves the decision to the platform.
    fn non_client_hit_test(&self, ctx: &WindowContext, hwnd: WindowHandle, point: Point) -> Option<HitTest> {
        None
    }

    /// A menu item was chosen. Returns `true` if handled.
    fn handle_menu_command(&self, ctx: &WindowContext, hwnd: WindowHandle, id: u32) -> bool {
        false
    }
}
