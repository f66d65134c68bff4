//! The boundary between the window object model and the windowing system.
//!
//! [`Platform`] is the set of windowing-system calls the window types make.
//! Calls that make the windowing system send messages back (creation,
//! destruction, positioning, activation) take a [`MessageSink`]: the
//! dispatcher that routes those messages to window procedures. A sink may be
//! re-entered from inside any of those calls, so implementations must not
//! hold internal borrows across a `send_message`.
//!
//! [`HeadlessPlatform`] is an in-memory window server implementing the whole
//! trait. It drives the test suites and headless embedders.

mod headless;

pub use headless::{FrameMetrics, HeadlessConfig, HeadlessPlatform};

use std::time::Duration;

use cursor_icon::CursorIcon;

use crate::error::Result;
use crate::geometry::{Insets, Point, Rect};
use crate::handle::{ClassToken, CreationToken, IconHandle, MenuHandle, MonitorId, TimerId, WindowHandle};
use crate::message::{Message, MessageResult};
use crate::style::{ExStyle, Style, SwpFlags, ZOrder};

/// Receives messages the windowing system sends synchronously.
pub trait MessageSink {
    /// Deliver a message to the window procedure bound to `hwnd` and return
    /// its answer.
    fn send_message(&self, hwnd: WindowHandle, msg: Message) -> MessageResult;

    /// Activation filter, consulted while one is installed. Returns `true`
    /// to veto activating or focusing `hwnd`.
    fn filter_activation(&self, hwnd: WindowHandle) -> bool;
}

/// Parameters for creating a platform window.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateParams {
    /// Registered class of the new window.
    pub class: ClassToken,
    /// Parent (for child windows) or owner (for top-level windows).
    pub parent_or_owner: Option<WindowHandle>,
    /// Initial frame rectangle.
    pub rect: Rect,
    /// Window title.
    pub name: String,
    /// Window styles.
    pub style: Style,
    /// Extended window styles.
    pub ex_style: ExStyle,
    /// Token echoed back in the creation message.
    pub token: CreationToken,
    /// Create an invisible message-only window outside the window tree.
    pub message_only: bool,
}

/// How [`Platform::show_window`] changes a window's visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShowCommand {
    /// Hide.
    Hide,
    /// Show and activate.
    Show,
    /// Show without activating.
    ShowNoActivate,
    /// Minimize.
    Minimize,
    /// Maximize and activate.
    Maximize,
    /// Restore from minimized or maximized and activate.
    Restore,
}

/// A display monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorInfo {
    /// Monitor identifier.
    pub id: MonitorId,
    /// Full monitor rectangle.
    pub bounds: Rect,
    /// Rectangle excluding task bars and docked tool windows.
    pub work_area: Rect,
    /// Whether this is the primary monitor.
    pub primary: bool,
}

/// The windowing-system calls made by the window object model.
pub trait Platform {
    // =========================================================================
    // Classes and lifetime
    // =========================================================================

    /// Register a window class. Returns `None` if the name is taken or the
    /// system refuses.
    fn register_class(&self, name: &str, background: Option<u32>) -> Option<ClassToken>;

    /// Unregister a window class. Returns `false` if it is unknown.
    fn unregister_class(&self, class: ClassToken) -> bool;

    /// Create a window. The first message the sink receives for it is
    /// [`Message::Create`]. Returns `None` on failure.
    fn create_window(&self, sink: &dyn MessageSink, params: &CreateParams) -> Option<WindowHandle>;

    /// Destroy a window, its owned windows and its children. The last message
    /// the sink receives for each is [`Message::NcDestroy`].
    fn destroy_window(&self, sink: &dyn MessageSink, hwnd: WindowHandle) -> bool;

    /// Whether the handle names a live window.
    fn is_window(&self, hwnd: WindowHandle) -> bool;

    // =========================================================================
    // Geometry and z-order
    // =========================================================================

    /// Frame rectangle in screen coordinates.
    fn window_rect(&self, hwnd: WindowHandle) -> Result<Rect>;

    /// Client rectangle in screen coordinates.
    fn client_rect_in_screen(&self, hwnd: WindowHandle) -> Result<Rect>;

    /// Move, resize and restack a window. `z_order` is ignored when
    /// [`SwpFlags::NO_ZORDER`] is set.
    fn set_window_pos(
        &self,
        sink: &dyn MessageSink,
        hwnd: WindowHandle,
        z_order: Option<ZOrder>,
        rect: Rect,
        flags: SwpFlags,
    ) -> bool;

    /// Frame thickness for a window with the given styles.
    fn frame_insets(&self, style: Style, ex_style: ExStyle, has_menu: bool) -> Insets;

    /// Height of the band along the top frame edge that resizes the window.
    fn resize_border(&self) -> i32;

    /// The monitor that best contains `rect`.
    fn monitor_from_rect(&self, rect: Rect) -> MonitorInfo;

    // =========================================================================
    // Styles and decorations
    // =========================================================================

    /// Current window styles.
    fn style(&self, hwnd: WindowHandle) -> Style;

    /// Replace window styles.
    fn set_style(&self, hwnd: WindowHandle, style: Style);

    /// Current extended styles.
    fn ex_style(&self, hwnd: WindowHandle) -> ExStyle;

    /// Replace extended styles.
    fn set_ex_style(&self, hwnd: WindowHandle, ex_style: ExStyle);

    /// Attached menu bar.
    fn menu(&self, hwnd: WindowHandle) -> Option<MenuHandle>;

    /// Attach or detach a menu bar.
    fn set_menu(&self, hwnd: WindowHandle, menu: Option<MenuHandle>);

    /// Replace the window title. Returns `false` for stale handles.
    fn set_window_text(&self, hwnd: WindowHandle, text: &str) -> bool;

    /// The window title, empty for stale handles.
    fn window_text(&self, hwnd: WindowHandle) -> String;

    /// Set the window icon.
    fn set_icon(&self, hwnd: WindowHandle, icon: Option<IconHandle>);

    /// Enable or disable the close item of the window menu.
    fn set_close_enabled(&self, hwnd: WindowHandle, enabled: bool);

    /// Per-window opacity for layered windows.
    fn set_layered_alpha(&self, hwnd: WindowHandle, alpha: u8);

    // =========================================================================
    // Visibility and state
    // =========================================================================

    /// Change visibility or size state. Returns whether the window was
    /// visible before.
    fn show_window(&self, sink: &dyn MessageSink, hwnd: WindowHandle, cmd: ShowCommand) -> bool;

    /// Whether the window is visible.
    fn is_visible(&self, hwnd: WindowHandle) -> bool;

    /// Whether the window is minimized.
    fn is_iconic(&self, hwnd: WindowHandle) -> bool;

    /// Whether the window is maximized.
    fn is_zoomed(&self, hwnd: WindowHandle) -> bool;

    /// Enable or disable input to the window.
    fn enable_window(&self, hwnd: WindowHandle, enabled: bool);

    // =========================================================================
    // Hierarchy
    // =========================================================================

    /// Parent of a child window.
    fn parent(&self, hwnd: WindowHandle) -> Option<WindowHandle>;

    /// Owner of a top-level window.
    fn owner(&self, hwnd: WindowHandle) -> Option<WindowHandle>;

    /// Re-parent a child window.
    fn set_parent(&self, hwnd: WindowHandle, parent: Option<WindowHandle>);

    /// Change the owner of a top-level window.
    fn set_owner(&self, hwnd: WindowHandle, owner: Option<WindowHandle>);

    /// Direct child windows, in z-order.
    fn children(&self, hwnd: WindowHandle) -> Vec<WindowHandle>;

    /// Top-level windows owned by `hwnd`.
    fn owned_windows(&self, hwnd: WindowHandle) -> Vec<WindowHandle>;

    // =========================================================================
    // Input, focus and activation
    // =========================================================================

    /// The active top-level window.
    fn foreground(&self) -> Option<WindowHandle>;

    /// Activate a top-level window. Subject to the activation filter.
    fn set_foreground(&self, sink: &dyn MessageSink, hwnd: WindowHandle) -> bool;

    /// The window with keyboard focus.
    fn focus(&self) -> Option<WindowHandle>;

    /// Move keyboard focus. Subject to the activation filter.
    fn set_focus(&self, sink: &dyn MessageSink, hwnd: Option<WindowHandle>) -> bool;

    /// The window holding mouse capture.
    fn capture(&self) -> Option<WindowHandle>;

    /// Capture the mouse.
    fn set_capture(&self, sink: &dyn MessageSink, hwnd: WindowHandle);

    /// Release mouse capture.
    fn release_capture(&self, sink: &dyn MessageSink);

    /// Cursor position in screen coordinates.
    fn cursor_pos(&self) -> Point;

    /// Change the cursor shape. `None` hides the cursor.
    fn set_cursor(&self, cursor: Option<CursorIcon>);

    /// Install the activation filter. Returns `false` on failure.
    fn install_activation_filter(&self) -> bool;

    /// Remove the activation filter.
    fn uninstall_activation_filter(&self);

    // =========================================================================
    // Messages and timers
    // =========================================================================

    /// Queue a message for later delivery. Returns `false` if the handle is
    /// stale.
    fn post_message(&self, hwnd: WindowHandle, msg: Message) -> bool;

    /// Take the next queued message without waiting.
    fn next_message(&self) -> Option<(WindowHandle, Message)>;

    /// The windowing system's own handling for a message no window consumed.
    fn default_window_proc(
        &self,
        sink: &dyn MessageSink,
        hwnd: WindowHandle,
        msg: &Message,
    ) -> MessageResult;

    /// Start or restart a window timer.
    fn set_timer(&self, hwnd: WindowHandle, id: TimerId, interval: Duration);

    /// Stop a window timer.
    fn kill_timer(&self, hwnd: WindowHandle, id: TimerId);
}
