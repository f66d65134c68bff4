//! Top-level windows: the per-window message switchboard.
//!
//! A [`TopLevelWindow`] translates platform messages into calls on its
//! [`WindowDelegate`] (geometry, focus, lifecycle) and its attached
//! [`ViewContainer`] (input, paint, size). It also carries the window-side
//! state the embedding layer manipulates: size limits, focusability,
//! opacity, menu, icon and the delegate-window redirection used while the
//! content is hosted elsewhere.
//!
//! The grab chain lives in [`grab`](crate::grab) and the full-screen state
//! machine in [`full_screen`](crate::full_screen); both extend this type.
//!
//! # Example
//!
//! ```ignore
//! use horizon_pane::{TopLevelConfig, TopLevelWindow, WindowContext};
//!
//! let window = TopLevelWindow::create(&ctx, TopLevelConfig::new("Editor"), Some(delegate))
//!     .expect("window");
//! window.set_view(&ctx, Some(view));
//! window.set_visible(&ctx, true);
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use cursor_icon::CursorIcon;
use horizon_pane_core::logging::targets;
use horizon_pane_core::message::vk;
use horizon_pane_core::{
    ActivateState, ButtonAction, ExStyle, HitTest, IconHandle, Insets, MenuHandle, Message,
    MessageResult, MinMaxInfo, MonitorId, MouseActivation, MouseButton, Point, Rect,
    ShowCommand, Size, SizeCode, Style, SwpFlags, TouchPoint, WindowHandle, WindowPos, ZOrder,
};

use crate::base_window::{BaseWindow, WindowKind, WindowProc};
use crate::config::{TopLevelConfig, WindowLevel, WindowStyleMask, default_bounds};
use crate::context::{ActivationHookGuard, WindowContext, WindowParams};
use crate::full_screen::FullScreenSnapshot;
use crate::view::{MovingRequest, ResizeKind, ResizeMode, ViewContainer, WindowDelegate};

/// Size state of a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowState {
    /// Neither minimized nor maximized.
    #[default]
    Normal,
    /// Minimized.
    Minimized,
    /// Maximized.
    Maximized,
}

/// What the user was doing when the last position change started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChangeReason {
    /// Programmatic, or not known.
    #[default]
    Unknown,
    /// Dragging the caption.
    WasMoved,
    /// Dragging a border.
    WasSized,
}

/// A `set_bounds` request. Unset position components keep the current
/// position; a zero or negative size falls back to the content size, then
/// to the current size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoundsRequest {
    /// New left edge.
    pub x: Option<i32>,
    /// New top edge.
    pub y: Option<i32>,
    /// New frame width.
    pub width: i32,
    /// New frame height.
    pub height: i32,
    /// New content width, used when `width` is not positive.
    pub content_width: i32,
    /// New content height, used when `height` is not positive.
    pub content_height: i32,
}

impl BoundsRequest {
    /// Move to `(x, y)` and resize the frame to `width` x `height`.
    pub fn frame(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width,
            height,
            ..Self::default()
        }
    }

    /// Resize so the content area becomes `width` x `height`, keeping the
    /// position.
    pub fn content(width: i32, height: i32) -> Self {
        Self {
            content_width: width,
            content_height: height,
            ..Self::default()
        }
    }
}

/// An application top-level (or embedded child) window.
pub struct TopLevelWindow {
    base: BaseWindow,
    mask: WindowStyleMask,
    child: bool,
    state: Cell<WindowState>,
    change_reason: Cell<ChangeReason>,
    min_size: Cell<Size>,
    max_size: Cell<Size>,
    focusable: Cell<bool>,
    focused: Cell<bool>,
    enabled: Cell<bool>,
    resizable: Cell<bool>,
    alpha: Cell<u8>,
    menu: Cell<Option<MenuHandle>>,
    icon: Cell<Option<IconHandle>>,
    insets: Cell<Insets>,
    monitor: Cell<Option<MonitorId>>,
    shown_once: Cell<bool>,
    pub(crate) delegate_window: Cell<Option<WindowHandle>>,
    pub(crate) full_screen: Cell<Option<FullScreenSnapshot>>,
    view: RefCell<Option<Rc<dyn ViewContainer>>>,
    delegate: RefCell<Option<Rc<dyn WindowDelegate>>>,
    hook: RefCell<Option<ActivationHookGuard>>,
}

impl TopLevelWindow {
    fn new(ancestor: Option<WindowHandle>, mask: WindowStyleMask, child: bool) -> Self {
        Self {
            base: BaseWindow::new(ancestor),
            mask,
            child,
            state: Cell::new(WindowState::Normal),
            change_reason: Cell::new(ChangeReason::Unknown),
            min_size: Cell::new(Size::UNSET),
            max_size: Cell::new(Size::UNSET),
            focusable: Cell::new(true),
            focused: Cell::new(false),
            enabled: Cell::new(true),
            resizable: Cell::new(false),
            alpha: Cell::new(255),
            menu: Cell::new(None),
            icon: Cell::new(None),
            insets: Cell::new(Insets::new(-1, -1, -1, -1)),
            monitor: Cell::new(None),
            shown_once: Cell::new(false),
            delegate_window: Cell::new(None),
            full_screen: Cell::new(None),
            view: RefCell::new(None),
            delegate: RefCell::new(None),
            hook: RefCell::new(None),
        }
    }

    /// Create a top-level window. Returns `None` if the platform refuses.
    pub fn create(
        ctx: &WindowContext,
        config: TopLevelConfig,
        delegate: Option<Rc<dyn WindowDelegate>>,
    ) -> Option<Rc<Self>> {
        let (style, ex_style) = config.mask().to_styles();
        let rect = match config.bounds() {
            Some(rect) => rect,
            None => default_bounds(ctx.platform().monitor_from_rect(Rect::default()).work_area),
        };
        let window = Rc::new(Self::new(config.owner(), config.mask(), false));
        let monitor = config
            .monitor()
            .unwrap_or_else(|| ctx.platform().monitor_from_rect(rect).id);
        window.monitor.set(Some(monitor));
        *window.delegate.borrow_mut() = delegate;

        let params = WindowParams {
            parent_or_owner: config.owner(),
            name: config.title().to_string(),
            ..WindowParams::new(rect, style, ex_style)
        };
        let hwnd = ctx.create_window(window.clone(), params)?;

        if !config.mask().contains(WindowStyleMask::CLOSABLE) {
            ctx.platform().set_close_enabled(hwnd, false);
        }
        *window.hook.borrow_mut() = Some(ctx.acquire_activation_hook());
        tracing::debug!(target: targets::WINDOW, hwnd = hwnd.as_raw(), title = config.title(), "top-level window created");
        Some(window)
    }

    /// Create a window embedded as a child of `parent`.
    pub fn create_child(
        ctx: &WindowContext,
        parent: WindowHandle,
        delegate: Option<Rc<dyn WindowDelegate>>,
    ) -> Option<Rc<Self>> {
        if !ctx.platform().is_window(parent) {
            return None;
        }
        let window = Rc::new(Self::new(Some(parent), WindowStyleMask::empty(), true));
        *window.delegate.borrow_mut() = delegate;
        let rect = ctx.platform().client_rect_in_screen(parent).ok()?;
        let params = WindowParams {
            parent_or_owner: Some(parent),
            ..WindowParams::new(
                Rect::new(rect.x, rect.y, 0, 0),
                Style::CHILD | Style::CLIP_CHILDREN | Style::CLIP_SIBLINGS,
                ExStyle::empty(),
            )
        };
        ctx.create_window(window.clone(), params)?;
        *window.hook.borrow_mut() = Some(ctx.acquire_activation_hook());
        Some(window)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The platform handle.
    pub fn handle(&self) -> Option<WindowHandle> {
        self.base.handle()
    }

    fn hwnd(&self) -> WindowHandle {
        self.base.handle().unwrap_or_default()
    }

    /// The window receiving events on this window's behalf: the delegate
    /// window if one is set, otherwise this window.
    pub fn current_handle(&self) -> WindowHandle {
        self.delegate_window.get().unwrap_or_else(|| self.hwnd())
    }

    /// Shared window state.
    pub fn base_window(&self) -> &BaseWindow {
        &self.base
    }

    /// Style mask the window was created with.
    pub fn mask(&self) -> WindowStyleMask {
        self.mask
    }

    /// Whether the window is embedded in another window.
    pub fn is_child(&self) -> bool {
        self.child
    }

    /// Whether the window has a platform frame.
    pub fn is_decorated(&self) -> bool {
        self.mask.contains(WindowStyleMask::TITLED)
    }

    /// Whether the window was created with per-pixel transparency.
    pub fn is_transparent(&self) -> bool {
        self.mask.contains(WindowStyleMask::TRANSPARENT)
    }

    /// Whether title bar and content are drawn as one surface.
    pub fn is_unified(&self) -> bool {
        self.mask.contains(WindowStyleMask::UNIFIED)
    }

    /// Size state.
    pub fn state(&self) -> WindowState {
        self.state.get()
    }

    /// The change reason recorded by the last `Sizing` or `Moving`.
    pub fn change_reason(&self) -> ChangeReason {
        self.change_reason.get()
    }

    /// Whether the window accepts activation.
    pub fn is_focusable(&self) -> bool {
        self.focusable.get()
    }

    /// Whether the window has keyboard focus.
    pub fn is_focused(&self) -> bool {
        self.focused.get()
    }

    /// Whether the window accepts input.
    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Whether interactive resizing is allowed.
    pub fn is_resizable(&self) -> bool {
        self.resizable.get()
    }

    /// Opacity, 255 being opaque.
    pub fn alpha(&self) -> u8 {
        self.alpha.get()
    }

    /// The menu bar set through [`set_menu`](Self::set_menu).
    pub fn menu(&self) -> Option<MenuHandle> {
        self.menu.get()
    }

    /// The icon set through [`set_icon`](Self::set_icon).
    pub fn icon(&self) -> Option<IconHandle> {
        self.icon.get()
    }

    /// Minimum tracking size; negative components are unset.
    pub fn min_size(&self) -> Size {
        self.min_size.get()
    }

    /// Maximum tracking size; negative components are unset.
    pub fn max_size(&self) -> Size {
        self.max_size.get()
    }

    /// The monitor the window was last seen on.
    pub fn monitor(&self) -> Option<MonitorId> {
        self.monitor.get()
    }

    /// The window events are currently redirected to.
    pub fn delegate_window(&self) -> Option<WindowHandle> {
        self.delegate_window.get()
    }

    /// The attached view.
    pub fn view(&self) -> Option<Rc<dyn ViewContainer>> {
        self.view.borrow().clone()
    }

    /// The embedding-layer observer.
    pub fn delegate(&self) -> Option<Rc<dyn WindowDelegate>> {
        self.delegate.borrow().clone()
    }

    /// Replace the embedding-layer observer.
    pub fn set_delegate(&self, delegate: Option<Rc<dyn WindowDelegate>>) {
        *self.delegate.borrow_mut() = delegate;
    }

    // =========================================================================
    // Size limits
    // =========================================================================

    /// Set the minimum tracking size. Zero or negative components unset it.
    pub fn set_min_size(&self, width: i32, height: i32) {
        self.min_size.set(normalize_limit(width, height));
    }

    /// Set the maximum tracking size. Zero or negative components unset it.
    pub fn set_max_size(&self, width: i32, height: i32) {
        self.max_size.set(normalize_limit(width, height));
    }

    /// Clamp a frame rectangle to the size limits that are set. The origin is
    /// kept.
    pub fn update_min_max_size(&self, mut rect: Rect) -> Rect {
        let min = self.min_size.get();
        let max = self.max_size.get();
        if min.has_width() && rect.width < min.width {
            rect.width = min.width;
        }
        if min.has_height() && rect.height < min.height {
            rect.height = min.height;
        }
        if max.has_width() && rect.width > max.width {
            rect.width = max.width;
        }
        if max.has_height() && rect.height > max.height {
            rect.height = max.height;
        }
        rect
    }

    fn fill_min_max(&self, mut info: MinMaxInfo) -> MinMaxInfo {
        let min = self.min_size.get();
        let max = self.max_size.get();
        if min.has_width() {
            info.min_track.width = min.width;
        }
        if min.has_height() {
            info.min_track.height = min.height;
        }
        if max.has_width() {
            info.max_track.width = max.width;
        }
        if max.has_height() {
            info.max_track.height = max.height;
        }
        info
    }

    // =========================================================================
    // Insets and anchor
    // =========================================================================

    /// Recompute the frame insets. Skipped while minimized, when the client
    /// area collapses.
    pub(crate) fn update_insets(&self, ctx: &WindowContext) {
        let platform = ctx.platform();
        let hwnd = self.hwnd();
        if platform.is_iconic(hwnd) {
            return;
        }
        let (Ok(frame), Ok(client)) = (platform.window_rect(hwnd), platform.client_rect_in_screen(hwnd)) else {
            return;
        };
        let mut insets = frame.insets_to(&client);

        if insets.is_negative() {
            insets = if self.is_decorated() {
                let style = platform.style(hwnd);
                let framed = style | Style::CAPTION | Style::THICK_FRAME;
                platform.frame_insets(
                    if self.resizable.get() { framed } else { framed - Style::THICK_FRAME },
                    platform.ex_style(hwnd),
                    platform.menu(hwnd).is_some(),
                )
            } else {
                Insets::ZERO
            };
        }
        self.insets.set(insets);
    }

    /// Current frame insets.
    pub fn get_insets(&self, ctx: &WindowContext) -> Insets {
        self.update_insets(ctx);
        self.insets.get()
    }

    /// Cursor offset from the frame origin while this window holds the mouse
    /// capture.
    pub fn get_anchor(&self, ctx: &WindowContext) -> Option<Point> {
        let platform = ctx.platform();
        let hwnd = self.hwnd();
        if platform.capture() != Some(hwnd) {
            return None;
        }
        let frame = platform.window_rect(hwnd).ok()?;
        Some(platform.cursor_pos().relative_to(frame.origin()))
    }

    // =========================================================================
    // Content -> window operations
    // =========================================================================

    /// Attach or detach the content view.
    pub fn set_view(&self, ctx: &WindowContext, view: Option<Rc<dyn ViewContainer>>) {
        let hwnd = self.hwnd();
        if ctx.active_touch_window() == Some(hwnd) {
            ctx.set_active_touch_window(None);
        }
        if let Some(old) = self.view() {
            old.reset_mouse_tracking(ctx, hwnd);
            old.release_manipulation_processor(ctx, hwnd);
            old.release_drop_target(ctx, hwnd);
        }
        *self.view.borrow_mut() = view.clone();
        if let Some(view) = view {
            view.init_drop_target(ctx, hwnd);
            view.init_manipulation_processor(ctx, hwnd);
            if ctx.platform().is_visible(hwnd) {
                self.notify_view_size(ctx, hwnd);
            }
        }
    }

    /// Attach a menu bar. Returns `false` for stale windows.
    pub fn set_menu(&self, ctx: &WindowContext, menu: Option<MenuHandle>) -> bool {
        let hwnd = self.hwnd();
        if !ctx.platform().is_window(hwnd) {
            return false;
        }
        ctx.platform().set_menu(hwnd, menu);
        self.menu.set(menu);
        true
    }

    /// Set the window icon.
    pub fn set_icon(&self, ctx: &WindowContext, icon: Option<IconHandle>) {
        ctx.platform().set_icon(self.hwnd(), icon);
        self.icon.set(icon);
    }

    /// Set the title.
    pub fn set_title(&self, ctx: &WindowContext, title: &str) -> bool {
        ctx.platform().set_window_text(self.hwnd(), title)
    }

    /// Set the opacity. Windows created transparent keep their layering.
    pub fn set_alpha(&self, ctx: &WindowContext, alpha: u8) {
        self.alpha.set(alpha);
        if self.is_transparent() {
            return;
        }
        let platform = ctx.platform();
        let hwnd = self.hwnd();
        let ex_style = platform.ex_style(hwnd);
        if alpha == 255 {
            platform.set_ex_style(hwnd, ex_style - ExStyle::LAYERED);
        } else {
            platform.set_ex_style(hwnd, ex_style | ExStyle::LAYERED);
            platform.set_layered_alpha(hwnd, alpha);
        }
    }

    /// Allow or forbid interactive resizing. Fails for child windows.
    pub fn set_resizable(&self, ctx: &WindowContext, resizable: bool) -> bool {
        let platform = ctx.platform();
        let hwnd = self.hwnd();
        let style = platform.style(hwnd);
        if style.contains(Style::CHILD) {
            return false;
        }
        let mut bits = Style::MAXIMIZE_BOX;
        if self.is_decorated() {
            bits |= Style::THICK_FRAME;
        }
        platform.set_style(hwnd, if resizable { style | bits } else { style - bits });
        self.resizable.set(resizable);
        true
    }

    /// Allow or forbid activation.
    pub fn set_focusable(&self, ctx: &WindowContext, focusable: bool) {
        self.focusable.set(focusable);
        let platform = ctx.platform();
        let hwnd = self.hwnd();
        let ex_style = platform.ex_style(hwnd);
        if focusable {
            platform.set_ex_style(hwnd, ex_style - ExStyle::NO_ACTIVATE);
        } else {
            platform.set_ex_style(hwnd, ex_style | ExStyle::NO_ACTIVATE);
            if platform.focus() == Some(hwnd) {
                // Activation cannot be resigned, but the focus can be dropped.
                platform.set_focus(ctx, None);
            }
        }
    }

    /// Enable or disable input.
    pub fn set_enabled(&self, ctx: &WindowContext, enabled: bool) {
        let hwnd = self.hwnd();
        if !enabled {
            if let Some(view) = self.view() {
                view.reset_mouse_tracking(ctx, hwnd);
            }
        }
        self.enabled.set(enabled);
        ctx.platform().enable_window(hwnd, enabled);
    }

    /// Move the window between the normal and topmost bands.
    pub fn set_level(&self, ctx: &WindowContext, level: WindowLevel) {
        let z_order = match level {
            WindowLevel::Floating | WindowLevel::Topmost => ZOrder::Topmost,
            WindowLevel::Normal => ZOrder::NoTopmost,
        };
        ctx.platform().set_window_pos(
            ctx,
            self.hwnd(),
            Some(z_order),
            Rect::default(),
            SwpFlags::ASYNC
                | SwpFlags::NO_ACTIVATE
                | SwpFlags::NO_MOVE
                | SwpFlags::NO_OWNER_ZORDER
                | SwpFlags::NO_SIZE,
        );
    }

    /// Raise the window without activating it.
    pub fn to_front(&self, ctx: &WindowContext) {
        let platform = ctx.platform();
        let hwnd = self.hwnd();
        let flags = SwpFlags::NO_MOVE | SwpFlags::NO_SIZE | SwpFlags::NO_ACTIVATE;
        if !self.focusable.get() {
            // Unfocusable windows can only be raised through the topmost band.
            platform.set_window_pos(ctx, hwnd, Some(ZOrder::Topmost), Rect::default(), flags);
        }
        platform.set_window_pos(ctx, hwnd, Some(ZOrder::Top), Rect::default(), flags);
    }

    /// Lower the window to the bottom of the stack.
    pub fn to_back(&self, ctx: &WindowContext) {
        ctx.platform().set_window_pos(
            ctx,
            self.hwnd(),
            Some(ZOrder::Bottom),
            Rect::default(),
            SwpFlags::NO_MOVE | SwpFlags::NO_SIZE | SwpFlags::NO_ACTIVATE,
        );
    }

    /// Show or hide. Returns `visible`.
    pub fn set_visible(&self, ctx: &WindowContext, visible: bool) -> bool {
        let platform = ctx.platform();
        let hwnd = self.hwnd();
        if !visible {
            self.ungrab_focus(ctx);
            if ctx.active_touch_window() == Some(hwnd) {
                if let Some(view) = self.view() {
                    view.handle_touch(ctx, hwnd, &[]);
                }
                ctx.set_active_touch_window(None);
            }
            platform.show_window(ctx, hwnd, ShowCommand::Hide);
            return visible;
        }

        platform.show_window(ctx, hwnd, ShowCommand::Show);
        if self.focusable.get() {
            platform.set_foreground(ctx, hwnd);
        } else {
            let flags = SwpFlags::NO_SIZE | SwpFlags::NO_MOVE | SwpFlags::NO_ACTIVATE;
            platform.set_window_pos(ctx, hwnd, Some(ZOrder::Topmost), Rect::default(), flags);
            platform.set_window_pos(ctx, hwnd, Some(ZOrder::Top), Rect::default(), flags);
        }
        visible
    }

    /// Ask for keyboard focus. Top-level windows are brought to the
    /// foreground; child windows activate their top-level window first.
    pub fn request_focus(&self, ctx: &WindowContext) -> bool {
        let platform = ctx.platform();
        let hwnd = self.hwnd();
        if !self.child {
            return platform.set_foreground(ctx, hwnd);
        }
        platform.set_focus(ctx, Some(hwnd))
    }

    /// Drop keyboard focus from an embedded child window.
    pub fn resign_focus(&self, ctx: &WindowContext) {
        if self.child && self.focused.get() {
            ctx.platform().set_focus(ctx, None);
        }
    }

    /// Minimize, or restore from minimized.
    pub fn minimize(&self, ctx: &WindowContext, minimize: bool) {
        let cmd = if minimize { ShowCommand::Minimize } else { ShowCommand::Restore };
        ctx.platform().show_window(ctx, self.hwnd(), cmd);
    }

    /// Maximize, or restore from maximized.
    pub fn maximize(&self, ctx: &WindowContext, maximize: bool) {
        let cmd = if maximize { ShowCommand::Maximize } else { ShowCommand::Restore };
        ctx.platform().show_window(ctx, self.hwnd(), cmd);
    }

    /// Restore to the normal state.
    pub fn restore(&self, ctx: &WindowContext) {
        ctx.platform().show_window(ctx, self.hwnd(), ShowCommand::Restore);
    }

    /// Move and resize.
    pub fn set_bounds(&self, ctx: &WindowContext, request: BoundsRequest) {
        let platform = ctx.platform();
        let hwnd = self.hwnd();
        if !platform.is_window(hwnd) {
            return;
        }
        self.update_insets(ctx);
        let insets = self.insets.get();
        let Ok(current) = platform.window_rect(hwnd) else {
            return;
        };

        let width = if request.width > 0 {
            request.width
        } else if request.content_width > 0 {
            request.content_width + insets.horizontal()
        } else {
            current.width
        };
        let height = if request.height > 0 {
            request.height
        } else if request.content_height > 0 {
            request.content_height + insets.vertical()
        } else {
            current.height
        };
        let target = self.update_min_max_size(Rect::new(
            request.x.unwrap_or(current.x),
            request.y.unwrap_or(current.y),
            width,
            height,
        ));

        let mut flags = SwpFlags::NO_ACTIVATE | SwpFlags::NO_ZORDER | SwpFlags::NO_SEND_CHANGING;
        if request.x.is_none() && request.y.is_none() {
            flags |= SwpFlags::NO_MOVE;
        }
        platform.set_window_pos(ctx, hwnd, None, target, flags);
    }

    /// Set the cursor shape, for the delegate window too.
    pub fn set_cursor(&self, ctx: &WindowContext, cursor: Option<CursorIcon>) {
        self.base.set_cursor(ctx, cursor);
        if let Some(delegate) = self.delegate_window.get().and_then(|h| ctx.window(h)) {
            delegate.base().set_cursor(ctx, cursor);
        }
    }

    /// Release window-side resources and destroy the platform window.
    pub fn close(&self, ctx: &WindowContext) -> bool {
        let hwnd = self.hwnd();
        self.ungrab_focus(ctx);
        if let Some(view) = self.view() {
            view.release_drop_target(ctx, hwnd);
            view.release_manipulation_processor(ctx, hwnd);
        }
        ctx.destroy_window(hwnd)
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    pub(crate) fn handle_focus_disabled(&self, ctx: &WindowContext) {
        if let Some(delegate) = self.delegate() {
            delegate.notify_focus_disabled(ctx, self.hwnd());
        }
    }

    /// Veto decision for the activation filter.
    pub(crate) fn filter_activation(&self, ctx: &WindowContext) -> bool {
        if !self.enabled.get() {
            tracing::trace!(target: targets::GRAB, hwnd = self.hwnd().as_raw(), "activation of disabled window refused");
            self.handle_focus_disabled(ctx);
            return true;
        }
        !self.focusable.get()
    }

    pub(crate) fn handle_activate(&self, ctx: &WindowContext, hwnd: WindowHandle, gained: bool) {
        if !gained {
            self.ungrab_focus(ctx);
        }
        if let Some(delegate) = self.delegate() {
            delegate.notify_focus(ctx, hwnd, gained);
        }
    }

    fn notify_move(&self, ctx: &WindowContext, hwnd: WindowHandle) {
        let Ok(frame) = ctx.platform().window_rect(hwnd) else {
            return;
        };
        if let Some(delegate) = self.delegate() {
            delegate.notify_move(ctx, hwnd, frame.x, frame.y);
        }
    }

    fn notify_resize(&self, ctx: &WindowContext, hwnd: WindowHandle, kind: ResizeKind) {
        let Ok(frame) = ctx.platform().window_rect(hwnd) else {
            return;
        };
        if let Some(delegate) = self.delegate() {
            delegate.notify_resize(ctx, hwnd, kind, frame.width, frame.height);
        }
    }

    fn check_monitor(&self, ctx: &WindowContext, hwnd: WindowHandle) {
        let Ok(frame) = ctx.platform().window_rect(hwnd) else {
            return;
        };
        let monitor = ctx.platform().monitor_from_rect(frame);
        if self.monitor.get() == Some(monitor.id) {
            return;
        }
        self.monitor.set(Some(monitor.id));
        if let Some(delegate) = self.delegate() {
            delegate.notify_monitor_changed(ctx, hwnd, monitor);
        }
    }

    /// Send the current content size to the view.
    pub(crate) fn notify_view_size(&self, ctx: &WindowContext, hwnd: WindowHandle) {
        let Some(view) = self.view() else {
            return;
        };
        if let Ok(client) = ctx.platform().client_rect_in_screen(hwnd) {
            view.handle_size(ctx, hwnd, client.width, client.height);
        }
    }

    // =========================================================================
    // Switchboard
    // =========================================================================

    fn handle_show(&self, ctx: &WindowContext, hwnd: WindowHandle, visible: bool) {
        if visible {
            // Geometry reported before the embedding layer was listening is
            // re-sent once, when the window first appears.
            if !self.shown_once.get() && !ctx.platform().is_iconic(hwnd) {
                self.shown_once.set(true);
                self.notify_move(ctx, hwnd);
                self.notify_resize(ctx, hwnd, ResizeKind::Resize);
                self.notify_view_size(ctx, hwnd);
            }
        } else if let Some(view) = self.view() {
            view.reset_mouse_tracking(ctx, hwnd);
        }
    }

    fn handle_size(&self, ctx: &WindowContext, hwnd: WindowHandle, code: SizeCode, width: i32, height: i32) {
        match code {
            SizeCode::Restored => {
                if self.state.get() != WindowState::Normal {
                    self.notify_resize(ctx, hwnd, ResizeKind::Restore);
                    self.state.set(WindowState::Normal);
                } else {
                    self.notify_resize(ctx, hwnd, ResizeKind::Resize);
                }
            }
            SizeCode::Minimized => {
                self.notify_resize(ctx, hwnd, ResizeKind::Minimize);
                self.state.set(WindowState::Minimized);
            }
            SizeCode::Maximized => {
                self.notify_resize(ctx, hwnd, ResizeKind::Maximize);
                self.state.set(WindowState::Maximized);
            }
        }
        if let Some(view) = self.view() {
            view.handle_size(ctx, hwnd, width, height);
        }
    }

    fn handle_window_pos_changing(&self, ctx: &WindowContext, hwnd: WindowHandle, mut pos: WindowPos) -> WindowPos {
        let resize_mode = if self.change_reason.get() == ChangeReason::WasSized {
            ResizeMode::Disable
        } else {
            ResizeMode::AroundAnchor
        };
        self.change_reason.set(ChangeReason::Unknown);

        let no_move = pos.flags.contains(SwpFlags::NO_MOVE);
        let no_size = pos.flags.contains(SwpFlags::NO_SIZE);
        if no_move && no_size {
            return pos;
        }

        let platform = ctx.platform();
        let anchor = if platform.capture() == Some(hwnd) {
            platform.cursor_pos().relative_to(pos.rect.origin())
        } else {
            Point::ZERO
        };

        if no_move || no_size {
            if let Ok(current) = platform.window_rect(hwnd) {
                if no_move {
                    pos.rect.x = current.x;
                    pos.rect.y = current.y;
                }
                if no_size {
                    pos.rect.width = current.width;
                    pos.rect.height = current.height;
                }
            }
        }

        self.update_insets(ctx);

        let Some(delegate) = self.delegate() else {
            return pos;
        };
        let request = MovingRequest {
            proposed: pos.rect,
            anchor,
            resize_mode,
            insets: self.insets.get(),
        };
        if let Some(over) = delegate.notify_moving(ctx, hwnd, &request) {
            if no_move && over.origin() != pos.rect.origin() {
                pos.flags.remove(SwpFlags::NO_MOVE);
            }
            if no_size && over.size() != pos.rect.size() {
                pos.flags.remove(SwpFlags::NO_SIZE);
            }
            pos.rect = over;
        }
        pos
    }

    fn handle_activate_message(&self, ctx: &WindowContext, hwnd: WindowHandle, state: ActivateState, minimized: bool) {
        let gained = state != ActivateState::Inactive && !minimized;
        if self.is_in_full_screen() {
            let z_order = if gained { ZOrder::Topmost } else { ZOrder::Bottom };
            ctx.platform().set_window_pos(
                ctx,
                hwnd,
                Some(z_order),
                Rect::default(),
                SwpFlags::ASYNC
                    | SwpFlags::NO_ACTIVATE
                    | SwpFlags::NO_MOVE
                    | SwpFlags::NO_OWNER_ZORDER
                    | SwpFlags::NO_SIZE,
            );
        }
        if self.delegate_window.get().is_none() {
            self.handle_activate(ctx, hwnd, gained);
        }
    }

    fn handle_focus_change(&self, ctx: &WindowContext, hwnd: WindowHandle, focused: bool) {
        if self.delegate_window.get().is_some() {
            return;
        }
        self.focused.set(focused);
        // Child windows never see Activate; focus stands in for it.
        if self.child {
            self.handle_activate(ctx, hwnd, focused);
        }
    }

    fn handle_hit_test(&self, ctx: &WindowContext, hwnd: WindowHandle, point: Point) -> Option<HitTest> {
        if !self.mask.contains(WindowStyleMask::CUSTOM_FRAME) {
            return None;
        }
        let delegate = self.delegate()?;
        let frame = ctx.platform().window_rect(hwnd).ok()?;
        let local = point.relative_to(frame.origin());
        let hit = delegate.non_client_hit_test(ctx, hwnd, local)?;
        if hit == HitTest::Caption && self.resizable.get() && local.y < ctx.platform().resize_border() {
            return Some(HitTest::Top);
        }
        Some(hit)
    }

    /// Returns `Some` when the mouse message is consumed.
    fn handle_mouse(&self, ctx: &WindowContext, hwnd: WindowHandle, msg: &Message) -> Option<MessageResult> {
        if let Message::MouseButton { action: ButtonAction::Down, .. } = msg {
            // Another owned-window hierarchy may hold the grab.
            self.check_ungrab(ctx);
            if self.child && !self.focused.get() && self.focusable.get() {
                self.request_focus(ctx);
            }
        }

        if !self.enabled.get() {
            self.handle_focus_disabled(ctx);
            return Some(MessageResult::ZERO);
        }
        if matches!(msg, Message::MouseLeave) && self.delegate_window.get().is_some() {
            // The pointer left for the delegate window; not a real exit.
            return Some(MessageResult::ZERO);
        }

        let view = self.view()?;
        if !view.handle_mouse(ctx, hwnd, msg) {
            return None;
        }
        if let Message::MouseButton {
            button: MouseButton::Right,
            action: ButtonAction::Up,
            ..
        } = msg
        {
            // The default handling that would raise the context menu is skipped.
            view.handle_menu(ctx, hwnd, Some(ctx.platform().cursor_pos()));
        }
        Some(MessageResult::ZERO)
    }

    pub(crate) fn handle_touch(&self, ctx: &WindowContext, hwnd: WindowHandle, points: &[TouchPoint]) {
        let active = ctx.active_touch_window();
        if active.is_some() && active != Some(hwnd) {
            return;
        }
        let down = self.view().map_or(0, |view| view.handle_touch(ctx, hwnd, points));
        ctx.set_active_touch_window(if down > 0 { Some(hwnd) } else { None });
    }
}

fn normalize_limit(width: i32, height: i32) -> Size {
    Size::new(
        if width > 0 { width } else { -1 },
        if height > 0 { height } else { -1 },
    )
}

impl WindowProc for TopLevelWindow {
    fn base(&self) -> &BaseWindow {
        &self.base
    }

    fn kind(&self) -> WindowKind {
        WindowKind::TopLevel
    }

    fn class_name_suffix(&self) -> &'static str {
        "HorizonPaneWindow"
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn window_proc(&self, ctx: &WindowContext, hwnd: WindowHandle, msg: Message) -> MessageResult {
        match &msg {
            Message::ShowWindow { visible } => self.handle_show(ctx, hwnd, *visible),
            Message::Sizing => self.change_reason.set(ChangeReason::WasSized),
            Message::Moving => self.change_reason.set(ChangeReason::WasMoved),
            Message::Size { code, width, height } => {
                self.handle_size(ctx, hwnd, *code, *width, *height);
                return MessageResult::ZERO;
            }
            Message::Move { .. } => {
                if !ctx.platform().is_iconic(hwnd) {
                    self.notify_move(ctx, hwnd);
                    self.check_monitor(ctx, hwnd);
                }
                return MessageResult::ZERO;
            }
            Message::WindowPosChanging(pos) => {
                return MessageResult::WindowPos(self.handle_window_pos_changing(ctx, hwnd, *pos));
            }
            Message::Close => {
                if let Some(delegate) = self.delegate() {
                    delegate.notify_close(ctx, hwnd);
                }
                return MessageResult::ZERO;
            }
            Message::Destroy => {
                if let Some(delegate) = self.delegate() {
                    delegate.notify_destroy(ctx, hwnd);
                }
                return MessageResult::ZERO;
            }
            Message::Activate { state, minimized } => {
                self.handle_activate_message(ctx, hwnd, *state, *minimized);
            }
            Message::MouseActivate => {
                if !self.enabled.get() {
                    self.handle_focus_disabled(ctx);
                    return MessageResult::MouseActivate(MouseActivation::NoActivateAndEat);
                }
                if !self.focusable.get() {
                    return MessageResult::MouseActivate(MouseActivation::NoActivate);
                }
            }
            Message::SetFocus => self.handle_focus_change(ctx, hwnd, true),
            Message::KillFocus => self.handle_focus_change(ctx, hwnd, false),
            Message::GetMinMaxInfo(info) => {
                if self.min_size.get().is_set() || self.max_size.get().is_set() {
                    return MessageResult::MinMaxInfo(self.fill_min_max(*info));
                }
            }
            Message::Command { id } => {
                if let Some(delegate) = self.delegate() {
                    if delegate.handle_menu_command(ctx, hwnd, *id) {
                        return MessageResult::ZERO;
                    }
                }
            }
            Message::MenuChar => {
                // Close the menu instead of beeping.
                return MessageResult::Handled(1 << 16);
            }
            Message::InputLanguageChange => {
                if let Some(view) = self.view() {
                    view.handle_input_language_change(ctx, hwnd);
                }
                return MessageResult::ZERO;
            }
            Message::NcHitTest { point } => {
                if let Some(hit) = self.handle_hit_test(ctx, hwnd, *point) {
                    return MessageResult::HitTest(hit);
                }
            }
            Message::Paint => {
                if let Some(view) = self.view() {
                    view.handle_paint(ctx, hwnd);
                }
            }
            Message::ContextMenu { point } => {
                if let Some(view) = self.view() {
                    view.handle_menu(ctx, hwnd, *point);
                }
            }
            Message::MouseButton { .. }
            | Message::MouseMove { .. }
            | Message::MouseWheel { .. }
            | Message::MouseLeave => {
                if let Some(result) = self.handle_mouse(ctx, hwnd, &msg) {
                    return result;
                }
            }
            Message::NcMouseButtonDown { .. } => {
                self.ungrab_focus(ctx);
                self.check_ungrab(ctx);
            }
            Message::CaptureChanged { new } => {
                if let Some(view) = self.view() {
                    view.notify_capture_changed(ctx, hwnd, *new);
                }
            }
            Message::Key(key) => {
                if !self.enabled.get() {
                    return MessageResult::ZERO;
                }
                if let Some(view) = self.view() {
                    view.handle_key(ctx, hwnd, key);
                }
                // Without a menu bar, Alt and bare F10 would open the system menu.
                if ctx.platform().menu(hwnd).is_none()
                    && (key.virtual_key == vk::MENU
                        || (key.virtual_key == vk::F10 && key.modifiers.is_empty()))
                {
                    return MessageResult::ZERO;
                }
            }
            Message::Char { ch } => {
                if self.enabled.get() {
                    if let Some(view) = self.view() {
                        view.handle_typed(ctx, hwnd, *ch);
                    }
                    return MessageResult::ZERO;
                }
            }
            Message::Ime(event) => {
                if self.enabled.get() {
                    if let Some(view) = self.view() {
                        if view.handle_input_method(ctx, hwnd, event) {
                            return MessageResult::ZERO;
                        }
                    }
                }
            }
            Message::Touch { points } => {
                if self.enabled.get() {
                    self.handle_touch(ctx, hwnd, points);
                    return MessageResult::ZERO;
                }
            }
            Message::Timer { id } => {
                if let Some(view) = self.view() {
                    view.handle_timer(ctx, hwnd, *id);
                }
                return MessageResult::ZERO;
            }
            Message::GetObject { object_id } => {
                let accessible = self
                    .view()
                    .and_then(|view| view.get_accessible(ctx, hwnd, *object_id));
                if let Some(result) = accessible.filter(|r| *r != 0) {
                    return MessageResult::Handled(result);
                }
            }
            _ => {}
        }
        self.base.common_window_proc(ctx, hwnd, &msg)
    }

    fn on_final_release(&self, _ctx: &WindowContext) {
        // Dropping the guard may remove the activation filter.
        self.hook.borrow_mut().take();
        self.view.borrow_mut().take();
        self.delegate.borrow_mut().take();
    }
}

impl std::fmt::Debug for TopLevelWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TopLevelWindow")
            .field("handle", &self.base.handle())
            .field("state", &self.state.get())
            .field("enabled", &self.enabled.get())
            .field("focusable", &self.focusable.get())
            .field("focused", &self.focused.get())
            .field("delegate_window", &self.delegate_window.get())
            .field("full_screen", &self.full_screen.get().is_some())
            .finish_non_exhaustive()
    }
}
