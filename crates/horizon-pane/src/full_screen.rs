//! Full-screen transitions.
//!
//! There are two ways to take content full screen:
//!
//! - **In place**: [`TopLevelWindow::enter_full_screen`] strips the frame
//!   from the window itself and moves it over the monitor. The previous
//!   rectangle, frame bits and menu are kept in a [`FullScreenSnapshot`] and
//!   put back by [`TopLevelWindow::exit_full_screen`].
//! - **Hosted**: [`FullScreenWindow::enter`] creates an undecorated topmost
//!   host window and redirects the top-level window's events to it through
//!   the delegate-window mechanism. With `keep_ratio` a black
//!   [`BackgroundWindow`] covers the rest of the monitor and can fade in and
//!   out.
//!
//! # Example
//!
//! ```ignore
//! use horizon_pane::FullScreenWindow;
//!
//! let host = FullScreenWindow::enter(&ctx, &window, true, true).expect("host");
//! // ...
//! host.exit(&ctx, true);
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use horizon_pane_core::logging::targets;
use horizon_pane_core::style::{FULL_SCREEN_EX_STYLE_MASK, FULL_SCREEN_STYLE_MASK};
use horizon_pane_core::{
    ActivateState, ButtonAction, ExStyle, MenuHandle, Message, MessageResult, MouseActivation,
    Rect, ShowCommand, Style, SwpFlags, TimerId, ViewId, WindowHandle, ZOrder,
};

use crate::base_window::{BaseWindow, WindowKind, WindowProc};
use crate::context::{WindowContext, WindowParams};
use crate::top_level::TopLevelWindow;
use crate::view::ViewContainer;

/// What a window looked like before it went full screen in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullScreenSnapshot {
    /// Frame rectangle.
    pub rect: Rect,
    /// Stripped style bits.
    pub style: Style,
    /// Stripped extended style bits.
    pub ex_style: ExStyle,
    /// Detached menu bar.
    pub menu: Option<MenuHandle>,
}

/// Monitor rectangle and content rectangle for a full-screen window whose
/// frame is `frame` and whose content area is `content`.
fn calculate_bounds(ctx: &WindowContext, frame: Rect, content: Rect, keep_ratio: bool) -> (Rect, Rect) {
    let screen = ctx.platform().monitor_from_rect(frame).bounds;
    let content = if keep_ratio {
        screen.letterbox(content.size())
    } else {
        screen
    };
    (screen, content)
}

impl TopLevelWindow {
    /// Whether the window is full screen in place.
    pub fn is_in_full_screen(&self) -> bool {
        self.full_screen.get().is_some()
    }

    /// The snapshot taken when the window went full screen in place.
    pub fn full_screen_snapshot(&self) -> Option<FullScreenSnapshot> {
        self.full_screen.get()
    }

    /// Take the window full screen in place.
    ///
    /// Succeeds without doing anything if already full screen. Fails for
    /// child windows and when `view` is not the attached view.
    pub fn enter_full_screen(&self, ctx: &WindowContext, view: ViewId, _animate: bool, keep_ratio: bool) -> bool {
        if self.is_child() {
            return false;
        }
        if self.is_in_full_screen() {
            return true;
        }
        if self.view().map(|v| v.id()) != Some(view) {
            tracing::debug!(target: targets::FULL_SCREEN, view = view.as_raw(), "full screen refused: view is not attached");
            return false;
        }
        let Some(hwnd) = self.handle() else {
            return false;
        };

        let platform = ctx.platform();
        let (Ok(frame), Ok(client)) = (platform.window_rect(hwnd), platform.client_rect_in_screen(hwnd)) else {
            return false;
        };
        let style = platform.style(hwnd);
        let ex_style = platform.ex_style(hwnd);
        let snapshot = FullScreenSnapshot {
            rect: frame,
            style: style & FULL_SCREEN_STYLE_MASK,
            ex_style: ex_style & FULL_SCREEN_EX_STYLE_MASK,
            menu: platform.menu(hwnd),
        };
        let (_screen, content) = calculate_bounds(ctx, frame, client, keep_ratio);

        platform.set_style(hwnd, style - FULL_SCREEN_STYLE_MASK);
        platform.set_ex_style(hwnd, ex_style - FULL_SCREEN_EX_STYLE_MASK);
        platform.set_menu(hwnd, None);
        // Recorded before the move so the Activate it triggers sees full screen.
        self.full_screen.set(Some(snapshot));
        platform.set_window_pos(
            ctx,
            hwnd,
            Some(ZOrder::Topmost),
            content,
            SwpFlags::FRAME_CHANGED | SwpFlags::NO_COPY_BITS,
        );
        tracing::debug!(target: targets::FULL_SCREEN, hwnd = hwnd.as_raw(), ?content, "entered full screen");
        true
    }

    /// Leave in-place full screen. Does nothing if the window is windowed.
    pub fn exit_full_screen(&self, ctx: &WindowContext, _animate: bool) {
        if self.is_child() {
            return;
        }
        let Some(snapshot) = self.full_screen.get() else {
            return;
        };
        let Some(hwnd) = self.handle() else {
            return;
        };

        let platform = ctx.platform();
        platform.set_style(hwnd, platform.style(hwnd) | snapshot.style);
        platform.set_ex_style(hwnd, platform.ex_style(hwnd) | snapshot.ex_style);
        platform.set_menu(hwnd, snapshot.menu);
        self.full_screen.set(None);

        let mut flags = SwpFlags::FRAME_CHANGED | SwpFlags::NO_COPY_BITS;
        if !self.is_focused() {
            flags |= SwpFlags::NO_ACTIVATE;
        }
        platform.set_window_pos(ctx, hwnd, Some(ZOrder::NoTopmost), snapshot.rect, flags);
        tracing::debug!(target: targets::FULL_SCREEN, hwnd = hwnd.as_raw(), "exited full screen");
    }
}

// ============================================================================
// FullScreenWindow
// ============================================================================

/// Undecorated topmost window hosting a top-level window's content.
pub struct FullScreenWindow {
    base: BaseWindow,
    owner: WindowHandle,
    background: RefCell<Option<Rc<BackgroundWindow>>>,
    exiting: Cell<bool>,
}

impl FullScreenWindow {
    /// Host `window`'s content full screen on the monitor it is on.
    ///
    /// Returns `None` for child windows, windows already redirected to a
    /// delegate window, and when the host cannot be created.
    pub fn enter(
        ctx: &WindowContext,
        window: &Rc<TopLevelWindow>,
        animate: bool,
        keep_ratio: bool,
    ) -> Option<Rc<Self>> {
        if window.is_child() || window.delegate_window().is_some() {
            return None;
        }
        let owner = window.handle()?;
        let platform = ctx.platform();
        let frame = platform.window_rect(owner).ok()?;
        let client = platform.client_rect_in_screen(owner).ok()?;
        let (screen, content) = calculate_bounds(ctx, frame, client, keep_ratio);

        let background = if keep_ratio {
            let start = if animate { 0 } else { 255 };
            Some(BackgroundWindow::create(ctx, screen, start)?)
        } else {
            None
        };

        let host = Rc::new(Self {
            base: BaseWindow::new(None),
            owner,
            background: RefCell::new(background.clone()),
            exiting: Cell::new(false),
        });
        let params = WindowParams {
            background: Some(0x00_00_00),
            ..WindowParams::new(content, Style::POPUP | Style::CLIP_CHILDREN, ExStyle::empty())
        };
        let Some(host_hwnd) = ctx.create_window(host.clone(), params) else {
            if let Some(background) = background.and_then(|b| b.base().handle()) {
                ctx.destroy_window(background);
            }
            return None;
        };

        window.set_delegate_window(ctx, Some(host_hwnd));

        if let Some(background) = &background {
            background.show(ctx);
            if animate {
                background.fade_to(ctx, 255, false);
            }
        }
        platform.set_window_pos(
            ctx,
            host_hwnd,
            Some(ZOrder::Topmost),
            content,
            SwpFlags::SHOW_WINDOW,
        );
        tracing::debug!(
            target: targets::FULL_SCREEN,
            owner = owner.as_raw(),
            host = host_hwnd.as_raw(),
            keep_ratio,
            "content hosted full screen"
        );
        Some(host)
    }

    /// Return the content to its window and destroy the host. With `animate`
    /// the background fades out before it goes away.
    pub fn exit(&self, ctx: &WindowContext, animate: bool) {
        if self.exiting.replace(true) {
            return;
        }
        if let Some(window) = ctx.top_level(self.owner) {
            if window.delegate_window() == self.base.handle() {
                window.set_delegate_window(ctx, None);
            }
        }
        let background = self.background.borrow_mut().take();
        if let Some(background) = background {
            if animate {
                background.fade_to(ctx, 0, true);
            } else if let Some(hwnd) = background.base().handle() {
                ctx.destroy_window(hwnd);
            }
        }
        if let Some(hwnd) = self.base.handle() {
            ctx.destroy_window(hwnd);
        }
        tracing::debug!(target: targets::FULL_SCREEN, owner = self.owner.as_raw(), "hosted full screen left");
    }

    /// The window whose content is hosted.
    pub fn owner(&self) -> WindowHandle {
        self.owner
    }

    /// The platform handle of the host.
    pub fn handle(&self) -> Option<WindowHandle> {
        self.base.handle()
    }

    /// The backdrop, when letterboxing.
    pub fn background(&self) -> Option<Rc<BackgroundWindow>> {
        self.background.borrow().clone()
    }

    fn owner_parts(&self, ctx: &WindowContext) -> Option<(Rc<TopLevelWindow>, Option<Rc<dyn ViewContainer>>)> {
        let window = ctx.top_level(self.owner)?;
        let view = window.view();
        Some((window, view))
    }
}

impl WindowProc for FullScreenWindow {
    fn base(&self) -> &BaseWindow {
        &self.base
    }

    fn kind(&self) -> WindowKind {
        WindowKind::FullScreen
    }

    fn class_name_suffix(&self) -> &'static str {
        "HorizonPaneFullScreen"
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn window_proc(&self, ctx: &WindowContext, hwnd: WindowHandle, msg: Message) -> MessageResult {
        let owner = self.owner;
        match &msg {
            Message::Close => {
                self.exit(ctx, false);
                return MessageResult::ZERO;
            }
            Message::Destroy => {
                // Destroyed from outside: give the content back.
                if !self.exiting.replace(true) {
                    if let Some((window, _)) = self.owner_parts(ctx) {
                        if window.delegate_window() == Some(hwnd) {
                            window.set_delegate_window(ctx, None);
                        }
                    }
                    let background = self.background.borrow_mut().take();
                    if let Some(bg) = background.and_then(|b| b.base().handle()) {
                        ctx.destroy_window(bg);
                    }
                }
                return MessageResult::ZERO;
            }
            Message::Activate { state, minimized } => {
                if let Some((window, _)) = self.owner_parts(ctx) {
                    let gained = *state != ActivateState::Inactive && !minimized;
                    window.handle_activate(ctx, owner, gained);
                }
            }
            Message::Size { width, height, .. } => {
                if let Some((_, Some(view))) = self.owner_parts(ctx) {
                    view.handle_size(ctx, owner, *width, *height);
                }
                return MessageResult::ZERO;
            }
            Message::Paint => {
                if let Some((_, Some(view))) = self.owner_parts(ctx) {
                    view.handle_paint(ctx, owner);
                }
            }
            Message::MouseButton { .. }
            | Message::MouseMove { .. }
            | Message::MouseWheel { .. }
            | Message::MouseLeave => {
                if matches!(msg, Message::MouseButton { action: ButtonAction::Down, .. }) {
                    ctx.check_ungrab_from(hwnd);
                }
                if let Some((_, view)) = self.owner_parts(ctx) {
                    if view.is_some_and(|v| v.handle_mouse(ctx, owner, &msg)) {
                        return MessageResult::ZERO;
                    }
                }
            }
            Message::Key(key) => {
                if let Some((_, Some(view))) = self.owner_parts(ctx) {
                    view.handle_key(ctx, owner, key);
                }
            }
            Message::Char { ch } => {
                if let Some((_, Some(view))) = self.owner_parts(ctx) {
                    view.handle_typed(ctx, owner, *ch);
                    return MessageResult::ZERO;
                }
            }
            Message::Ime(event) => {
                if let Some((_, Some(view))) = self.owner_parts(ctx) {
                    if view.handle_input_method(ctx, owner, event) {
                        return MessageResult::ZERO;
                    }
                }
            }
            Message::Touch { points } => {
                if let Some((window, _)) = self.owner_parts(ctx) {
                    window.handle_touch(ctx, owner, points);
                    return MessageResult::ZERO;
                }
            }
            _ => {}
        }
        self.base.common_window_proc(ctx, hwnd, &msg)
    }

    fn on_final_release(&self, _ctx: &WindowContext) {
        self.background.borrow_mut().take();
    }
}

impl std::fmt::Debug for FullScreenWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FullScreenWindow")
            .field("handle", &self.base.handle())
            .field("owner", &self.owner)
            .field("background", &self.background.borrow().is_some())
            .finish()
    }
}

// ============================================================================
// BackgroundWindow
// ============================================================================

const FADE_TIMER: TimerId = TimerId::from_raw(1);
const FADE_STEP: u8 = 32;
const FADE_INTERVAL: Duration = Duration::from_millis(15);

/// Black layered backdrop behind a letterboxed full-screen host.
pub struct BackgroundWindow {
    base: BaseWindow,
    alpha: Cell<u8>,
    target: Cell<u8>,
    destroy_when_done: Cell<bool>,
}

impl BackgroundWindow {
    /// Create the backdrop covering `rect` at opacity `alpha`. It starts
    /// hidden.
    pub fn create(ctx: &WindowContext, rect: Rect, alpha: u8) -> Option<Rc<Self>> {
        let window = Rc::new(Self {
            base: BaseWindow::new(None),
            alpha: Cell::new(alpha),
            target: Cell::new(alpha),
            destroy_when_done: Cell::new(false),
        });
        let params = WindowParams {
            background: Some(0x00_00_00),
            ..WindowParams::new(
                rect,
                Style::POPUP,
                ExStyle::LAYERED | ExStyle::TOOL_WINDOW | ExStyle::NO_ACTIVATE,
            )
        };
        let hwnd = ctx.create_window(window.clone(), params)?;
        ctx.platform().set_layered_alpha(hwnd, alpha);
        Some(window)
    }

    /// Current opacity.
    pub fn alpha(&self) -> u8 {
        self.alpha.get()
    }

    /// Whether a fade is running.
    pub fn is_fading(&self) -> bool {
        self.alpha.get() != self.target.get()
    }

    fn show(&self, ctx: &WindowContext) {
        let Some(hwnd) = self.base.handle() else {
            return;
        };
        let platform = ctx.platform();
        platform.show_window(ctx, hwnd, ShowCommand::ShowNoActivate);
        platform.set_window_pos(
            ctx,
            hwnd,
            Some(ZOrder::Topmost),
            Rect::default(),
            SwpFlags::NO_MOVE | SwpFlags::NO_SIZE | SwpFlags::NO_ACTIVATE,
        );
    }

    /// Fade towards `target`, one step per timer tick. With
    /// `destroy_when_done` the window destroys itself once it gets there.
    pub fn fade_to(&self, ctx: &WindowContext, target: u8, destroy_when_done: bool) {
        let Some(hwnd) = self.base.handle() else {
            return;
        };
        self.target.set(target);
        self.destroy_when_done.set(destroy_when_done);
        if self.alpha.get() == target {
            self.finish_fade(ctx, hwnd);
        } else {
            ctx.platform().set_timer(hwnd, FADE_TIMER, FADE_INTERVAL);
        }
    }

    fn step_fade(&self, ctx: &WindowContext, hwnd: WindowHandle) {
        let alpha = self.alpha.get();
        let target = self.target.get();
        let next = if alpha < target {
            alpha.saturating_add(FADE_STEP).min(target)
        } else {
            alpha.saturating_sub(FADE_STEP).max(target)
        };
        self.alpha.set(next);
        ctx.platform().set_layered_alpha(hwnd, next);
        if next == target {
            self.finish_fade(ctx, hwnd);
        }
    }

    fn finish_fade(&self, ctx: &WindowContext, hwnd: WindowHandle) {
        ctx.platform().kill_timer(hwnd, FADE_TIMER);
        if self.destroy_when_done.get() {
            ctx.destroy_window(hwnd);
        }
    }
}

impl WindowProc for BackgroundWindow {
    fn base(&self) -> &BaseWindow {
        &self.base
    }

    fn kind(&self) -> WindowKind {
        WindowKind::Background
    }

    fn class_name_suffix(&self) -> &'static str {
        "HorizonPaneBackground"
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn window_proc(&self, ctx: &WindowContext, hwnd: WindowHandle, msg: Message) -> MessageResult {
        match msg {
            Message::Timer { id } if id == FADE_TIMER => {
                self.step_fade(ctx, hwnd);
                MessageResult::ZERO
            }
            Message::MouseActivate => MessageResult::MouseActivate(MouseActivation::NoActivate),
            msg => self.base.common_window_proc(ctx, hwnd, &msg),
        }
    }
}

impl std::fmt::Debug for BackgroundWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackgroundWindow")
            .field("handle", &self.base.handle())
            .field("alpha", &self.alpha.get())
            .field("target", &self.target.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TopLevelConfig;
    use horizon_pane_core::{HeadlessPlatform, Platform};

    struct FixedView(ViewId);

    impl ViewContainer for FixedView {
        fn id(&self) -> ViewId {
            self.0
        }
    }

    fn setup() -> (Rc<HeadlessPlatform>, WindowContext, Rc<TopLevelWindow>) {
        let platform = Rc::new(HeadlessPlatform::default());
        let ctx = WindowContext::new(platform.clone()).unwrap();
        let window = TopLevelWindow::create(
            &ctx,
            TopLevelConfig::new("movie").with_bounds(Rect::new(100, 100, 656, 399)),
            None,
        )
        .unwrap();
        window.set_view(&ctx, Some(Rc::new(FixedView(ViewId::from_raw(7)))));
        (platform, ctx, window)
    }

    #[test]
    fn test_enter_refuses_foreign_view() {
        let (platform, ctx, window) = setup();
        let hwnd = window.handle().unwrap();
        let before = platform.style(hwnd);
        assert!(!window.enter_full_screen(&ctx, ViewId::from_raw(8), false, false));
        assert!(!window.is_in_full_screen());
        assert_eq!(platform.style(hwnd), before);
    }

    #[test]
    fn test_enter_strips_frame_and_covers_monitor() {
        let (platform, ctx, window) = setup();
        let hwnd = window.handle().unwrap();
        assert!(window.enter_full_screen(&ctx, ViewId::from_raw(7), false, false));
        assert!(!platform.style(hwnd).intersects(FULL_SCREEN_STYLE_MASK));
        assert!(platform.is_topmost(hwnd));
        assert_eq!(platform.window_rect(hwnd).unwrap(), Rect::new(0, 0, 1920, 1080));
        // A second enter changes nothing.
        let snapshot = window.full_screen_snapshot();
        assert!(window.enter_full_screen(&ctx, ViewId::from_raw(7), false, false));
        assert_eq!(window.full_screen_snapshot(), snapshot);
    }

    #[test]
    fn test_keep_ratio_letterboxes() {
        let (platform, ctx, window) = setup();
        let hwnd = window.handle().unwrap();
        let client = platform.client_rect_in_screen(hwnd).unwrap();
        assert!(window.enter_full_screen(&ctx, ViewId::from_raw(7), false, true));
        let expected = Rect::new(0, 0, 1920, 1080).letterbox(client.size());
        assert_eq!(platform.window_rect(hwnd).unwrap(), expected);
    }

    #[test]
    fn test_exit_without_enter_is_noop() {
        let (platform, ctx, window) = setup();
        let hwnd = window.handle().unwrap();
        let rect = platform.window_rect(hwnd).unwrap();
        window.exit_full_screen(&ctx, false);
        assert_eq!(platform.window_rect(hwnd).unwrap(), rect);
    }

    #[test]
    fn test_hosted_full_screen_round_trip() {
        let (platform, ctx, window) = setup();
        let hwnd = window.handle().unwrap();
        let host = FullScreenWindow::enter(&ctx, &window, false, true).unwrap();
        let host_hwnd = host.handle().unwrap();

        assert_eq!(window.delegate_window(), Some(host_hwnd));
        assert!(platform.is_visible(host_hwnd));
        assert!(platform.is_topmost(host_hwnd));
        let background = host.background().unwrap();
        assert_eq!(background.alpha(), 255);
        let bg_hwnd = background.base().handle().unwrap();
        assert_eq!(platform.window_rect(bg_hwnd).unwrap(), Rect::new(0, 0, 1920, 1080));

        host.exit(&ctx, false);
        assert_eq!(window.delegate_window(), None);
        assert!(!platform.is_window(host_hwnd));
        assert!(!platform.is_window(bg_hwnd));
        assert_eq!(window.current_handle(), hwnd);
    }

    #[test]
    fn test_background_fades_out_and_destroys_itself() {
        let (platform, ctx, window) = setup();
        let host = FullScreenWindow::enter(&ctx, &window, true, true).unwrap();
        let background = host.background().unwrap();
        let bg_hwnd = background.base().handle().unwrap();
        assert!(background.is_fading());

        for _ in 0..8 {
            platform.fire_timers(&ctx);
        }
        assert_eq!(background.alpha(), 255);
        assert!(platform.timers(bg_hwnd).is_empty());

        host.exit(&ctx, true);
        assert!(platform.is_window(bg_hwnd));
        for _ in 0..8 {
            platform.fire_timers(&ctx);
        }
        assert!(!platform.is_window(bg_hwnd));
    }
}
