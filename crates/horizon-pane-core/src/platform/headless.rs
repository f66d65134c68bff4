//! In-memory window server.
//!
//! `HeadlessPlatform` keeps a window table, a z-order, focus/activation and
//! capture state, a posted-message queue and per-window timers, and sends
//! the same synchronous messages a desktop window manager would for each
//! call. Test drivers (`simulate_*`, `fire_timers`, failure switches) let
//! suites reproduce user interaction and error paths.
//!
//! State lives behind a `RefCell`; no borrow is ever held across a call into
//! the [`MessageSink`], because window procedures call straight back in.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use cursor_icon::CursorIcon;
use slotmap::SlotMap;

use super::{CreateParams, MessageSink, MonitorInfo, Platform, ShowCommand};
use crate::error::{PaneError, Result};
use crate::geometry::{Insets, Point, Rect, Size};
use crate::handle::{ClassToken, IconHandle, MenuHandle, MonitorId, TimerId, WindowHandle};
use crate::logging::targets;
use crate::message::{
    ActivateState, HitTest, Message, MessageResult, MinMaxInfo, MouseActivation, SizeCode,
    WindowPos,
};
use crate::style::{ExStyle, Style, SwpFlags, ZOrder};

/// Frame thickness used to derive client areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMetrics {
    /// Sizing or dialog border thickness.
    pub border: i32,
    /// Caption height.
    pub caption: i32,
    /// Single-line menu bar height.
    pub menu: i32,
    /// Thin border thickness.
    pub thin_border: i32,
}

impl Default for FrameMetrics {
    fn default() -> Self {
        Self {
            border: 8,
            caption: 23,
            menu: 20,
            thin_border: 1,
        }
    }
}

/// Configuration for [`HeadlessPlatform`].
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Attached monitors; the first is primary.
    pub monitors: Vec<(Rect, Rect)>,
    /// Frame metrics.
    pub frame: FrameMetrics,
    /// Height of the top resize band.
    pub resize_border: i32,
    /// Initial cursor position.
    pub cursor_pos: Point,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            monitors: vec![(Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1040))],
            frame: FrameMetrics::default(),
            resize_border: 8,
            cursor_pos: Point::ZERO,
        }
    }
}

impl HeadlessConfig {
    /// Create the default configuration: one 1920x1080 monitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the monitor list with a single monitor.
    pub fn single_monitor(mut self, bounds: Rect, work_area: Rect) -> Self {
        self.monitors = vec![(bounds, work_area)];
        self
    }

    /// Add a secondary monitor.
    pub fn add_monitor(mut self, bounds: Rect, work_area: Rect) -> Self {
        self.monitors.push((bounds, work_area));
        self
    }

    /// Set the frame metrics.
    pub fn frame(mut self, frame: FrameMetrics) -> Self {
        self.frame = frame;
        self
    }
}

#[derive(Debug)]
struct WindowRecord {
    class: ClassToken,
    name: String,
    rect: Rect,
    restore_rect: Rect,
    style: Style,
    ex_style: ExStyle,
    parent: Option<WindowHandle>,
    owner: Option<WindowHandle>,
    menu: Option<MenuHandle>,
    icon: Option<IconHandle>,
    close_enabled: bool,
    alpha: u8,
    size_state: SizeCode,
    z: i64,
    last_z_order: Option<ZOrder>,
    last_flags: SwpFlags,
    message_only: bool,
    destroying: bool,
    timers: HashMap<TimerId, Duration>,
}

impl WindowRecord {
    fn is_child(&self) -> bool {
        self.style.contains(Style::CHILD)
    }

    fn visible(&self) -> bool {
        self.style.contains(Style::VISIBLE)
    }
}

#[derive(Debug)]
struct State {
    windows: SlotMap<WindowHandle, WindowRecord>,
    classes: HashMap<ClassToken, String>,
    next_class: u64,
    foreground: Option<WindowHandle>,
    focus: Option<WindowHandle>,
    capture: Option<WindowHandle>,
    cursor_pos: Point,
    cursor: Option<CursorIcon>,
    queue: VecDeque<(WindowHandle, Message)>,
    filter_installed: bool,
    fail_window_creation: bool,
    fail_class_registration: bool,
    top_z: i64,
    bottom_z: i64,
}

/// An in-memory implementation of [`Platform`].
#[derive(Debug)]
pub struct HeadlessPlatform {
    config: HeadlessConfig,
    state: RefCell<State>,
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new(HeadlessConfig::default())
    }
}

impl HeadlessPlatform {
    /// Create an empty window server.
    pub fn new(config: HeadlessConfig) -> Self {
        let cursor_pos = config.cursor_pos;
        Self {
            config,
            state: RefCell::new(State {
                windows: SlotMap::with_key(),
                classes: HashMap::new(),
                next_class: 1,
                foreground: None,
                focus: None,
                capture: None,
                cursor_pos,
                cursor: Some(CursorIcon::Default),
                queue: VecDeque::new(),
                filter_installed: false,
                fail_window_creation: false,
                fail_class_registration: false,
                top_z: 0,
                bottom_z: 0,
            }),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        f(&self.state.borrow())
    }

    fn with_mut<R>(&self, f: impl FnOnce(&mut State) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }

    fn read<R>(&self, hwnd: WindowHandle, f: impl FnOnce(&WindowRecord) -> R) -> Option<R> {
        self.with(|s| s.windows.get(hwnd).map(f))
    }

    fn write<R>(&self, hwnd: WindowHandle, f: impl FnOnce(&mut WindowRecord) -> R) -> Option<R> {
        self.with_mut(|s| s.windows.get_mut(hwnd).map(f))
    }

    // =========================================================================
    // Test drivers
    // =========================================================================

    /// Make every following window creation fail.
    pub fn set_fail_window_creation(&self, fail: bool) {
        self.with_mut(|s| s.fail_window_creation = fail);
    }

    /// Make every following class registration fail.
    pub fn set_fail_class_registration(&self, fail: bool) {
        self.with_mut(|s| s.fail_class_registration = fail);
    }

    /// Names of all registered classes.
    pub fn registered_class_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.with(|s| s.classes.values().cloned().collect());
        names.sort();
        names
    }

    /// Whether a class with this name is registered.
    pub fn is_class_registered(&self, name: &str) -> bool {
        self.with(|s| s.classes.values().any(|n| n == name))
    }

    /// Class name of a window.
    pub fn class_name(&self, hwnd: WindowHandle) -> Option<String> {
        self.with(|s| {
            let class = s.windows.get(hwnd)?.class;
            s.classes.get(&class).cloned()
        })
    }

    /// Title of a window.
    pub fn window_name(&self, hwnd: WindowHandle) -> Option<String> {
        self.read(hwnd, |w| w.name.clone())
    }

    /// Number of live windows, message-only windows included.
    pub fn window_count(&self) -> usize {
        self.with(|s| s.windows.len())
    }

    /// Move the cursor without generating input.
    pub fn set_cursor_pos(&self, point: Point) {
        self.with_mut(|s| s.cursor_pos = point);
    }

    /// The cursor shape last set, `None` when hidden.
    pub fn cursor(&self) -> Option<CursorIcon> {
        self.with(|s| s.cursor)
    }

    /// Whether the activation filter is installed.
    pub fn activation_filter_installed(&self) -> bool {
        self.with(|s| s.filter_installed)
    }

    /// Whether the window is in the topmost band.
    pub fn is_topmost(&self, hwnd: WindowHandle) -> bool {
        self.read(hwnd, |w| w.ex_style.contains(ExStyle::TOPMOST))
            .unwrap_or(false)
    }

    /// The z-order placement of the last positioning call that restacked the
    /// window.
    pub fn last_z_order(&self, hwnd: WindowHandle) -> Option<ZOrder> {
        self.read(hwnd, |w| w.last_z_order).flatten()
    }

    /// Flags of the last positioning call, after the window's own adjustment.
    pub fn last_pos_flags(&self, hwnd: WindowHandle) -> SwpFlags {
        self.read(hwnd, |w| w.last_flags).unwrap_or_default()
    }

    /// Visible top-level windows from top to bottom.
    pub fn stacking_order(&self) -> Vec<WindowHandle> {
        self.with(|s| {
            let mut windows: Vec<_> = s
                .windows
                .iter()
                .filter(|(_, w)| !w.is_child() && !w.message_only && w.visible())
                .map(|(h, w)| (h, w.ex_style.contains(ExStyle::TOPMOST), w.z))
                .collect();
            windows.sort_by(|a, b| b.1.cmp(&a.1).then(b.2.cmp(&a.2)));
            windows.into_iter().map(|(h, _, _)| h).collect()
        })
    }

    /// Layered opacity of a window.
    pub fn alpha(&self, hwnd: WindowHandle) -> Option<u8> {
        self.read(hwnd, |w| w.alpha)
    }

    /// Icon of a window.
    pub fn icon(&self, hwnd: WindowHandle) -> Option<IconHandle> {
        self.read(hwnd, |w| w.icon).flatten()
    }

    /// Whether the window menu's close item is enabled.
    pub fn is_close_enabled(&self, hwnd: WindowHandle) -> bool {
        self.read(hwnd, |w| w.close_enabled).unwrap_or(false)
    }

    /// Whether input to the window is enabled.
    pub fn is_enabled(&self, hwnd: WindowHandle) -> bool {
        self.read(hwnd, |w| !w.style.contains(Style::DISABLED))
            .unwrap_or(false)
    }

    /// Active timers of a window.
    pub fn timers(&self, hwnd: WindowHandle) -> Vec<TimerId> {
        let mut ids: Vec<TimerId> = self
            .read(hwnd, |w| w.timers.keys().copied().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }

    /// Number of queued messages.
    pub fn pending_messages(&self) -> usize {
        self.with(|s| s.queue.len())
    }

    /// Deliver one `Timer` message for every running timer.
    pub fn fire_timers(&self, sink: &dyn MessageSink) {
        let due: Vec<(WindowHandle, TimerId)> = self.with(|s| {
            let mut due: Vec<_> = s
                .windows
                .iter()
                .flat_map(|(h, w)| w.timers.keys().map(move |id| (h, *id)))
                .collect();
            due.sort_by_key(|(h, id)| (h.as_raw(), *id));
            due
        });
        for (hwnd, id) in due {
            // An earlier tick may have stopped this timer or destroyed the window.
            let running = self
                .read(hwnd, |w| w.timers.contains_key(&id))
                .unwrap_or(false);
            if running {
                sink.send_message(hwnd, Message::Timer { id });
            }
        }
    }

    /// Reproduce an interactive border drag ending at `rect`.
    pub fn simulate_user_resize(&self, sink: &dyn MessageSink, hwnd: WindowHandle, rect: Rect) {
        if !self.is_window(hwnd) {
            return;
        }
        sink.send_message(hwnd, Message::Sizing);

        let defaults = MinMaxInfo {
            min_track: Size::new(0, 0),
            max_track: Size::new(i32::MAX, i32::MAX),
        };
        let limits = match sink.send_message(hwnd, Message::GetMinMaxInfo(defaults)) {
            MessageResult::MinMaxInfo(info) => info,
            _ => defaults,
        };
        let width = rect.width.clamp(limits.min_track.width, limits.max_track.width.max(limits.min_track.width));
        let height = rect.height.clamp(limits.min_track.height, limits.max_track.height.max(limits.min_track.height));

        self.set_window_pos(
            sink,
            hwnd,
            None,
            Rect::new(rect.x, rect.y, width, height),
            SwpFlags::NO_ZORDER | SwpFlags::NO_ACTIVATE,
        );
    }

    /// Reproduce an interactive caption drag ending at `origin`.
    pub fn simulate_user_move(&self, sink: &dyn MessageSink, hwnd: WindowHandle, origin: Point) {
        if !self.is_window(hwnd) {
            return;
        }
        sink.send_message(hwnd, Message::Moving);
        self.set_window_pos(
            sink,
            hwnd,
            None,
            Rect::new(origin.x, origin.y, 0, 0),
            SwpFlags::NO_SIZE | SwpFlags::NO_ZORDER | SwpFlags::NO_ACTIVATE,
        );
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn top_level_of(&self, hwnd: WindowHandle) -> WindowHandle {
        let mut current = hwnd;
        while let Some(Some(parent)) =
            self.read(current, |w| if w.is_child() { w.parent } else { None })
        {
            current = parent;
        }
        current
    }

    fn is_descendant_or_self(&self, hwnd: WindowHandle, ancestor: WindowHandle) -> bool {
        let mut current = Some(hwnd);
        while let Some(h) = current {
            if h == ancestor {
                return true;
            }
            current = self.read(h, |w| if w.is_child() { w.parent } else { None }).flatten();
        }
        false
    }

    fn client_origin(&self, hwnd: WindowHandle) -> Point {
        self.client_rect_in_screen(hwnd)
            .map(|r| r.origin())
            .unwrap_or_default()
    }

    fn restack(&self, hwnd: WindowHandle, z_order: ZOrder) {
        self.with_mut(|s| {
            let z = match z_order {
                ZOrder::Bottom => {
                    s.bottom_z -= 1;
                    s.bottom_z
                }
                ZOrder::After(other) => match s.windows.get(other) {
                    Some(w) => w.z - 1,
                    None => return,
                },
                ZOrder::Top | ZOrder::Topmost | ZOrder::NoTopmost => {
                    s.top_z += 1;
                    s.top_z
                }
            };
            if let Some(w) = s.windows.get_mut(hwnd) {
                w.z = z;
                w.last_z_order = Some(z_order);
                match z_order {
                    ZOrder::Topmost => w.ex_style.insert(ExStyle::TOPMOST),
                    ZOrder::NoTopmost | ZOrder::Bottom => w.ex_style.remove(ExStyle::TOPMOST),
                    _ => {}
                }
            }
        });
    }

    fn move_focus(&self, sink: &dyn MessageSink, hwnd: Option<WindowHandle>) {
        let previous = self.with(|s| s.focus);
        if previous == hwnd {
            return;
        }
        self.with_mut(|s| s.focus = hwnd);
        if let Some(prev) = previous {
            if self.is_window(prev) {
                sink.send_message(prev, Message::KillFocus);
            }
        }
        if let Some(next) = hwnd {
            if self.is_window(next) && self.with(|s| s.focus) == Some(next) {
                sink.send_message(next, Message::SetFocus);
            }
        }
    }

    fn activate(&self, sink: &dyn MessageSink, hwnd: WindowHandle) -> bool {
        let top = self.top_level_of(hwnd);
        if self.with(|s| s.filter_installed) && sink.filter_activation(top) {
            tracing::trace!(target: targets::PLATFORM, hwnd = top.as_raw(), "activation vetoed");
            return false;
        }
        let previous = self.with(|s| s.foreground);
        if previous == Some(top) {
            return true;
        }
        self.with_mut(|s| s.foreground = Some(top));

        if let Some(prev) = previous {
            if self.is_window(prev) {
                let minimized = self.is_iconic(prev);
                sink.send_message(
                    prev,
                    Message::Activate {
                        state: ActivateState::Inactive,
                        minimized,
                    },
                );
            }
        }
        if self.is_window(top) {
            let minimized = self.is_iconic(top);
            sink.send_message(
                top,
                Message::Activate {
                    state: ActivateState::Active,
                    minimized,
                },
            );
        }
        // Default activation handling hands the keyboard focus over.
        if self.with(|s| s.foreground) == Some(top) && self.is_window(top) {
            self.move_focus(sink, Some(top));
        }
        true
    }

    fn deactivate(&self, sink: &dyn MessageSink, hwnd: WindowHandle) {
        let (was_foreground, focus) = self.with(|s| (s.foreground == Some(hwnd), s.focus));
        if let Some(focus) = focus {
            if self.is_descendant_or_self(focus, hwnd) {
                self.move_focus(sink, None);
            }
        }
        if was_foreground {
            self.with_mut(|s| s.foreground = None);
            if self.is_window(hwnd) {
                let minimized = self.is_iconic(hwnd);
                sink.send_message(
                    hwnd,
                    Message::Activate {
                        state: ActivateState::Inactive,
                        minimized,
                    },
                );
            }
        }
    }

    fn set_visible(&self, sink: &dyn MessageSink, hwnd: WindowHandle, visible: bool) -> bool {
        let Some(was) = self.read(hwnd, |w| w.visible()) else {
            return false;
        };
        if was != visible {
            sink.send_message(hwnd, Message::ShowWindow { visible });
            self.write(hwnd, |w| w.style.set(Style::VISIBLE, visible));
            if !visible {
                if self.with(|s| s.capture) == Some(hwnd) {
                    self.release_capture(sink);
                }
                self.deactivate(sink, hwnd);
            }
        }
        was
    }

    fn notify_geometry(&self, sink: &dyn MessageSink, hwnd: WindowHandle, moved: bool, sized: bool) {
        if moved && self.is_window(hwnd) {
            let origin = self.client_origin(hwnd);
            sink.send_message(hwnd, Message::Move { origin });
        }
        if sized && self.is_window(hwnd) {
            let (code, client) = match self.read(hwnd, |w| w.size_state) {
                Some(code) => (code, self.client_rect_in_screen(hwnd).unwrap_or_default()),
                None => return,
            };
            sink.send_message(
                hwnd,
                Message::Size {
                    code,
                    width: client.width,
                    height: client.height,
                },
            );
        }
    }

    fn change_size_state(
        &self,
        sink: &dyn MessageSink,
        hwnd: WindowHandle,
        state: SizeCode,
        activate: bool,
    ) {
        let work_area = self
            .window_rect(hwnd)
            .map(|r| self.monitor_from_rect(r).work_area)
            .unwrap_or_default();
        let changed = self
            .write(hwnd, |w| {
                if w.size_state == state {
                    return false;
                }
                if w.size_state == SizeCode::Restored {
                    w.restore_rect = w.rect;
                }
                w.rect = match state {
                    SizeCode::Restored => w.restore_rect,
                    SizeCode::Maximized => work_area,
                    SizeCode::Minimized => w.rect,
                };
                w.style.set(Style::MINIMIZE, state == SizeCode::Minimized);
                w.style.set(Style::MAXIMIZE, state == SizeCode::Maximized);
                w.size_state = state;
                true
            })
            .unwrap_or(false);

        self.set_visible(sink, hwnd, true);
        if state == SizeCode::Minimized {
            self.deactivate(sink, hwnd);
        } else if activate {
            self.activate(sink, hwnd);
        }
        if changed {
            self.notify_geometry(sink, hwnd, state != SizeCode::Minimized, true);
        }
    }

    fn hit_test(&self, hwnd: WindowHandle, point: Point) -> HitTest {
        let Ok(frame) = self.window_rect(hwnd) else {
            return HitTest::Nowhere;
        };
        if !frame.contains(point) {
            return HitTest::Nowhere;
        }
        let client = self.client_rect_in_screen(hwnd).unwrap_or(frame);
        if client.contains(point) {
            return HitTest::Client;
        }
        let border = self.config.frame.border;
        let top_band = point.y < frame.top() + border;
        let left = point.x < frame.left() + border;
        let right = point.x >= frame.right() - border;
        let bottom = point.y >= frame.bottom() - border;
        let sizable = self
            .read(hwnd, |w| w.style.contains(Style::THICK_FRAME))
            .unwrap_or(false);
        if sizable {
            match (top_band, bottom, left, right) {
                (true, _, true, _) => return HitTest::TopLeft,
                (true, _, _, true) => return HitTest::TopRight,
                (_, true, true, _) => return HitTest::BottomLeft,
                (_, true, _, true) => return HitTest::BottomRight,
                (true, ..) => return HitTest::Top,
                (_, true, ..) => return HitTest::Bottom,
                (_, _, true, _) => return HitTest::Left,
                (_, _, _, true) => return HitTest::Right,
                _ => {}
            }
        }
        if point.y < client.top() {
            HitTest::Caption
        } else {
            HitTest::Border
        }
    }
}

impl Platform for HeadlessPlatform {
    fn register_class(&self, name: &str, _background: Option<u32>) -> Option<ClassToken> {
        self.with_mut(|s| {
            if s.fail_class_registration || s.classes.values().any(|n| n == name) {
                tracing::debug!(target: targets::PLATFORM, class = name, "class registration refused");
                return None;
            }
            let token = ClassToken::from_raw(s.next_class);
            s.next_class += 1;
            s.classes.insert(token, name.to_string());
            Some(token)
        })
    }

    fn unregister_class(&self, class: ClassToken) -> bool {
        self.with_mut(|s| {
            let in_use = s.windows.values().any(|w| w.class == class);
            if in_use {
                return false;
            }
            s.classes.remove(&class).is_some()
        })
    }

    fn create_window(&self, sink: &dyn MessageSink, params: &CreateParams) -> Option<WindowHandle> {
        let hwnd = self.with_mut(|s| {
            if s.fail_window_creation || !s.classes.contains_key(&params.class) {
                return None;
            }
            let is_child = params.style.contains(Style::CHILD);
            let (parent, owner) = match params.parent_or_owner {
                Some(p) if !s.windows.contains_key(p) => return None,
                Some(p) if is_child => (Some(p), None),
                Some(p) => (None, Some(p)),
                None => (None, None),
            };
            s.top_z += 1;
            let z = s.top_z;
            Some(s.windows.insert(WindowRecord {
                class: params.class,
                name: params.name.clone(),
                rect: params.rect,
                restore_rect: params.rect,
                // Shown explicitly below so the window sees ShowWindow.
                style: params.style - Style::VISIBLE,
                ex_style: params.ex_style,
                parent,
                owner,
                menu: None,
                icon: None,
                close_enabled: true,
                alpha: 255,
                size_state: SizeCode::Restored,
                z,
                last_z_order: None,
                last_flags: SwpFlags::empty(),
                message_only: params.message_only,
                destroying: false,
                timers: HashMap::new(),
            }))
        });
        let Some(hwnd) = hwnd else {
            tracing::debug!(target: targets::PLATFORM, name = %params.name, "window creation refused");
            return None;
        };

        let created = sink.send_message(hwnd, Message::Create { token: params.token });
        if created == MessageResult::Handled(-1) {
            self.destroy_window(sink, hwnd);
            return None;
        }
        if !params.message_only && self.is_window(hwnd) {
            self.notify_geometry(sink, hwnd, true, true);
            if params.style.contains(Style::VISIBLE) {
                self.set_visible(sink, hwnd, true);
            }
        }
        self.is_window(hwnd).then_some(hwnd)
    }

    fn destroy_window(&self, sink: &dyn MessageSink, hwnd: WindowHandle) -> bool {
        let started = self
            .write(hwnd, |w| {
                if w.destroying {
                    return false;
                }
                w.destroying = true;
                true
            })
            .unwrap_or(false);
        if !started {
            return false;
        }

        for owned in self.owned_windows(hwnd) {
            self.destroy_window(sink, owned);
        }
        if self.with(|s| s.capture) == Some(hwnd) {
            self.release_capture(sink);
        }
        self.write(hwnd, |w| w.style.remove(Style::VISIBLE));
        self.deactivate(sink, hwnd);

        sink.send_message(hwnd, Message::Destroy);

        for child in self.children(hwnd) {
            self.destroy_window(sink, child);
        }

        sink.send_message(hwnd, Message::NcDestroy);

        self.with_mut(|s| {
            s.windows.remove(hwnd);
            s.queue.retain(|(h, _)| *h != hwnd);
            if s.focus == Some(hwnd) {
                s.focus = None;
            }
            if s.foreground == Some(hwnd) {
                s.foreground = None;
            }
        });
        tracing::trace!(target: targets::PLATFORM, hwnd = hwnd.as_raw(), "window destroyed");
        true
    }

    fn is_window(&self, hwnd: WindowHandle) -> bool {
        self.with(|s| s.windows.contains_key(hwnd))
    }

    fn window_rect(&self, hwnd: WindowHandle) -> Result<Rect> {
        self.read(hwnd, |w| w.rect)
            .ok_or(PaneError::InvalidHandle(hwnd))
    }

    fn client_rect_in_screen(&self, hwnd: WindowHandle) -> Result<Rect> {
        let (rect, style, ex_style, has_menu, minimized) = self
            .read(hwnd, |w| {
                (
                    w.rect,
                    w.style,
                    w.ex_style,
                    w.menu.is_some(),
                    w.size_state == SizeCode::Minimized,
                )
            })
            .ok_or(PaneError::InvalidHandle(hwnd))?;
        if minimized {
            return Ok(Rect::new(rect.x, rect.y, 0, 0));
        }
        let inner = rect.inset(self.frame_insets(style, ex_style, has_menu));
        Ok(Rect::new(
            inner.x,
            inner.y,
            inner.width.max(0),
            inner.height.max(0),
        ))
    }

    fn set_window_pos(
        &self,
        sink: &dyn MessageSink,
        hwnd: WindowHandle,
        z_order: Option<ZOrder>,
        rect: Rect,
        flags: SwpFlags,
    ) -> bool {
        if !self.is_window(hwnd) {
            return false;
        }

        let mut pos = WindowPos { hwnd, rect, flags };
        if !flags.contains(SwpFlags::NO_SEND_CHANGING) {
            if let MessageResult::WindowPos(adjusted) =
                sink.send_message(hwnd, Message::WindowPosChanging(pos))
            {
                pos = WindowPos { hwnd, ..adjusted };
            }
        }

        let applied = self.write(hwnd, |w| {
            let mut next = w.rect;
            if !pos.flags.contains(SwpFlags::NO_MOVE) {
                next.x = pos.rect.x;
                next.y = pos.rect.y;
            }
            if !pos.flags.contains(SwpFlags::NO_SIZE) {
                next.width = pos.rect.width;
                next.height = pos.rect.height;
            }
            let moved = next.origin() != w.rect.origin();
            let sized = next.size() != w.rect.size();
            w.rect = next;
            if w.size_state == SizeCode::Restored {
                w.restore_rect = next;
            }
            w.last_flags = pos.flags;
            (moved, sized || pos.flags.contains(SwpFlags::FRAME_CHANGED))
        });
        let Some((moved, sized)) = applied else {
            return false;
        };

        if !pos.flags.contains(SwpFlags::NO_ZORDER) {
            if let Some(z_order) = z_order {
                self.restack(hwnd, z_order);
            }
        }
        if pos.flags.contains(SwpFlags::SHOW_WINDOW) {
            self.set_visible(sink, hwnd, true);
        } else if pos.flags.contains(SwpFlags::HIDE_WINDOW) {
            self.set_visible(sink, hwnd, false);
        }

        self.notify_geometry(sink, hwnd, moved, sized);

        let activatable = self
            .read(hwnd, |w| w.visible() && !w.is_child() && !w.message_only)
            .unwrap_or(false);
        if !pos.flags.contains(SwpFlags::NO_ACTIVATE) && activatable {
            self.activate(sink, hwnd);
        }
        true
    }

    fn frame_insets(&self, style: Style, _ex_style: ExStyle, has_menu: bool) -> Insets {
        let frame = self.config.frame;
        let mut insets = if style.contains(Style::CAPTION) {
            let edge = if style.contains(Style::THICK_FRAME) {
                frame.border
            } else {
                frame.thin_border.max(frame.border / 2)
            };
            Insets::new(edge, edge + frame.caption, edge, edge)
        } else if style.contains(Style::THICK_FRAME) {
            Insets::new(frame.border, frame.border, frame.border, frame.border)
        } else if style.contains(Style::BORDER) {
            let t = frame.thin_border;
            Insets::new(t, t, t, t)
        } else {
            Insets::ZERO
        };
        if has_menu && !style.contains(Style::CHILD) {
            insets.top += frame.menu;
        }
        insets
    }

    fn resize_border(&self) -> i32 {
        self.config.resize_border
    }

    fn monitor_from_rect(&self, rect: Rect) -> MonitorInfo {
        let overlap = |m: &Rect| {
            let w = (rect.right().min(m.right()) - rect.left().max(m.left())).max(0);
            let h = (rect.bottom().min(m.bottom()) - rect.top().max(m.top())).max(0);
            i64::from(w) * i64::from(h)
        };
        let (index, (bounds, work_area)) = self
            .config
            .monitors
            .iter()
            .enumerate()
            .max_by(|(ia, a), (ib, b)| overlap(&a.0).cmp(&overlap(&b.0)).then(ib.cmp(ia)))
            .map(|(i, m)| (i, *m))
            .unwrap_or((0, (Rect::new(0, 0, 1920, 1080), Rect::new(0, 0, 1920, 1080))));
        MonitorInfo {
            id: MonitorId::from_raw(index as u64 + 1),
            bounds,
            work_area,
            primary: index == 0,
        }
    }

    fn style(&self, hwnd: WindowHandle) -> Style {
        self.read(hwnd, |w| w.style).unwrap_or_default()
    }

    fn set_style(&self, hwnd: WindowHandle, style: Style) {
        self.write(hwnd, |w| w.style = style);
    }

    fn ex_style(&self, hwnd: WindowHandle) -> ExStyle {
        self.read(hwnd, |w| w.ex_style).unwrap_or_default()
    }

    fn set_ex_style(&self, hwnd: WindowHandle, ex_style: ExStyle) {
        self.write(hwnd, |w| w.ex_style = ex_style);
    }

    fn menu(&self, hwnd: WindowHandle) -> Option<MenuHandle> {
        self.read(hwnd, |w| w.menu).flatten()
    }

    fn set_menu(&self, hwnd: WindowHandle, menu: Option<MenuHandle>) {
        self.write(hwnd, |w| w.menu = menu);
    }

    fn set_window_text(&self, hwnd: WindowHandle, text: &str) -> bool {
        self.write(hwnd, |w| w.name = text.to_string()).is_some()
    }

    fn window_text(&self, hwnd: WindowHandle) -> String {
        self.read(hwnd, |w| w.name.clone()).unwrap_or_default()
    }

    fn set_icon(&self, hwnd: WindowHandle, icon: Option<IconHandle>) {
        self.write(hwnd, |w| w.icon = icon);
    }

    fn set_close_enabled(&self, hwnd: WindowHandle, enabled: bool) {
        self.write(hwnd, |w| w.close_enabled = enabled);
    }

    fn set_layered_alpha(&self, hwnd: WindowHandle, alpha: u8) {
        self.write(hwnd, |w| w.alpha = alpha);
    }

    fn show_window(&self, sink: &dyn MessageSink, hwnd: WindowHandle, cmd: ShowCommand) -> bool {
        let Some(was_visible) = self.read(hwnd, |w| w.visible()) else {
            return false;
        };
        match cmd {
            ShowCommand::Hide => {
                self.set_visible(sink, hwnd, false);
            }
            ShowCommand::Show => {
                self.set_visible(sink, hwnd, true);
                self.activate(sink, hwnd);
            }
            ShowCommand::ShowNoActivate => {
                self.set_visible(sink, hwnd, true);
            }
            ShowCommand::Minimize => self.change_size_state(sink, hwnd, SizeCode::Minimized, false),
            ShowCommand::Maximize => self.change_size_state(sink, hwnd, SizeCode::Maximized, true),
            ShowCommand::Restore => self.change_size_state(sink, hwnd, SizeCode::Restored, true),
        }
        was_visible
    }

    fn is_visible(&self, hwnd: WindowHandle) -> bool {
        self.read(hwnd, |w| w.visible()).unwrap_or(false)
    }

    fn is_iconic(&self, hwnd: WindowHandle) -> bool {
        self.read(hwnd, |w| w.size_state == SizeCode::Minimized)
            .unwrap_or(false)
    }

    fn is_zoomed(&self, hwnd: WindowHandle) -> bool {
        self.read(hwnd, |w| w.size_state == SizeCode::Maximized)
            .unwrap_or(false)
    }

    fn enable_window(&self, hwnd: WindowHandle, enabled: bool) {
        self.write(hwnd, |w| w.style.set(Style::DISABLED, !enabled));
    }

    fn parent(&self, hwnd: WindowHandle) -> Option<WindowHandle> {
        self.read(hwnd, |w| w.parent).flatten()
    }

    fn owner(&self, hwnd: WindowHandle) -> Option<WindowHandle> {
        self.read(hwnd, |w| w.owner).flatten()
    }

    fn set_parent(&self, hwnd: WindowHandle, parent: Option<WindowHandle>) {
        self.write(hwnd, |w| w.parent = parent);
    }

    fn set_owner(&self, hwnd: WindowHandle, owner: Option<WindowHandle>) {
        self.write(hwnd, |w| w.owner = owner);
    }

    fn children(&self, hwnd: WindowHandle) -> Vec<WindowHandle> {
        self.with(|s| {
            let mut children: Vec<_> = s
                .windows
                .iter()
                .filter(|(_, w)| w.is_child() && w.parent == Some(hwnd))
                .map(|(h, w)| (h, w.z))
                .collect();
            children.sort_by(|a, b| b.1.cmp(&a.1));
            children.into_iter().map(|(h, _)| h).collect()
        })
    }

    fn owned_windows(&self, hwnd: WindowHandle) -> Vec<WindowHandle> {
        self.with(|s| {
            s.windows
                .iter()
                .filter(|(_, w)| !w.is_child() && w.owner == Some(hwnd))
                .map(|(h, _)| h)
                .collect()
        })
    }

    fn foreground(&self) -> Option<WindowHandle> {
        self.with(|s| s.foreground)
    }

    fn set_foreground(&self, sink: &dyn MessageSink, hwnd: WindowHandle) -> bool {
        self.is_window(hwnd) && self.activate(sink, hwnd)
    }

    fn focus(&self) -> Option<WindowHandle> {
        self.with(|s| s.focus)
    }

    fn set_focus(&self, sink: &dyn MessageSink, hwnd: Option<WindowHandle>) -> bool {
        let Some(target) = hwnd else {
            self.move_focus(sink, None);
            return true;
        };
        if !self.is_window(target) {
            return false;
        }
        if self.with(|s| s.filter_installed) && sink.filter_activation(target) {
            return false;
        }
        let top = self.top_level_of(target);
        if self.with(|s| s.foreground) != Some(top) && !self.activate(sink, top) {
            return false;
        }
        self.move_focus(sink, Some(target));
        true
    }

    fn capture(&self) -> Option<WindowHandle> {
        self.with(|s| s.capture)
    }

    fn set_capture(&self, sink: &dyn MessageSink, hwnd: WindowHandle) {
        if !self.is_window(hwnd) {
            return;
        }
        let previous = self.with_mut(|s| s.capture.replace(hwnd));
        if let Some(prev) = previous {
            if prev != hwnd && self.is_window(prev) {
                sink.send_message(prev, Message::CaptureChanged { new: Some(hwnd) });
            }
        }
    }

    fn release_capture(&self, sink: &dyn MessageSink) {
        if let Some(prev) = self.with_mut(|s| s.capture.take()) {
            if self.is_window(prev) {
                sink.send_message(prev, Message::CaptureChanged { new: None });
            }
        }
    }

    fn cursor_pos(&self) -> Point {
        self.with(|s| s.cursor_pos)
    }

    fn set_cursor(&self, cursor: Option<CursorIcon>) {
        self.with_mut(|s| s.cursor = cursor);
    }

    fn install_activation_filter(&self) -> bool {
        self.with_mut(|s| {
            s.filter_installed = true;
        });
        tracing::debug!(target: targets::PLATFORM, "activation filter installed");
        true
    }

    fn uninstall_activation_filter(&self) {
        self.with_mut(|s| s.filter_installed = false);
        tracing::debug!(target: targets::PLATFORM, "activation filter removed");
    }

    fn post_message(&self, hwnd: WindowHandle, msg: Message) -> bool {
        self.with_mut(|s| {
            if !s.windows.contains_key(hwnd) {
                return false;
            }
            s.queue.push_back((hwnd, msg));
            true
        })
    }

    fn next_message(&self) -> Option<(WindowHandle, Message)> {
        self.with_mut(|s| s.queue.pop_front())
    }

    fn default_window_proc(
        &self,
        sink: &dyn MessageSink,
        hwnd: WindowHandle,
        msg: &Message,
    ) -> MessageResult {
        match msg {
            Message::Close => {
                self.destroy_window(sink, hwnd);
                MessageResult::ZERO
            }
            Message::MouseActivate => MessageResult::MouseActivate(MouseActivation::Activate),
            Message::NcHitTest { point } => MessageResult::HitTest(self.hit_test(hwnd, *point)),
            Message::WindowPosChanging(pos) => MessageResult::WindowPos(*pos),
            Message::GetMinMaxInfo(info) => MessageResult::MinMaxInfo(*info),
            Message::SetCursor { .. } => {
                self.set_cursor(Some(CursorIcon::Default));
                MessageResult::Handled(1)
            }
            _ => MessageResult::ZERO,
        }
    }

    fn set_timer(&self, hwnd: WindowHandle, id: TimerId, interval: Duration) {
        self.write(hwnd, |w| w.timers.insert(id, interval));
    }

    fn kill_timer(&self, hwnd: WindowHandle, id: TimerId) {
        self.write(hwnd, |w| w.timers.remove(&id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::CreationToken;
    use std::cell::RefCell;

    /// Records every message and answers with platform defaults.
    struct RecordingSink<'a> {
        platform: &'a HeadlessPlatform,
        log: RefCell<Vec<(WindowHandle, &'static str)>>,
        veto: RefCell<Vec<WindowHandle>>,
    }

    impl<'a> RecordingSink<'a> {
        fn new(platform: &'a HeadlessPlatform) -> Self {
            Self {
                platform,
                log: RefCell::new(Vec::new()),
                veto: RefCell::new(Vec::new()),
            }
        }

        fn names_for(&self, hwnd: WindowHandle) -> Vec<&'static str> {
            self.log
                .borrow()
                .iter()
                .filter(|(h, _)| *h == hwnd)
                .map(|(_, n)| *n)
                .collect()
        }
    }

    impl MessageSink for RecordingSink<'_> {
        fn send_message(&self, hwnd: WindowHandle, msg: Message) -> MessageResult {
            self.log.borrow_mut().push((hwnd, msg.name()));
            self.platform.default_window_proc(self, hwnd, &msg)
        }

        fn filter_activation(&self, hwnd: WindowHandle) -> bool {
            self.veto.borrow().contains(&hwnd)
        }
    }

    fn create(
        platform: &HeadlessPlatform,
        sink: &dyn MessageSink,
        class: ClassToken,
        style: Style,
        parent: Option<WindowHandle>,
    ) -> WindowHandle {
        platform
            .create_window(
                sink,
                &CreateParams {
                    class,
                    parent_or_owner: parent,
                    rect: Rect::new(100, 100, 400, 300),
                    name: "test".into(),
                    style,
                    ex_style: ExStyle::empty(),
                    token: CreationToken::from_raw(1),
                    message_only: false,
                },
            )
            .unwrap()
    }

    #[test]
    fn test_class_names_are_unique() {
        let platform = HeadlessPlatform::default();
        assert!(platform.register_class("Pane1", None).is_some());
        assert!(platform.register_class("Pane1", None).is_none());
        assert!(platform.is_class_registered("Pane1"));
    }

    #[test]
    fn test_create_sends_create_first() {
        let platform = HeadlessPlatform::default();
        let sink = RecordingSink::new(&platform);
        let class = platform.register_class("Pane", None).unwrap();
        let hwnd = create(&platform, &sink, class, Style::CAPTION | Style::VISIBLE, None);

        let names = sink.names_for(hwnd);
        assert_eq!(names[0], "Create");
        assert!(names.contains(&"ShowWindow"));
        assert!(platform.is_visible(hwnd));
    }

    #[test]
    fn test_destroy_order_and_invalidation() {
        let platform = HeadlessPlatform::default();
        let sink = RecordingSink::new(&platform);
        let class = platform.register_class("Pane", None).unwrap();
        let parent = create(&platform, &sink, class, Style::CAPTION, None);
        let child = create(&platform, &sink, class, Style::CHILD, Some(parent));
        let owned = create(&platform, &sink, class, Style::POPUP, Some(parent));
        sink.log.borrow_mut().clear();

        assert!(platform.destroy_window(&sink, parent));

        let log = sink.log.borrow().clone();
        let position = |h: WindowHandle, name: &str| {
            log.iter().position(|(lh, n)| *lh == h && *n == name).unwrap()
        };
        assert!(position(owned, "NcDestroy") < position(parent, "Destroy"));
        assert!(position(parent, "Destroy") < position(child, "Destroy"));
        assert!(position(child, "NcDestroy") < position(parent, "NcDestroy"));
        assert!(!platform.is_window(parent));
        assert!(!platform.is_window(child));
        assert!(!platform.is_window(owned));
        assert!(!platform.destroy_window(&sink, parent));
    }

    #[test]
    fn test_client_rect_uses_frame_metrics() {
        let platform = HeadlessPlatform::default();
        let sink = RecordingSink::new(&platform);
        let class = platform.register_class("Pane", None).unwrap();
        let hwnd = create(&platform, &sink, class, Style::CAPTION | Style::THICK_FRAME, None);

        let client = platform.client_rect_in_screen(hwnd).unwrap();
        assert_eq!(client, Rect::new(108, 131, 384, 261));

        platform.set_menu(hwnd, Some(MenuHandle::from_raw(5)));
        let client = platform.client_rect_in_screen(hwnd).unwrap();
        assert_eq!(client.top(), 151);
    }

    #[test]
    fn test_activation_moves_focus() {
        let platform = HeadlessPlatform::default();
        let sink = RecordingSink::new(&platform);
        let class = platform.register_class("Pane", None).unwrap();
        let a = create(&platform, &sink, class, Style::CAPTION | Style::VISIBLE, None);
        let b = create(&platform, &sink, class, Style::CAPTION | Style::VISIBLE, None);

        assert!(platform.set_foreground(&sink, a));
        assert_eq!(platform.focus(), Some(a));
        assert!(platform.set_foreground(&sink, b));
        assert_eq!(platform.foreground(), Some(b));
        assert_eq!(platform.focus(), Some(b));
        assert!(sink.names_for(a).contains(&"KillFocus"));
    }

    #[test]
    fn test_activation_filter_vetoes() {
        let platform = HeadlessPlatform::default();
        let sink = RecordingSink::new(&platform);
        let class = platform.register_class("Pane", None).unwrap();
        let hwnd = create(&platform, &sink, class, Style::CAPTION | Style::VISIBLE, None);
        sink.veto.borrow_mut().push(hwnd);

        // Without a filter the veto list is not consulted.
        assert!(platform.set_foreground(&sink, hwnd));
        platform.set_focus(&sink, None);
        platform.deactivate(&sink, hwnd);

        assert!(platform.install_activation_filter());
        assert!(!platform.set_foreground(&sink, hwnd));
        assert!(!platform.set_focus(&sink, Some(hwnd)));
        assert_eq!(platform.foreground(), None);
    }

    #[test]
    fn test_set_window_pos_restacks() {
        let platform = HeadlessPlatform::default();
        let sink = RecordingSink::new(&platform);
        let class = platform.register_class("Pane", None).unwrap();
        let a = create(&platform, &sink, class, Style::CAPTION | Style::VISIBLE, None);
        let b = create(&platform, &sink, class, Style::CAPTION | Style::VISIBLE, None);
        assert_eq!(platform.stacking_order(), vec![b, a]);

        let keep = SwpFlags::NO_MOVE | SwpFlags::NO_SIZE | SwpFlags::NO_ACTIVATE;
        platform.set_window_pos(&sink, a, Some(ZOrder::Topmost), Rect::default(), keep);
        assert!(platform.is_topmost(a));
        assert_eq!(platform.stacking_order(), vec![a, b]);

        platform.set_window_pos(&sink, a, Some(ZOrder::Bottom), Rect::default(), keep);
        assert!(!platform.is_topmost(a));
        assert_eq!(platform.stacking_order(), vec![b, a]);
    }

    #[test]
    fn test_maximize_and_restore() {
        let platform = HeadlessPlatform::default();
        let sink = RecordingSink::new(&platform);
        let class = platform.register_class("Pane", None).unwrap();
        let hwnd = create(&platform, &sink, class, Style::CAPTION | Style::VISIBLE, None);

        platform.show_window(&sink, hwnd, ShowCommand::Maximize);
        assert!(platform.is_zoomed(hwnd));
        assert_eq!(platform.window_rect(hwnd).unwrap(), Rect::new(0, 0, 1920, 1040));

        platform.show_window(&sink, hwnd, ShowCommand::Restore);
        assert!(!platform.is_zoomed(hwnd));
        assert_eq!(platform.window_rect(hwnd).unwrap(), Rect::new(100, 100, 400, 300));
    }

    #[test]
    fn test_posted_messages_are_purged_on_destroy() {
        let platform = HeadlessPlatform::default();
        let sink = RecordingSink::new(&platform);
        let class = platform.register_class("Pane", None).unwrap();
        let hwnd = create(&platform, &sink, class, Style::CAPTION, None);

        assert!(platform.post_message(hwnd, Message::Paint));
        assert_eq!(platform.pending_messages(), 1);
        platform.destroy_window(&sink, hwnd);
        assert_eq!(platform.pending_messages(), 0);
        assert!(!platform.post_message(hwnd, Message::Paint));
    }

    #[test]
    fn test_unknown_handle_geometry_errors() {
        let platform = HeadlessPlatform::default();
        let err = platform.window_rect(WindowHandle::default()).unwrap_err();
        assert!(matches!(err, PaneError::InvalidHandle(_)));
    }

    #[test]
    fn test_monitor_selection() {
        let platform = HeadlessPlatform::new(
            HeadlessConfig::new().add_monitor(Rect::new(1920, 0, 1280, 1024), Rect::new(1920, 0, 1280, 1024)),
        );
        let second = platform.monitor_from_rect(Rect::new(2000, 100, 300, 300));
        assert_eq!(second.bounds.x, 1920);
        assert!(!second.primary);
        let first = platform.monitor_from_rect(Rect::new(-5000, 0, 10, 10));
        assert!(first.primary);
    }
}
