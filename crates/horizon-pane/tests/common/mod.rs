//! Recording doubles shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use horizon_pane::{
    MovingRequest, ResizeKind, TopLevelConfig, TopLevelWindow, ViewContainer, WindowContext,
    WindowDelegate,
};
use horizon_pane_core::{
    HeadlessPlatform, KeyInput, Message, MonitorInfo, Rect, TouchPoint, ViewId, WindowHandle,
};

/// Something a [`RecordingDelegate`] was told.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Move(i32, i32),
    Resize(ResizeKind, i32, i32),
    Moving(MovingRequest),
    Monitor(MonitorInfo),
    Focus(bool),
    FocusDisabled,
    Ungrab,
    Close,
    Destroy { registered: bool },
    DelegateWindow(Option<WindowHandle>),
}

/// Delegate logging every notification.
#[derive(Default)]
pub struct RecordingDelegate {
    events: RefCell<Vec<Event>>,
    /// Rectangle returned from `notify_moving`.
    pub moving_override: Cell<Option<Rect>>,
    /// Close the window from inside `notify_close`.
    pub close_on_request: RefCell<Option<Weak<TopLevelWindow>>>,
}

impl RecordingDelegate {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn resizes(&self) -> Vec<ResizeKind> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Resize(kind, _, _) => Some(*kind),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: &Event) -> usize {
        self.events.borrow().iter().filter(|e| *e == wanted).count()
    }

    fn push(&self, event: Event) {
        self.events.borrow_mut().push(event);
    }
}

impl WindowDelegate for RecordingDelegate {
    fn notify_move(&self, _ctx: &WindowContext, _hwnd: WindowHandle, x: i32, y: i32) {
        self.push(Event::Move(x, y));
    }

    fn notify_resize(&self, _ctx: &WindowContext, _hwnd: WindowHandle, kind: ResizeKind, width: i32, height: i32) {
        self.push(Event::Resize(kind, width, height));
    }

    fn notify_moving(&self, _ctx: &WindowContext, _hwnd: WindowHandle, request: &MovingRequest) -> Option<Rect> {
        self.push(Event::Moving(*request));
        self.moving_override.get()
    }

    fn notify_monitor_changed(&self, _ctx: &WindowContext, _hwnd: WindowHandle, monitor: MonitorInfo) {
        self.push(Event::Monitor(monitor));
    }

    fn notify_focus(&self, _ctx: &WindowContext, _hwnd: WindowHandle, focused: bool) {
        self.push(Event::Focus(focused));
    }

    fn notify_focus_disabled(&self, _ctx: &WindowContext, _hwnd: WindowHandle) {
        self.push(Event::FocusDisabled);
    }

    fn notify_focus_ungrab(&self, _ctx: &WindowContext, _hwnd: WindowHandle) {
        self.push(Event::Ungrab);
    }

    fn notify_close(&self, ctx: &WindowContext, _hwnd: WindowHandle) {
        self.push(Event::Close);
        let window = self.close_on_request.borrow().as_ref().and_then(Weak::upgrade);
        if let Some(window) = window {
            window.close(ctx);
        }
    }

    fn notify_destroy(&self, ctx: &WindowContext, hwnd: WindowHandle) {
        self.push(Event::Destroy {
            registered: ctx.window(hwnd).is_some(),
        });
    }

    fn notify_delegate_window(&self, _ctx: &WindowContext, _hwnd: WindowHandle, delegate: Option<WindowHandle>) {
        self.push(Event::DelegateWindow(delegate));
    }
}

/// View logging sizes and input.
pub struct RecordingView {
    id: ViewId,
    pub sizes: RefCell<Vec<(i32, i32)>>,
    pub typed: RefCell<String>,
    pub keys: RefCell<Vec<KeyInput>>,
    pub mouse: RefCell<Vec<Message>>,
    pub touches_down: Cell<usize>,
    pub drop_target: Cell<bool>,
}

impl RecordingView {
    pub fn new(id: u64) -> Rc<Self> {
        Rc::new(Self {
            id: ViewId::from_raw(id),
            sizes: RefCell::new(Vec::new()),
            typed: RefCell::new(String::new()),
            keys: RefCell::new(Vec::new()),
            mouse: RefCell::new(Vec::new()),
            touches_down: Cell::new(0),
            drop_target: Cell::new(false),
        })
    }

    pub fn view_id(&self) -> ViewId {
        self.id
    }
}

impl ViewContainer for RecordingView {
    fn id(&self) -> ViewId {
        self.id
    }

    fn handle_size(&self, _ctx: &WindowContext, _hwnd: WindowHandle, width: i32, height: i32) {
        self.sizes.borrow_mut().push((width, height));
    }

    fn handle_mouse(&self, _ctx: &WindowContext, _hwnd: WindowHandle, msg: &Message) -> bool {
        self.mouse.borrow_mut().push(msg.clone());
        true
    }

    fn handle_key(&self, _ctx: &WindowContext, _hwnd: WindowHandle, key: &KeyInput) {
        self.keys.borrow_mut().push(*key);
    }

    fn handle_typed(&self, _ctx: &WindowContext, _hwnd: WindowHandle, ch: char) {
        self.typed.borrow_mut().push(ch);
    }

    fn handle_touch(&self, _ctx: &WindowContext, _hwnd: WindowHandle, points: &[TouchPoint]) -> usize {
        let down = if points.is_empty() { 0 } else { points.len() };
        self.touches_down.set(down);
        down
    }

    fn init_drop_target(&self, _ctx: &WindowContext, _hwnd: WindowHandle) {
        self.drop_target.set(true);
    }

    fn release_drop_target(&self, _ctx: &WindowContext, _hwnd: WindowHandle) {
        self.drop_target.set(false);
    }
}

pub fn setup() -> (Rc<HeadlessPlatform>, WindowContext) {
    // Several tests share the process; only the first install wins.
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
    let platform = Rc::new(HeadlessPlatform::default());
    let ctx = WindowContext::new(platform.clone()).expect("context");
    (platform, ctx)
}

pub fn window_at(
    ctx: &WindowContext,
    title: &str,
    bounds: Rect,
    delegate: Option<Rc<RecordingDelegate>>,
) -> Rc<TopLevelWindow> {
    let delegate = delegate.map(|d| d as Rc<dyn WindowDelegate>);
    TopLevelWindow::create(ctx, TopLevelConfig::new(title).with_bounds(bounds), delegate)
        .expect("window")
}

/// Dispatch until the queue is empty.
pub fn drain(ctx: &WindowContext) {
    while ctx.pump_message(false) {}
}
