//! The window context: process-wide windowing state and the dispatcher.
//!
//! Everything that is global in a native windowing layer lives in one
//! [`WindowContext`] created at startup on the main thread: the handle
//! registry, the focus-grab slot, the class-name counter, the activation
//! hook, the application window, the active touch window and the pending
//! main-thread work. It is passed explicitly to every window operation.
//!
//! The context is also the [`MessageSink`] handed to the platform. Every
//! message funnels through [`dispatch`](WindowContext::dispatch): registry
//! lookup, the reentrancy guard in [`BaseWindow`](crate::BaseWindow), the
//! window's own switchboard, then release if the window died.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender};
use horizon_pane_core::logging::targets;
use horizon_pane_core::{
    CreateParams, CreationToken, ExStyle, Message, MessageResult, MessageSink, PaneError,
    Platform, Rect, Result, Style, ThreadAffinity, WindowHandle,
};

use crate::application::{ApplicationWindow, LoopFrame};
use crate::base_window::WindowProc;
use crate::top_level::TopLevelWindow;
use crate::work::{RemoteWork, WorkQueue};

/// Parameters for [`WindowContext::create_window`].
#[derive(Debug, Clone, PartialEq)]
pub struct WindowParams {
    /// Parent (child windows) or owner (top-level windows).
    pub parent_or_owner: Option<WindowHandle>,
    /// Initial frame rectangle.
    pub rect: Rect,
    /// Window title.
    pub name: String,
    /// Window styles.
    pub style: Style,
    /// Extended styles.
    pub ex_style: ExStyle,
    /// Class background color, `None` for no background brush.
    pub background: Option<u32>,
    /// Create a message-only window.
    pub message_only: bool,
}

impl WindowParams {
    /// Parameters for an ordinary window at `rect`.
    pub fn new(rect: Rect, style: Style, ex_style: ExStyle) -> Self {
        Self {
            parent_or_owner: None,
            rect,
            name: String::new(),
            style,
            ex_style,
            background: None,
            message_only: false,
        }
    }
}

// ============================================================================
// Activation hook
// ============================================================================

struct ActivationHook {
    platform: Rc<dyn Platform>,
    users: Cell<usize>,
}

/// Keeps the activation filter installed while held.
///
/// The filter is installed when the first guard is acquired and removed when
/// the last one is dropped.
pub struct ActivationHookGuard {
    hook: Rc<ActivationHook>,
}

impl std::fmt::Debug for ActivationHookGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActivationHookGuard")
            .field("users", &self.hook.users.get())
            .finish()
    }
}

impl Drop for ActivationHookGuard {
    fn drop(&mut self) {
        let users = self.hook.users.get().saturating_sub(1);
        self.hook.users.set(users);
        if users == 0 {
            self.hook.platform.uninstall_activation_filter();
        }
    }
}

// ============================================================================
// WindowContext
// ============================================================================

/// Process-wide windowing state. Lives on the main thread.
pub struct WindowContext {
    platform: Rc<dyn Platform>,
    affinity: ThreadAffinity,
    windows: RefCell<HashMap<WindowHandle, Rc<dyn WindowProc>>>,
    pending_creations: RefCell<HashMap<CreationToken, Rc<dyn WindowProc>>>,
    next_token: Cell<u64>,
    class_counter: Cell<u64>,
    grab: Cell<Option<WindowHandle>>,
    touch_window: Cell<Option<WindowHandle>>,
    hook: Rc<ActivationHook>,
    pub(crate) application: Cell<Option<WindowHandle>>,
    pub(crate) work: WorkQueue,
    pub(crate) inbox: Receiver<RemoteWork>,
    pub(crate) sender: Sender<RemoteWork>,
    pub(crate) accepting: Arc<AtomicBool>,
    pub(crate) loops: RefCell<Vec<Rc<LoopFrame>>>,
}

impl WindowContext {
    /// Create the context and its application window on the current thread.
    ///
    /// # Errors
    ///
    /// Returns [`PaneError::NoApplicationWindow`] if the application window
    /// cannot be created.
    pub fn new(platform: Rc<dyn Platform>) -> Result<Self> {
        let (sender, inbox) = crossbeam_channel::unbounded();
        let ctx = Self {
            hook: Rc::new(ActivationHook {
                platform: platform.clone(),
                users: Cell::new(0),
            }),
            platform,
            affinity: ThreadAffinity::current(),
            windows: RefCell::new(HashMap::new()),
            pending_creations: RefCell::new(HashMap::new()),
            next_token: Cell::new(0),
            class_counter: Cell::new(0),
            grab: Cell::new(None),
            touch_window: Cell::new(None),
            application: Cell::new(None),
            work: WorkQueue::default(),
            inbox,
            sender,
            accepting: Arc::new(AtomicBool::new(true)),
            loops: RefCell::new(Vec::new()),
        };
        ApplicationWindow::create(&ctx).ok_or(PaneError::NoApplicationWindow)?;
        tracing::debug!(target: targets::APPLICATION, "window context ready");
        Ok(ctx)
    }

    /// The windowing system underneath.
    pub fn platform(&self) -> &dyn Platform {
        &*self.platform
    }

    /// The thread this context belongs to.
    pub fn affinity(&self) -> ThreadAffinity {
        self.affinity
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// The window object bound to `hwnd`.
    pub fn window(&self, hwnd: WindowHandle) -> Option<Rc<dyn WindowProc>> {
        self.windows.borrow().get(&hwnd).cloned()
    }

    /// The top-level window bound to `hwnd`.
    pub fn top_level(&self, hwnd: WindowHandle) -> Option<Rc<TopLevelWindow>> {
        self.window(hwnd)?.into_any().downcast::<TopLevelWindow>().ok()
    }

    /// Every registered top-level window.
    pub fn top_levels(&self) -> Vec<Rc<TopLevelWindow>> {
        let windows: Vec<Rc<dyn WindowProc>> = self.windows.borrow().values().cloned().collect();
        windows
            .into_iter()
            .filter_map(|w| w.into_any().downcast::<TopLevelWindow>().ok())
            .collect()
    }

    /// Handles of every registered window.
    pub fn handles(&self) -> Vec<WindowHandle> {
        let mut handles: Vec<WindowHandle> = self.windows.borrow().keys().copied().collect();
        handles.sort_by_key(|h| h.as_raw());
        handles
    }

    /// Number of registered windows, the application window included.
    pub fn window_count(&self) -> usize {
        self.windows.borrow().len()
    }

    /// Register a class and create a platform window bound to `window`.
    ///
    /// The class is named `<suffix><counter>` with a counter that never
    /// repeats. On failure nothing is retained: the class is unregistered and
    /// the object is never added to the registry.
    pub fn create_window(
        &self,
        window: Rc<dyn WindowProc>,
        params: WindowParams,
    ) -> Option<WindowHandle> {
        self.affinity.debug_assert_same_thread();

        let counter = self.class_counter.get() + 1;
        self.class_counter.set(counter);
        let class_name = format!("{}{}", window.class_name_suffix(), counter);

        let Some(class) = self.platform.register_class(&class_name, params.background) else {
            tracing::error!(
                target: targets::DISPATCH,
                error = %PaneError::ClassRegistration(class_name),
                "window class registration failed"
            );
            return None;
        };
        window.base().set_class(Some(class));

        let token = CreationToken::from_raw(self.next_token.get() + 1);
        self.next_token.set(token.as_raw());
        self.pending_creations.borrow_mut().insert(token, window.clone());

        let create = CreateParams {
            class,
            parent_or_owner: params.parent_or_owner,
            rect: params.rect,
            name: params.name,
            style: params.style,
            ex_style: params.ex_style,
            token,
            message_only: params.message_only,
        };
        let hwnd = self.platform.create_window(self, &create);
        // Creation either bound the object or failed; the token is spent.
        self.pending_creations.borrow_mut().remove(&token);

        match hwnd {
            Some(hwnd) => {
                tracing::debug!(
                    target: targets::DISPATCH,
                    hwnd = hwnd.as_raw(),
                    class = %class_name,
                    kind = ?window.kind(),
                    "window created"
                );
                Some(hwnd)
            }
            None => {
                tracing::error!(
                    target: targets::DISPATCH,
                    error = %PaneError::WindowCreation(class_name),
                    "window creation failed"
                );
                // A window bound during Create and destroyed again was released
                // by the trampoline, which already took the class.
                if window.base().class().is_some() {
                    self.platform.unregister_class(class);
                    window.base().set_class(None);
                }
                None
            }
        }
    }

    /// Destroy a platform window and everything it owns.
    pub fn destroy_window(&self, hwnd: WindowHandle) -> bool {
        self.platform.destroy_window(self, hwnd)
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Route one message to the window procedure bound to `hwnd`.
    ///
    /// Unknown handles get platform default handling.
    pub fn dispatch(&self, hwnd: WindowHandle, msg: Message) -> MessageResult {
        let window = match &msg {
            Message::Create { token } => self.bind_pending(*token, hwnd),
            _ => self.window(hwnd),
        };
        let Some(window) = window else {
            return self.platform.default_window_proc(self, hwnd, &msg);
        };

        tracing::trace!(target: targets::DISPATCH, hwnd = hwnd.as_raw(), msg = msg.name(), "dispatch");

        let base = window.base();
        base.begin_message_processing(&msg);
        let result = window.window_proc(self, hwnd, msg);
        if base.end_message_processing() {
            self.release(hwnd, window);
        }
        result
    }

    fn bind_pending(&self, token: CreationToken, hwnd: WindowHandle) -> Option<Rc<dyn WindowProc>> {
        let window = self.pending_creations.borrow_mut().remove(&token)?;
        window.base().bind(hwnd);
        self.windows.borrow_mut().insert(hwnd, window.clone());
        Some(window)
    }

    fn release(&self, hwnd: WindowHandle, window: Rc<dyn WindowProc>) {
        self.windows.borrow_mut().remove(&hwnd);
        if self.grab.get() == Some(hwnd) {
            self.grab.set(None);
        }
        if self.touch_window.get() == Some(hwnd) {
            self.touch_window.set(None);
        }
        window.on_final_release(self);

        if let Some(class) = window.base().class() {
            window.base().set_class(None);
            // The platform still knows the window until the destroy call
            // unwinds, so the class can only go once the queue runs again.
            self.execute_on_main_thread_later(move |ctx| {
                ctx.platform().unregister_class(class);
            });
        }
        tracing::debug!(target: targets::DISPATCH, hwnd = hwnd.as_raw(), kind = ?window.kind(), "window released");
    }

    // =========================================================================
    // Process-wide slots
    // =========================================================================

    /// The window currently holding the focus grab.
    pub fn grab_holder(&self) -> Option<WindowHandle> {
        self.grab.get()
    }

    pub(crate) fn set_grab_holder(&self, holder: Option<WindowHandle>) {
        self.grab.set(holder);
    }

    /// Release the current grab through the window that holds it.
    pub fn reset_grab(&self) {
        let Some(holder) = self.grab.get() else {
            return;
        };
        if let Some(window) = self.grab_owner(holder) {
            window.ungrab_focus(self);
        }
        self.grab.set(None);
    }

    /// The top-level window whose effective handle is `holder`: the window
    /// itself, or the window redirecting to `holder` as its delegate.
    fn grab_owner(&self, holder: WindowHandle) -> Option<Rc<TopLevelWindow>> {
        if let Some(window) = self.top_level(holder) {
            return Some(window);
        }
        self.top_levels()
            .into_iter()
            .find(|w| w.delegate_window() == Some(holder))
    }

    /// The window receiving the current touch sequence.
    pub fn active_touch_window(&self) -> Option<WindowHandle> {
        self.touch_window.get()
    }

    pub(crate) fn set_active_touch_window(&self, hwnd: Option<WindowHandle>) {
        self.touch_window.set(hwnd);
    }

    /// Keep the activation filter installed for as long as the guard lives.
    pub fn acquire_activation_hook(&self) -> ActivationHookGuard {
        let users = self.hook.users.get();
        if users == 0 && !self.platform.install_activation_filter() {
            tracing::warn!(target: targets::GRAB, "activation filter could not be installed");
        }
        self.hook.users.set(users + 1);
        ActivationHookGuard {
            hook: self.hook.clone(),
        }
    }
}

impl MessageSink for WindowContext {
    fn send_message(&self, hwnd: WindowHandle, msg: Message) -> MessageResult {
        self.dispatch(hwnd, msg)
    }

    fn filter_activation(&self, hwnd: WindowHandle) -> bool {
        match self.top_level(hwnd) {
            Some(window) => window.filter_activation(self),
            None => false,
        }
    }
}

impl std::fmt::Debug for WindowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowContext")
            .field("windows", &self.window_count())
            .field("grab", &self.grab.get())
            .field("touch_window", &self.touch_window.get())
            .field("application", &self.application.get())
            .field("pending_work", &self.work.len())
            .finish_non_exhaustive()
    }
}

impl Drop for WindowContext {
    fn drop(&mut self) {
        self.accepting.store(false, Ordering::SeqCst);
        let dropped = self.inbox.try_iter().count() + self.work.clear();
        if dropped > 0 {
            tracing::debug!(target: targets::APPLICATION, dropped, "pending work dropped at shutdown");
        }
    }
}
