//! The application window: main-thread work queue and message loops.
//!
//! Every [`WindowContext`] owns one message-only [`ApplicationWindow`].
//! Work for the main thread is registered in the context's queue and
//! delivered to that window as a `RunWork` message, either synchronously
//! ([`WindowContext::execute_on_main_thread`]) or posted
//! ([`WindowContext::execute_on_main_thread_later`]). Once the application
//! window is gone, new work is dropped without running and pending work is
//! released.
//!
//! Other threads submit work through a [`MainThreadHandle`]; the next pump
//! of the message loop moves it onto the queue.
//!
//! # Example
//!
//! ```ignore
//! use horizon_pane::WindowContext;
//!
//! let handle = ctx.main_thread_handle();
//! std::thread::spawn(move || {
//!     handle.execute_later(|ctx| ctx.quit());
//! });
//! ctx.run()?;
//! ```

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{RecvTimeoutError, Sender};
use horizon_pane_core::logging::{span_names, targets};
use horizon_pane_core::{
    ExStyle, Message, MessageResult, PaneError, Rect, Result, Style, ThreadAffinity,
    WindowHandle,
};

use crate::base_window::{BaseWindow, WindowKind, WindowProc};
use crate::context::{WindowContext, WindowParams};
use crate::work::{PendingWork, RemoteWork, Work, WorkMode, WorkOutcome, completion_pair};

/// How long a waiting pump blocks for cross-thread work before it returns.
const IDLE_WAIT: Duration = Duration::from_millis(10);

/// The process-wide message-only window that runs main-thread work.
pub struct ApplicationWindow {
    base: BaseWindow,
}

impl ApplicationWindow {
    /// Create the application window for `ctx`.
    pub(crate) fn create(ctx: &WindowContext) -> Option<Rc<Self>> {
        let window = Rc::new(Self {
            base: BaseWindow::new(None),
        });
        let params = WindowParams {
            name: "HorizonPaneApplication".to_string(),
            message_only: true,
            ..WindowParams::new(Rect::default(), Style::empty(), ExStyle::empty())
        };
        let hwnd = ctx.create_window(window.clone(), params)?;
        ctx.application.set(Some(hwnd));
        Some(window)
    }

    fn shut_down(&self, ctx: &WindowContext) {
        ctx.application.set(None);
        ctx.accepting.store(false, Ordering::SeqCst);
        // Dropping remote items wakes their waiters with `Dropped`.
        let remote = ctx.inbox.try_iter().count();
        let local = ctx.work.clear();
        tracing::debug!(
            target: targets::APPLICATION,
            dropped = remote + local,
            "application window destroyed, pending work released"
        );
    }
}

impl WindowProc for ApplicationWindow {
    fn base(&self) -> &BaseWindow {
        &self.base
    }

    fn kind(&self) -> WindowKind {
        WindowKind::Application
    }

    fn class_name_suffix(&self) -> &'static str {
        "HorizonPaneApplication"
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
        self
    }

    fn window_proc(&self, ctx: &WindowContext, hwnd: WindowHandle, msg: Message) -> MessageResult {
        match msg {
            Message::RunWork { id } => {
                if let Some(item) = ctx.work.take(id) {
                    tracing::trace!(target: targets::APPLICATION, id, mode = ?item.mode(), "running work");
                    item.execute(ctx);
                }
                MessageResult::ZERO
            }
            Message::Destroy => {
                self.shut_down(ctx);
                MessageResult::ZERO
            }
            msg => self.base.common_window_proc(ctx, hwnd, &msg),
        }
    }
}

impl std::fmt::Debug for ApplicationWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationWindow")
            .field("handle", &self.base.handle())
            .finish()
    }
}

// ============================================================================
// Message loops
// ============================================================================

/// One running message loop.
#[derive(Default)]
pub(crate) struct LoopFrame {
    stop: Cell<bool>,
    retval: RefCell<Option<Box<dyn Any>>>,
}

impl WindowContext {
    /// The application window, while it exists.
    pub fn application_window(&self) -> Option<WindowHandle> {
        self.application.get()
    }

    /// Run `work` through the application window and wait for it.
    ///
    /// Returns `false` (dropping `work`) when there is no application window.
    pub fn execute_on_main_thread<F>(&self, work: F) -> bool
    where
        F: FnOnce(&WindowContext) + 'static,
    {
        self.affinity().debug_assert_same_thread();
        let Some(app) = self.application.get() else {
            return false;
        };
        let id = self.work.register(PendingWork::new(Box::new(work), WorkMode::Sync));
        self.dispatch(app, Message::RunWork { id });
        // Still queued means the window went away before it could run.
        self.work.take(id).is_none()
    }

    /// Queue `work` to run on a later pump of the message loop.
    ///
    /// Returns `false` (dropping `work`) when there is no application window.
    pub fn execute_on_main_thread_later<F>(&self, work: F) -> bool
    where
        F: FnOnce(&WindowContext) + 'static,
    {
        self.post_work(Box::new(work))
    }

    fn post_work(&self, work: Work) -> bool {
        let Some(app) = self.application.get() else {
            tracing::trace!(target: targets::APPLICATION, "no application window, work dropped");
            return false;
        };
        let id = self.work.register(PendingWork::new(work, WorkMode::Deferred));
        if !self.platform().post_message(app, Message::RunWork { id }) {
            self.work.take(id);
            return false;
        }
        true
    }

    /// A thread-safe handle for submitting work from other threads.
    pub fn main_thread_handle(&self) -> MainThreadHandle {
        MainThreadHandle {
            sender: self.sender.clone(),
            accepting: self.accepting.clone(),
            affinity: self.affinity(),
        }
    }

    /// Process at most one queued message. With `wait`, block briefly for
    /// cross-thread work when nothing is queued.
    ///
    /// Returns whether anything was processed.
    pub fn pump_message(&self, wait: bool) -> bool {
        let mut progressed = false;
        for remote in self.inbox.try_iter() {
            self.post_work(remote.into_work());
            progressed = true;
        }
        if let Some((hwnd, msg)) = self.platform().next_message() {
            self.dispatch(hwnd, msg);
            return true;
        }
        if wait && !progressed {
            match self.inbox.recv_timeout(IDLE_WAIT) {
                Ok(remote) => {
                    self.post_work(remote.into_work());
                    progressed = true;
                }
                Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {}
            }
        }
        progressed
    }

    fn run_frame(&self, frame: &Rc<LoopFrame>) -> Option<Box<dyn Any>> {
        self.loops.borrow_mut().push(frame.clone());
        while self.application.get().is_some() && !frame.stop.get() {
            self.pump_message(true);
        }
        self.loops.borrow_mut().retain(|f| !Rc::ptr_eq(f, frame));
        frame.retval.borrow_mut().take()
    }

    /// Pump messages until [`quit`](Self::quit) is called or the application
    /// window goes away.
    ///
    /// # Errors
    ///
    /// Returns [`PaneError::NoApplicationWindow`] if there is nothing to run.
    #[tracing::instrument(skip(self), target = "horizon_pane::application", level = "debug")]
    pub fn run(&self) -> Result<()> {
        if self.application.get().is_none() {
            return Err(PaneError::NoApplicationWindow);
        }
        tracing::info!(target: targets::APPLICATION, "message loop started");
        self.run_frame(&Rc::new(LoopFrame::default()));
        tracing::info!(target: targets::APPLICATION, "message loop finished");
        Ok(())
    }

    /// Stop every running loop, the outermost one included.
    pub fn quit(&self) {
        tracing::info!(target: targets::APPLICATION, "quit requested");
        for frame in self.loops.borrow().iter() {
            frame.stop.set(true);
        }
    }

    /// Run a nested message loop until
    /// [`leave_nested_loop`](Self::leave_nested_loop) is called. Returns the
    /// value passed there.
    pub fn enter_nested_loop(&self) -> Option<Box<dyn Any>> {
        let depth = self.loops.borrow().len();
        let _span = tracing::debug_span!(target: targets::APPLICATION, span_names::NESTED_LOOP, depth).entered();
        self.run_frame(&Rc::new(LoopFrame::default()))
    }

    /// Stop the innermost loop, handing it `retval`.
    pub fn leave_nested_loop(&self, retval: Option<Box<dyn Any>>) {
        let innermost = self.loops.borrow().last().cloned();
        if let Some(frame) = innermost {
            *frame.retval.borrow_mut() = retval;
            frame.stop.set(true);
        }
    }

    /// Number of running message loops.
    pub fn loop_depth(&self) -> usize {
        self.loops.borrow().len()
    }
}

// ============================================================================
// Cross-thread submission
// ============================================================================

/// Submits work to the main thread from any thread.
#[derive(Clone)]
pub struct MainThreadHandle {
    sender: Sender<RemoteWork>,
    accepting: Arc<AtomicBool>,
    affinity: ThreadAffinity,
}

static_assertions::assert_impl_all!(MainThreadHandle: Send, Sync);

impl MainThreadHandle {
    /// Whether the calling thread is the main thread.
    pub fn is_main_thread(&self) -> bool {
        self.affinity.is_same_thread()
    }

    /// Queue `work` without waiting. Returns `false` if the main thread no
    /// longer accepts work.
    pub fn execute_later<F>(&self, work: F) -> bool
    where
        F: FnOnce(&WindowContext) + Send + 'static,
    {
        if !self.accepting.load(Ordering::SeqCst) {
            return false;
        }
        self.sender
            .send(RemoteWork {
                work: Box::new(work),
                completion: None,
            })
            .is_ok()
    }

    /// Queue `work` and block until it has run.
    ///
    /// # Errors
    ///
    /// - [`PaneError::WrongThread`] when called on the main thread, which
    ///   would wait on itself; use
    ///   [`WindowContext::execute_on_main_thread`] there.
    /// - [`PaneError::WorkDropped`] when the work was released without
    ///   running.
    pub fn execute<F>(&self, work: F) -> Result<()>
    where
        F: FnOnce(&WindowContext) + Send + 'static,
    {
        if self.is_main_thread() {
            return Err(PaneError::WrongThread);
        }
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(PaneError::WorkDropped);
        }
        let (completion, waiter) = completion_pair();
        self.sender
            .send(RemoteWork {
                work: Box::new(work),
                completion: Some(completion),
            })
            .map_err(|_| PaneError::WorkDropped)?;
        match waiter.wait() {
            WorkOutcome::Ran => Ok(()),
            WorkOutcome::Dropped => Err(PaneError::WorkDropped),
        }
    }
}

impl std::fmt::Debug for MainThreadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainThreadHandle")
            .field("accepting", &self.accepting.load(Ordering::SeqCst))
            .field("main_thread", &self.affinity.thread_id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use horizon_pane_core::HeadlessPlatform;

    fn context() -> WindowContext {
        WindowContext::new(Rc::new(HeadlessPlatform::default())).unwrap()
    }

    /// Sets its flag when dropped.
    struct DropFlag(Rc<Cell<bool>>);

    impl Drop for DropFlag {
        fn drop(&mut self) {
            self.0.set(true);
        }
    }

    #[test]
    fn test_execute_runs_inline() {
        let ctx = context();
        let ran = Rc::new(Cell::new(false));
        let flag = ran.clone();
        assert!(ctx.execute_on_main_thread(move |_| flag.set(true)));
        assert!(ran.get());
    }

    #[test]
    fn test_execute_later_waits_for_pump() {
        let ctx = context();
        let ran = Rc::new(Cell::new(0));
        let counter = ran.clone();
        assert!(ctx.execute_on_main_thread_later(move |_| counter.set(counter.get() + 1)));
        assert_eq!(ran.get(), 0);
        while ctx.pump_message(false) {}
        assert_eq!(ran.get(), 1);
    }

    #[test]
    fn test_work_dropped_without_application_window() {
        let ctx = context();
        let app = ctx.application_window().unwrap();
        ctx.destroy_window(app);
        assert_eq!(ctx.application_window(), None);

        let dropped = Rc::new(Cell::new(false));
        let ran = Rc::new(Cell::new(false));
        let guard = DropFlag(dropped.clone());
        let flag = ran.clone();
        assert!(!ctx.execute_on_main_thread_later(move |_| {
            let _guard = &guard;
            flag.set(true);
        }));
        assert!(dropped.get());
        assert!(!ran.get());
        assert!(!ctx.execute_on_main_thread(|_| {}));
    }

    #[test]
    fn test_pending_work_released_with_application_window() {
        let ctx = context();
        let dropped = Rc::new(Cell::new(false));
        let guard = DropFlag(dropped.clone());
        ctx.execute_on_main_thread_later(move |_| {
            let _guard = &guard;
        });
        assert!(!dropped.get());
        ctx.destroy_window(ctx.application_window().unwrap());
        assert!(dropped.get());
    }

    #[test]
    fn test_nested_loop_returns_value() {
        let ctx = context();
        ctx.execute_on_main_thread_later(|ctx| {
            assert_eq!(ctx.loop_depth(), 1);
            ctx.leave_nested_loop(Some(Box::new(42_i32)));
        });
        let retval = ctx.enter_nested_loop().unwrap();
        assert_eq!(retval.downcast_ref::<i32>(), Some(&42));
        assert_eq!(ctx.loop_depth(), 0);
    }

    #[test]
    fn test_quit_stops_run() {
        let ctx = context();
        ctx.execute_on_main_thread_later(|ctx| ctx.quit());
        assert!(ctx.run().is_ok());
    }

    #[test]
    fn test_cross_thread_execute() {
        let ctx = context();
        let handle = ctx.main_thread_handle();
        assert!(matches!(handle.execute(|_| {}), Err(PaneError::WrongThread)));

        let ran = Arc::new(AtomicBool::new(false));
        let flag = ran.clone();
        let worker = std::thread::spawn(move || {
            handle.execute(move |ctx| {
                assert!(ctx.affinity().is_same_thread());
                flag.store(true, Ordering::SeqCst);
            })
        });
        while !worker.is_finished() {
            ctx.pump_message(true);
        }
        assert!(worker.join().unwrap().is_ok());
        assert!(ran.load(Ordering::SeqCst));
    }

    #[test]
    fn test_cross_thread_waiter_woken_at_shutdown() {
        let ctx = context();
        let handle = ctx.main_thread_handle();
        let worker = std::thread::spawn(move || handle.execute(|_| {}));
        while ctx.inbox.is_empty() {
            std::thread::sleep(Duration::from_millis(1));
        }
        ctx.destroy_window(ctx.application_window().unwrap());
        assert!(matches!(worker.join().unwrap(), Err(PaneError::WorkDropped)));
    }
}
