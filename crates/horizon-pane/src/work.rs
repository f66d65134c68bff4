//! Main-thread work items.
//!
//! A work item is owned by its caller until it is queued, then by the
//! application window's queue until it runs. The queue is a registry keyed by
//! id: the application window receives a `RunWork { id }` message, takes the
//! item out and executes it. Items that never run are simply dropped, which
//! also releases any thread waiting on them.
//!
//! Work submitted from other threads carries a [`CompletionHandle`]; the
//! submitting thread blocks on the matching [`CompletionWaiter`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::context::WindowContext;

/// A unit of main-thread work.
pub type Work = Box<dyn FnOnce(&WindowContext)>;

/// A unit of work submitted from another thread.
pub type SendWork = Box<dyn FnOnce(&WindowContext) + Send>;

/// How a work item was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkMode {
    /// Delivered by a synchronous message; the caller waits.
    Sync,
    /// Posted; the caller continues.
    Deferred,
}

/// A queued work item.
pub struct PendingWork {
    work: Work,
    mode: WorkMode,
}

impl PendingWork {
    /// Wrap a closure.
    pub fn new(work: Work, mode: WorkMode) -> Self {
        Self { work, mode }
    }

    /// How the item was submitted.
    pub fn mode(&self) -> WorkMode {
        self.mode
    }

    /// Run the item, consuming it.
    pub fn execute(self, ctx: &WindowContext) {
        (self.work)(ctx);
    }
}

impl std::fmt::Debug for PendingWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingWork")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

/// Registry of queued items, keyed by id.
#[derive(Debug, Default)]
pub(crate) struct WorkQueue {
    items: RefCell<HashMap<u64, PendingWork>>,
    next_id: Cell<u64>,
}

impl WorkQueue {
    /// Register an item and return its id.
    pub(crate) fn register(&self, item: PendingWork) -> u64 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.items.borrow_mut().insert(id, item);
        id
    }

    /// Remove an item by id.
    pub(crate) fn take(&self, id: u64) -> Option<PendingWork> {
        self.items.borrow_mut().remove(&id)
    }

    /// Number of queued items.
    pub(crate) fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Drop every queued item without running it.
    pub(crate) fn clear(&self) -> usize {
        // Dropping an item may run arbitrary destructors, so release the borrow first.
        let drained: Vec<PendingWork> = self.items.borrow_mut().drain().map(|(_, w)| w).collect();
        drained.len()
    }
}

// ============================================================================
// Cross-thread completion
// ============================================================================

/// What happened to a work item a thread is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOutcome {
    /// The item ran to completion.
    Ran,
    /// The item was dropped without running.
    Dropped,
}

struct CompletionState {
    outcome: Mutex<Option<WorkOutcome>>,
    condvar: Condvar,
}

/// Signals the waiting thread. Reports [`WorkOutcome::Dropped`] if it is
/// dropped before [`signal_ran`](Self::signal_ran) is called.
pub struct CompletionHandle {
    inner: Arc<CompletionState>,
    signalled: bool,
}

impl CompletionHandle {
    /// Report that the work ran.
    pub fn signal_ran(mut self) {
        self.signal(WorkOutcome::Ran);
    }

    fn signal(&mut self, outcome: WorkOutcome) {
        if self.signalled {
            return;
        }
        self.signalled = true;
        *self.inner.outcome.lock() = Some(outcome);
        self.inner.condvar.notify_all();
    }
}

impl Drop for CompletionHandle {
    fn drop(&mut self) {
        self.signal(WorkOutcome::Dropped);
    }
}

/// Blocks until the matching [`CompletionHandle`] reports.
pub struct CompletionWaiter {
    inner: Arc<CompletionState>,
}

impl CompletionWaiter {
    /// Wait for the outcome.
    ///
    /// Calling this on the main thread for work queued to the main thread
    /// deadlocks.
    pub fn wait(self) -> WorkOutcome {
        let mut outcome = self.inner.outcome.lock();
        loop {
            if let Some(result) = *outcome {
                return result;
            }
            self.inner.condvar.wait(&mut outcome);
        }
    }

    /// Wait with a timeout. Returns `None` if the timeout elapsed first.
    pub fn wait_timeout(self, timeout: std::time::Duration) -> Option<WorkOutcome> {
        let mut outcome = self.inner.outcome.lock();
        if outcome.is_none() {
            self.inner.condvar.wait_for(&mut outcome, timeout);
        }
        *outcome
    }
}

/// Create a completion handle/waiter pair.
pub fn completion_pair() -> (CompletionHandle, CompletionWaiter) {
    let state = Arc::new(CompletionState {
        outcome: Mutex::new(None),
        condvar: Condvar::new(),
    });
    (
        CompletionHandle {
            inner: state.clone(),
            signalled: false,
        },
        CompletionWaiter { inner: state },
    )
}

/// Work submitted from another thread, waiting to be moved onto the
/// application window's queue.
pub(crate) struct RemoteWork {
    pub(crate) work: SendWork,
    pub(crate) completion: Option<CompletionHandle>,
}

impl RemoteWork {
    /// Turn into a main-thread item that reports to the waiter once it runs.
    pub(crate) fn into_work(self) -> Work {
        let RemoteWork { work, completion } = self;
        Box::new(move |ctx: &WindowContext| {
            work(ctx);
            if let Some(completion) = completion {
                completion.signal_ran();
            }
        })
    }
}
