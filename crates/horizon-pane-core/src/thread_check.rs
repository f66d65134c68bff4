//! Thread affinity checks.
//!
//! All window objects live on the thread that created the
//! `WindowContext`. That thread is captured in a [`ThreadAffinity`] at
//! context creation; other threads may only submit work through the
//! thread-safe main-thread handle, which uses the affinity to decide
//! between running inline and posting.
//!
//! ```ignore
//! use horizon_pane_core::thread_check::ThreadAffinity;
//!
//! let affinity = ThreadAffinity::current();
//! std::thread::spawn(move || {
//!     assert!(!affinity.is_same_thread());
//! });
//! ```

use std::thread::ThreadId;

/// Records the thread an object or context is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Bind to the calling thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// The bound thread's id.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Whether the calling thread is the bound thread.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Panic if called from a thread other than the bound one.
    #[track_caller]
    pub fn assert_same_thread(&self) {
        if !self.is_same_thread() {
            let location = std::panic::Location::caller();
            panic_wrong_thread(self.thread_id, location.file(), location.line());
        }
    }

    /// Like [`assert_same_thread`](Self::assert_same_thread), but only in
    /// debug builds.
    #[inline]
    #[track_caller]
    pub fn debug_assert_same_thread(&self) {
        #[cfg(debug_assertions)]
        self.assert_same_thread();
    }
}

#[cold]
#[inline(never)]
fn panic_wrong_thread(expected: ThreadId, file: &str, line: u32) -> ! {
    let current = std::thread::current();
    let name = current.name().unwrap_or("<unnamed>");
    panic!(
        "window operation called off the main thread at {file}:{line}: \
         current thread \"{name}\" ({:?}), main thread {expected:?}. \
         Submit the work through a MainThreadHandle instead.",
        current.id()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_affinity_same_thread() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_same_thread());
        affinity.assert_same_thread();
    }

    #[test]
    fn test_affinity_other_thread() {
        let affinity = ThreadAffinity::current();
        let off_thread = Arc::new(AtomicBool::new(false));
        let flag = off_thread.clone();

        std::thread::spawn(move || {
            flag.store(!affinity.is_same_thread(), Ordering::SeqCst);
        })
        .join()
        .unwrap();

        assert!(off_thread.load(Ordering::SeqCst));
    }

    #[test]
    fn test_affinity_panics_on_wrong_thread() {
        let affinity = ThreadAffinity::current();
        let result = std::thread::spawn(move || affinity.assert_same_thread()).join();
        assert!(result.is_err());
    }
}
