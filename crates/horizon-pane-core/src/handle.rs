//! Opaque handles for platform resources.
//!
//! [`WindowHandle`] is a slotmap key: generational, so a handle that outlives
//! its window never aliases a newer one. The other handles are plain integer
//! newtypes minted by the [`Platform`](crate::platform::Platform) that owns
//! the resource.

use slotmap::{Key, KeyData};

slotmap::new_key_type! {
    /// Identifier of a platform window.
    ///
    /// Unique per live window and invalidated once the window has received its
    /// final destroy notification.
    pub struct WindowHandle;
}

impl WindowHandle {
    /// Get the raw FFI representation of this handle.
    ///
    /// Useful for logging and for embedding layers that need a plain integer.
    #[inline]
    pub fn as_raw(self) -> u64 {
        self.data().as_ffi()
    }

    /// Reconstruct a handle from its raw representation.
    ///
    /// The handle may be stale; platform lookups on it then fail.
    #[inline]
    pub fn from_raw(raw: u64) -> Self {
        KeyData::from_ffi(raw).into()
    }
}

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            /// Wrap a raw identifier.
            #[inline]
            pub const fn from_raw(raw: u64) -> Self {
                Self(raw)
            }

            /// Get the raw identifier.
            #[inline]
            pub const fn as_raw(self) -> u64 {
                self.0
            }
        }
    };
}

id_newtype! {
    /// A registered window class.
    ClassToken
}

id_newtype! {
    /// A menu bar attached to a top-level window.
    MenuHandle
}

id_newtype! {
    /// A window icon.
    IconHandle
}

id_newtype! {
    /// A display monitor.
    MonitorId
}

id_newtype! {
    /// A content view attached to a top-level window.
    ViewId
}

id_newtype! {
    /// A per-window timer.
    TimerId
}

id_newtype! {
    /// Token passed through window creation so the dispatcher can bind the
    /// new handle to the object that requested it.
    CreationToken
}
