//! Error types for Horizon Pane.
//!
//! Window dispatch itself never fails outward: a stale handle falls through to
//! platform default handling and a failed transition leaves state intact. The
//! errors here cover the setup and platform-query paths that can fail.

use crate::handle::WindowHandle;

/// The main error type for Horizon Pane operations.
#[derive(Debug, thiserror::Error)]
pub enum PaneError {
    /// A window class could not be registered.
    #[error("failed to register window class `{0}`")]
    ClassRegistration(String),

    /// The platform refused to create a window.
    #[error("failed to create window: {0}")]
    WindowCreation(String),

    /// The handle does not name a live platform window.
    #[error("invalid window handle {0:?}")]
    InvalidHandle(WindowHandle),

    /// The application window has not been created or is already gone.
    #[error("the application window is not available")]
    NoApplicationWindow,

    /// A work item posted to the main thread was released before it ran.
    #[error("main-thread work was dropped before it executed")]
    WorkDropped,

    /// An operation that requires the main thread was called elsewhere.
    #[error("operation must be performed on the main thread")]
    WrongThread,
}

/// A specialized Result type for Horizon Pane operations.
pub type Result<T> = std::result::Result<T, PaneError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PaneError::ClassRegistration("HorizonTopLevel7".into());
        assert_eq!(
            err.to_string(),
            "failed to register window class `HorizonTopLevel7`"
        );
        assert_eq!(
            PaneError::NoApplicationWindow.to_string(),
            "the application window is not available"
        );
    }
}
