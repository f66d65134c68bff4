//! Top-level window configuration and builder.
//!
//! [`TopLevelConfig`] collects the creation options for a
//! [`TopLevelWindow`](crate::TopLevelWindow) and translates the portable
//! [`WindowStyleMask`] into platform style bits.

use bitflags::bitflags;
use horizon_pane_core::{ExStyle, MonitorId, Rect, Style, WindowHandle};

bitflags! {
    /// Portable description of a window's decorations and behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct WindowStyleMask: u32 {
        /// Title bar and frame.
        const TITLED = 1 << 0;
        /// Close item enabled.
        const CLOSABLE = 1 << 1;
        /// Minimize button.
        const MINIMIZABLE = 1 << 2;
        /// Maximize button.
        const MAXIMIZABLE = 1 << 3;
        /// Per-pixel transparency.
        const TRANSPARENT = 1 << 4;
        /// Short-lived popup: no taskbar entry.
        const POPUP = 1 << 5;
        /// Tool palette: small caption, no taskbar entry.
        const UTILITY = 1 << 6;
        /// Title bar and content drawn as one surface.
        const UNIFIED = 1 << 7;
        /// Modal to its owner.
        const MODAL = 1 << 8;
        /// The content draws the frame; hit testing is delegated.
        const CUSTOM_FRAME = 1 << 9;
    }
}

impl Default for WindowStyleMask {
    fn default() -> Self {
        Self::TITLED | Self::CLOSABLE | Self::MINIMIZABLE | Self::MAXIMIZABLE
    }
}

impl WindowStyleMask {
    /// Platform style bits for a window created with this mask.
    pub fn to_styles(self) -> (Style, ExStyle) {
        let mut style = Style::CLIP_CHILDREN | Style::SYSMENU;
        let mut ex_style = ExStyle::empty();

        if self.contains(Self::TITLED) {
            ex_style |= ExStyle::WINDOW_EDGE;
            style |= Style::CAPTION;
            if self.contains(Self::MINIMIZABLE) {
                style |= Style::MINIMIZE_BOX;
            }
            if self.contains(Self::MAXIMIZABLE) {
                style |= Style::MAXIMIZE_BOX;
            }
        } else {
            style |= Style::POPUP;
            // Undecorated windows still minimize from the taskbar.
            if !self.contains(Self::MODAL) {
                style |= Style::MINIMIZE_BOX;
            }
        }

        if self.contains(Self::TRANSPARENT) {
            ex_style |= ExStyle::LAYERED;
        }
        if self.contains(Self::POPUP) {
            style |= Style::POPUP;
            ex_style |= ExStyle::TOOL_WINDOW;
        }
        if self.contains(Self::UTILITY) {
            ex_style |= ExStyle::TOOL_WINDOW;
        }
        (style, ex_style)
    }
}

/// Stacking level of a top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowLevel {
    /// Ordinary stacking.
    #[default]
    Normal,
    /// Above normal windows of other applications.
    Floating,
    /// Above everything.
    Topmost,
}

impl From<winit::window::WindowLevel> for WindowLevel {
    fn from(level: winit::window::WindowLevel) -> Self {
        match level {
            winit::window::WindowLevel::AlwaysOnTop => WindowLevel::Topmost,
            winit::window::WindowLevel::Normal | winit::window::WindowLevel::AlwaysOnBottom => {
                WindowLevel::Normal
            }
        }
    }
}

/// Configuration for creating a top-level window.
///
/// # Example
///
/// ```ignore
/// use horizon_pane::{TopLevelConfig, WindowStyleMask};
///
/// let config = TopLevelConfig::new("Inspector")
///     .with_mask(WindowStyleMask::TITLED | WindowStyleMask::UTILITY)
///     .with_bounds(Rect::new(100, 100, 320, 480))
///     .with_owner(main_window);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TopLevelConfig {
    title: String,
    mask: WindowStyleMask,
    bounds: Option<Rect>,
    owner: Option<WindowHandle>,
    monitor: Option<MonitorId>,
}

impl TopLevelConfig {
    /// A titled, closable, minimizable and maximizable window.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            mask: WindowStyleMask::default(),
            bounds: None,
            owner: None,
            monitor: None,
        }
    }

    /// Replace the style mask.
    pub fn with_mask(mut self, mask: WindowStyleMask) -> Self {
        self.mask = mask;
        self
    }

    /// Initial frame rectangle. Defaults to a centered rectangle covering
    /// three quarters of the monitor's work area.
    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Owner window. Owned windows stay above their owner and are destroyed
    /// with it.
    pub fn with_owner(mut self, owner: WindowHandle) -> Self {
        self.owner = Some(owner);
        self
    }

    /// The monitor the window starts on.
    pub fn with_monitor(mut self, monitor: MonitorId) -> Self {
        self.monitor = Some(monitor);
        self
    }

    /// Window title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Style mask.
    pub fn mask(&self) -> WindowStyleMask {
        self.mask
    }

    /// Explicit initial bounds, if any.
    pub fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    /// Owner window, if any.
    pub fn owner(&self) -> Option<WindowHandle> {
        self.owner
    }

    /// Starting monitor, if any.
    pub fn monitor(&self) -> Option<MonitorId> {
        self.monitor
    }

    /// Whether the window gets a platform frame.
    pub fn is_decorated(&self) -> bool {
        self.mask.contains(WindowStyleMask::TITLED)
    }
}

/// Default frame for windows created without explicit bounds.
pub(crate) fn default_bounds(work_area: Rect) -> Rect {
    let width = work_area.width * 3 / 4;
    let height = work_area.height * 3 / 4;
    Rect::new(
        work_area.x + (work_area.width - width) / 2,
        work_area.y + (work_area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titled_mask() {
        let (style, ex) = WindowStyleMask::default().to_styles();
        assert!(style.contains(Style::CAPTION | Style::MINIMIZE_BOX | Style::MAXIMIZE_BOX));
        assert!(style.contains(Style::SYSMENU | Style::CLIP_CHILDREN));
        assert!(!style.contains(Style::POPUP));
        assert_eq!(ex, ExStyle::WINDOW_EDGE);
    }

    #[test]
    fn test_untitled_mask() {
        let (style, ex) = WindowStyleMask::empty().to_styles();
        assert!(style.contains(Style::POPUP | Style::MINIMIZE_BOX));
        assert!(!style.contains(Style::CAPTION));
        assert!(ex.is_empty());

        let (modal, _) = WindowStyleMask::MODAL.to_styles();
        assert!(!modal.contains(Style::MINIMIZE_BOX));
    }

    #[test]
    fn test_popup_and_utility_are_tool_windows() {
        let (style, ex) = (WindowStyleMask::TITLED | WindowStyleMask::POPUP).to_styles();
        assert!(style.contains(Style::POPUP));
        assert!(ex.contains(ExStyle::TOOL_WINDOW));

        let (_, ex) = (WindowStyleMask::TITLED | WindowStyleMask::UTILITY).to_styles();
        assert!(ex.contains(ExStyle::TOOL_WINDOW));
    }

    #[test]
    fn test_transparent_is_layered() {
        let (_, ex) = WindowStyleMask::TRANSPARENT.to_styles();
        assert!(ex.contains(ExStyle::LAYERED));
    }

    #[test]
    fn test_default_bounds_centered() {
        let bounds = default_bounds(Rect::new(0, 0, 1920, 1040));
        assert_eq!(bounds, Rect::new(240, 130, 1440, 780));
    }

    #[test]
    fn test_builder() {
        let owner = WindowHandle::from_raw(1 << 32 | 1);
        let config = TopLevelConfig::new("Palette")
            .with_mask(WindowStyleMask::UTILITY)
            .with_bounds(Rect::new(1, 2, 3, 4))
            .with_owner(owner);
        assert_eq!(config.title(), "Palette");
        assert!(!config.is_decorated());
        assert_eq!(config.owner(), Some(owner));
        assert_eq!(config.bounds(), Some(Rect::new(1, 2, 3, 4)));
    }

    #[test]
    fn test_level_from_winit() {
        assert_eq!(WindowLevel::from(winit::window::WindowLevel::AlwaysOnTop), WindowLevel::Topmost);
        assert_eq!(WindowLevel::from(winit::window::WindowLevel::Normal), WindowLevel::Normal);
    }
}
