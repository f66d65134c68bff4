//! Window style bits, positioning flags and z-order bands.
//!
//! The bit values follow the desktop window manager's own encoding so that a
//! native [`Platform`](crate::platform::Platform) can pass them through
//! unchanged.

bitflags::bitflags! {
    /// Window styles.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Style: u32 {
        /// Has a maximize button.
        const MAXIMIZE_BOX = 0x0001_0000;
        /// Has a minimize button.
        const MINIMIZE_BOX = 0x0002_0000;
        /// Has a sizing border.
        const THICK_FRAME = 0x0004_0000;
        /// Has a window menu on its title bar.
        const SYSMENU = 0x0008_0000;
        /// Has a thin-line border.
        const BORDER = 0x0080_0000;
        /// Has a title bar (includes the border).
        const CAPTION = 0x00C0_0000;
        /// Initially maximized.
        const MAXIMIZE = 0x0100_0000;
        /// Clips child windows when painting.
        const CLIP_CHILDREN = 0x0200_0000;
        /// Clips sibling windows when painting.
        const CLIP_SIBLINGS = 0x0400_0000;
        /// Disabled for input.
        const DISABLED = 0x0800_0000;
        /// Visible.
        const VISIBLE = 0x1000_0000;
        /// Initially minimized.
        const MINIMIZE = 0x2000_0000;
        /// A child window.
        const CHILD = 0x4000_0000;
        /// A pop-up window.
        const POPUP = 0x8000_0000;
    }
}

bitflags::bitflags! {
    /// Extended window styles.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExStyle: u32 {
        /// Topmost band member.
        const TOPMOST = 0x0000_0008;
        /// Transparent to hit testing.
        const TRANSPARENT = 0x0000_0020;
        /// Tool window: no taskbar button, small caption.
        const TOOL_WINDOW = 0x0000_0080;
        /// Raised-edge border.
        const WINDOW_EDGE = 0x0000_0100;
        /// Sunken-edge border.
        const CLIENT_EDGE = 0x0000_0200;
        /// Forced onto the taskbar.
        const APP_WINDOW = 0x0004_0000;
        /// Layered: per-window opacity.
        const LAYERED = 0x0008_0000;
        /// Never activated by clicks or programmatic requests.
        const NO_ACTIVATE = 0x0800_0000;
    }
}

bitflags::bitflags! {
    /// Flags controlling a position/size/z-order change.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SwpFlags: u32 {
        /// Keep the current size.
        const NO_SIZE = 0x0001;
        /// Keep the current position.
        const NO_MOVE = 0x0002;
        /// Keep the current z-order.
        const NO_ZORDER = 0x0004;
        /// Do not redraw.
        const NO_REDRAW = 0x0008;
        /// Do not activate.
        const NO_ACTIVATE = 0x0010;
        /// Recompute the frame after a style change.
        const FRAME_CHANGED = 0x0020;
        /// Show the window.
        const SHOW_WINDOW = 0x0040;
        /// Hide the window.
        const HIDE_WINDOW = 0x0080;
        /// Discard the client area contents.
        const NO_COPY_BITS = 0x0100;
        /// Do not change the owner's z-order.
        const NO_OWNER_ZORDER = 0x0200;
        /// Do not send the position-changing message.
        const NO_SEND_CHANGING = 0x0400;
        /// Post the request instead of performing it synchronously.
        const ASYNC = 0x4000;
    }
}

/// Where a window is placed in the z-order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZOrder {
    /// Top of the window's current band.
    Top,
    /// Bottom of the whole stack.
    Bottom,
    /// Top of the topmost band.
    Topmost,
    /// Top of the normal band, leaving the topmost band.
    NoTopmost,
    /// Directly behind the given window.
    After(crate::handle::WindowHandle),
}

/// Style-mask bits stripped from a window when it enters full screen.
pub const FULL_SCREEN_STYLE_MASK: Style = Style::CAPTION
    .union(Style::MINIMIZE_BOX)
    .union(Style::MAXIMIZE_BOX)
    .union(Style::BORDER)
    .union(Style::THICK_FRAME);

/// Extended-style bits stripped from a window when it enters full screen.
pub const FULL_SCREEN_EX_STYLE_MASK: ExStyle = ExStyle::WINDOW_EDGE;
