//! Platform messages and their results.
//!
//! Every input a window receives arrives as a [`Message`] through the
//! dispatcher. Handlers answer with a [`MessageResult`]; messages a handler
//! does not consume fall through to the platform's default handling, which
//! produces the result instead.

use crate::geometry::{Point, Rect, Size};
use crate::handle::{CreationToken, TimerId, WindowHandle};
use crate::style::SwpFlags;

/// A message delivered to a window procedure.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// First message a new window receives. Carries the token that binds the
    /// handle to its owning object.
    Create {
        /// The token passed to window creation.
        token: CreationToken,
    },
    /// The window is about to be shown or hidden.
    ShowWindow {
        /// `true` when showing.
        visible: bool,
    },
    /// The user is dragging a sizing border.
    Sizing,
    /// The window's size or size state changed.
    Size {
        /// Which kind of size change happened.
        code: SizeCode,
        /// New client width.
        width: i32,
        /// New client height.
        height: i32,
    },
    /// The user is dragging the window.
    Moving,
    /// The window moved.
    Move {
        /// New client-area origin in screen coordinates.
        origin: Point,
    },
    /// A position/size/z-order change is about to be applied. The handler
    /// may adjust the proposal and return it.
    WindowPosChanging(WindowPos),
    /// The user or system asked the window to close.
    Close,
    /// The window is being destroyed; children still exist.
    Destroy,
    /// Final message a window receives. The handle is invalid afterwards.
    NcDestroy,
    /// Activation changed.
    Activate {
        /// New activation state.
        state: ActivateState,
        /// Whether the window is minimized.
        minimized: bool,
    },
    /// A click is about to activate the window.
    MouseActivate,
    /// Keyboard focus arrived.
    SetFocus,
    /// Keyboard focus left.
    KillFocus,
    /// The platform asks for the tracking size limits.
    GetMinMaxInfo(MinMaxInfo),
    /// A menu or accelerator command.
    Command {
        /// Command identifier.
        id: u32,
    },
    /// A mnemonic with no matching menu item was typed.
    MenuChar,
    /// The input language changed.
    InputLanguageChange,
    /// Hit-test request for a point in screen coordinates.
    NcHitTest {
        /// The cursor position.
        point: Point,
    },
    /// The cursor moved over the window; the handler may set the shape.
    SetCursor {
        /// What part of the window the cursor is over.
        hit: HitTest,
    },
    /// A mouse button changed state in the client area.
    MouseButton {
        /// Which button.
        button: MouseButton,
        /// Press, release or double-click.
        action: ButtonAction,
        /// Client-relative position.
        point: Point,
        /// Modifier keys held.
        modifiers: Modifiers,
    },
    /// The cursor moved in the client area.
    MouseMove {
        /// Client-relative position.
        point: Point,
        /// Modifier keys held.
        modifiers: Modifiers,
    },
    /// The wheel rotated.
    MouseWheel {
        /// Horizontal delta in wheel units.
        delta_x: f32,
        /// Vertical delta in wheel units.
        delta_y: f32,
        /// Client-relative position.
        point: Point,
        /// Modifier keys held.
        modifiers: Modifiers,
    },
    /// The cursor left the client area.
    MouseLeave,
    /// A mouse button went down over the frame.
    NcMouseButtonDown {
        /// Which button.
        button: MouseButton,
        /// What part of the frame was hit.
        hit: HitTest,
    },
    /// Mouse capture moved to another window (or nowhere).
    CaptureChanged {
        /// The window that gained capture.
        new: Option<WindowHandle>,
    },
    /// A key changed state.
    Key(KeyInput),
    /// A character was typed.
    Char {
        /// The typed character.
        ch: char,
    },
    /// Input method activity.
    Ime(ImeEvent),
    /// The client area needs repainting.
    Paint,
    /// A context menu was requested.
    ContextMenu {
        /// Screen position, or `None` when triggered from the keyboard.
        point: Option<Point>,
    },
    /// Touch contacts changed.
    Touch {
        /// The contacts reported in this frame.
        points: Vec<TouchPoint>,
    },
    /// A window timer fired.
    Timer {
        /// The timer that fired.
        id: TimerId,
    },
    /// An accessibility client asked for the window's accessible object.
    GetObject {
        /// The requested object id.
        object_id: i64,
    },
    /// Run a queued main-thread work item. Only the application window
    /// handles this.
    RunWork {
        /// The queued item's id.
        id: u64,
    },
}

impl Message {
    /// A short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Create { .. } => "Create",
            Self::ShowWindow { .. } => "ShowWindow",
            Self::Sizing => "Sizing",
            Self::Size { .. } => "Size",
            Self::Moving => "Moving",
            Self::Move { .. } => "Move",
            Self::WindowPosChanging(_) => "WindowPosChanging",
            Self::Close => "Close",
            Self::Destroy => "Destroy",
            Self::NcDestroy => "NcDestroy",
            Self::Activate { .. } => "Activate",
            Self::MouseActivate => "MouseActivate",
            Self::SetFocus => "SetFocus",
            Self::KillFocus => "KillFocus",
            Self::GetMinMaxInfo(_) => "GetMinMaxInfo",
            Self::Command { .. } => "Command",
            Self::MenuChar => "MenuChar",
            Self::InputLanguageChange => "InputLanguageChange",
            Self::NcHitTest { .. } => "NcHitTest",
            Self::SetCursor { .. } => "SetCursor",
            Self::MouseButton { .. } => "MouseButton",
            Self::MouseMove { .. } => "MouseMove",
            Self::MouseWheel { .. } => "MouseWheel",
            Self::MouseLeave => "MouseLeave",
            Self::NcMouseButtonDown { .. } => "NcMouseButtonDown",
            Self::CaptureChanged { .. } => "CaptureChanged",
            Self::Key(_) => "Key",
            Self::Char { .. } => "Char",
            Self::Ime(_) => "Ime",
            Self::Paint => "Paint",
            Self::ContextMenu { .. } => "ContextMenu",
            Self::Touch { .. } => "Touch",
            Self::Timer { .. } => "Timer",
            Self::GetObject { .. } => "GetObject",
            Self::RunWork { .. } => "RunWork",
        }
    }
}

/// The answer a window procedure gives for a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageResult {
    /// Plain integer result.
    Handled(isize),
    /// Answer to [`Message::MouseActivate`].
    MouseActivate(MouseActivation),
    /// Answer to [`Message::NcHitTest`].
    HitTest(HitTest),
    /// Answer to [`Message::WindowPosChanging`]: the possibly adjusted proposal.
    WindowPos(WindowPos),
    /// Answer to [`Message::GetMinMaxInfo`]: the possibly adjusted limits.
    MinMaxInfo(MinMaxInfo),
}

impl MessageResult {
    /// Handled with result zero.
    pub const ZERO: MessageResult = MessageResult::Handled(0);

    /// The integer value, for results that carry one.
    pub fn value(&self) -> Option<isize> {
        match self {
            Self::Handled(v) => Some(*v),
            _ => None,
        }
    }
}

/// Kind of size change reported by [`Message::Size`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SizeCode {
    /// Resized, neither minimized nor maximized.
    Restored,
    /// Minimized.
    Minimized,
    /// Maximized.
    Maximized,
}

/// Activation state carried by [`Message::Activate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivateState {
    /// Deactivated.
    Inactive,
    /// Activated by something other than a click.
    Active,
    /// Activated by a mouse click.
    ClickActive,
}

/// What to do with a click that would activate a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseActivation {
    /// Activate and deliver the click.
    Activate,
    /// Activate and discard the click.
    ActivateAndEat,
    /// Do not activate; deliver the click.
    NoActivate,
    /// Do not activate and discard the click.
    NoActivateAndEat,
}

/// Result of a non-client hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HitTest {
    /// Outside the window.
    Nowhere,
    /// Client area.
    Client,
    /// Title bar.
    Caption,
    /// Left sizing border.
    Left,
    /// Right sizing border.
    Right,
    /// Top sizing border.
    Top,
    /// Top-left sizing corner.
    TopLeft,
    /// Top-right sizing corner.
    TopRight,
    /// Bottom sizing border.
    Bottom,
    /// Bottom-left sizing corner.
    BottomLeft,
    /// Bottom-right sizing corner.
    BottomRight,
    /// Non-sizing border.
    Border,
    /// Covered by another window of the same thread; pass through.
    Transparent,
}

/// A mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Secondary button.
    Right,
    /// Wheel button.
    Middle,
    /// Back side button.
    Back,
    /// Forward side button.
    Forward,
}

/// What happened to a mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonAction {
    /// Pressed.
    Down,
    /// Released.
    Up,
    /// Second press of a double click.
    DoubleClick,
}

bitflags::bitflags! {
    /// Keyboard modifiers held during an input event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        /// Shift.
        const SHIFT = 0b0001;
        /// Control.
        const CONTROL = 0b0010;
        /// Alt.
        const ALT = 0b0100;
        /// Windows / Command.
        const META = 0b1000;
    }
}

/// Virtual key codes the switchboard cares about. Everything else is opaque.
pub mod vk {
    /// The Alt key.
    pub const MENU: u32 = 0x12;
    /// The F10 key.
    pub const F10: u32 = 0x79;
}

/// A key press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyInput {
    /// Platform virtual key code.
    pub virtual_key: u32,
    /// `true` for press, `false` for release.
    pub pressed: bool,
    /// Whether the platform classified this as a system key (Alt held).
    pub system: bool,
    /// Modifier keys held.
    pub modifiers: Modifiers,
}

/// Input method activity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImeEvent {
    /// Composition started.
    Enabled,
    /// Composition text changed; optional cursor byte range.
    Preedit(String, Option<(usize, usize)>),
    /// Composition committed.
    Commit(String),
    /// Composition ended.
    Disabled,
}

/// Phase of a touch contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    /// Contact started.
    Down,
    /// Contact moved.
    Move,
    /// Contact lifted.
    Up,
    /// Contact cancelled by the system.
    Cancelled,
}

/// A single touch contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TouchPoint {
    /// Contact identifier, stable while the contact lasts.
    pub id: u64,
    /// What happened to it.
    pub phase: TouchPhase,
    /// Screen position.
    pub point: Point,
}

/// A proposed window position change.
///
/// `rect` components are only meaningful when the matching `NO_MOVE` /
/// `NO_SIZE` flag is clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowPos {
    /// The window being positioned.
    pub hwnd: WindowHandle,
    /// Proposed frame rectangle.
    pub rect: Rect,
    /// Positioning flags.
    pub flags: SwpFlags,
}

/// Tracking size limits for interactive resizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinMaxInfo {
    /// Smallest size the user can drag to.
    pub min_track: Size,
    /// Largest size the user can drag to.
    pub max_track: Size,
}
