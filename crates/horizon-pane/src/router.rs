//! Routing winit window events into the switchboard.
//!
//! Surfaces hosted by winit do not produce platform messages themselves.
//! An [`EventRouter`] maps each winit window to the [`WindowHandle`] whose
//! switchboard should see its events, and translates every
//! [`WindowEvent`] into the equivalent [`Message`]s.
//!
//! winit reports neither minimize nor maximize as such. A resize to zero is
//! taken as a minimize, and any other size as a restore, so winit-hosted
//! windows never reach the maximized state through the router.
//!
//! # Example
//!
//! ```ignore
//! use horizon_pane::EventRouter;
//!
//! let router = EventRouter::new();
//! router.register(winit_window.id(), window.handle().unwrap());
//!
//! // In `ApplicationHandler::window_event`:
//! router.route(&ctx, window_id, &event);
//! ```

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use horizon_pane_core::logging::targets;
use horizon_pane_core::message::vk;
use horizon_pane_core::{
    ActivateState, ButtonAction, ImeEvent, KeyInput, Message, Modifiers, MouseButton, Point,
    SizeCode, TouchPhase, TouchPoint, WindowHandle,
};
use winit::event::{
    ElementState, Ime, MouseButton as WinitMouseButton, MouseScrollDelta, TouchPhase as WinitTouchPhase,
    WindowEvent,
};
use winit::keyboard::{Key, ModifiersState, NamedKey};
use winit::window::WindowId;

use crate::context::WindowContext;

/// Pixels per wheel line when a device reports pixel deltas.
const PIXELS_PER_LINE: f64 = 20.0;

/// Converts a winit mouse button. Extra buttons have no equivalent.
pub fn from_winit_mouse_button(button: WinitMouseButton) -> Option<MouseButton> {
    match button {
        WinitMouseButton::Left => Some(MouseButton::Left),
        WinitMouseButton::Right => Some(MouseButton::Right),
        WinitMouseButton::Middle => Some(MouseButton::Middle),
        WinitMouseButton::Back => Some(MouseButton::Back),
        WinitMouseButton::Forward => Some(MouseButton::Forward),
        WinitMouseButton::Other(_) => None,
    }
}

/// Converts winit modifier state.
pub fn from_winit_modifiers(state: ModifiersState) -> Modifiers {
    let mut modifiers = Modifiers::empty();
    modifiers.set(Modifiers::SHIFT, state.shift_key());
    modifiers.set(Modifiers::CONTROL, state.control_key());
    modifiers.set(Modifiers::ALT, state.alt_key());
    modifiers.set(Modifiers::META, state.super_key());
    modifiers
}

/// Virtual key code for a logical key. Keys the switchboard does not
/// distinguish map to their upper-case character, or zero.
pub fn virtual_key(key: &Key) -> u32 {
    match key {
        Key::Named(NamedKey::Alt) => vk::MENU,
        Key::Named(NamedKey::F10) => vk::F10,
        Key::Character(text) => text
            .chars()
            .next()
            .map_or(0, |c| c.to_ascii_uppercase() as u32),
        _ => 0,
    }
}

fn from_winit_touch_phase(phase: WinitTouchPhase) -> TouchPhase {
    match phase {
        WinitTouchPhase::Started => TouchPhase::Down,
        WinitTouchPhase::Moved => TouchPhase::Move,
        WinitTouchPhase::Ended => TouchPhase::Up,
        WinitTouchPhase::Cancelled => TouchPhase::Cancelled,
    }
}

fn from_winit_ime(ime: &Ime) -> ImeEvent {
    match ime {
        Ime::Enabled => ImeEvent::Enabled,
        Ime::Preedit(text, cursor) => ImeEvent::Preedit(text.clone(), *cursor),
        Ime::Commit(text) => ImeEvent::Commit(text.clone()),
        Ime::Disabled => ImeEvent::Disabled,
    }
}

/// Maps winit windows to switchboard windows and translates their events.
#[derive(Debug, Default)]
pub struct EventRouter {
    windows: RefCell<HashMap<WindowId, WindowHandle>>,
    modifiers: Cell<Modifiers>,
    cursor: Cell<Point>,
}

impl EventRouter {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route events of `id` to `hwnd`.
    pub fn register(&self, id: WindowId, hwnd: WindowHandle) {
        self.windows.borrow_mut().insert(id, hwnd);
    }

    /// Stop routing events of `id`.
    pub fn unregister(&self, id: WindowId) -> Option<WindowHandle> {
        self.windows.borrow_mut().remove(&id)
    }

    /// The window receiving events of `id`.
    pub fn handle(&self, id: WindowId) -> Option<WindowHandle> {
        self.windows.borrow().get(&id).copied()
    }

    /// Modifier keys currently held.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers.get()
    }

    /// Translate one event. Events without an equivalent produce nothing;
    /// some produce more than one message.
    pub fn translate(&self, event: &WindowEvent) -> Vec<Message> {
        let modifiers = self.modifiers.get();
        match event {
            WindowEvent::Resized(size) => vec![Message::Size {
                code: if size.width == 0 && size.height == 0 {
                    SizeCode::Minimized
                } else {
                    SizeCode::Restored
                },
                width: size.width as i32,
                height: size.height as i32,
            }],
            WindowEvent::Moved(position) => vec![Message::Move {
                origin: Point::new(position.x, position.y),
            }],
            WindowEvent::Focused(true) => vec![
                Message::Activate {
                    state: ActivateState::Active,
                    minimized: false,
                },
                Message::SetFocus,
            ],
            WindowEvent::Focused(false) => vec![
                Message::KillFocus,
                Message::Activate {
                    state: ActivateState::Inactive,
                    minimized: false,
                },
            ],
            WindowEvent::CloseRequested => vec![Message::Close],
            // Handled by `route`, which runs the full destroy sequence.
            WindowEvent::Destroyed => Vec::new(),
            WindowEvent::ModifiersChanged(state) => {
                self.modifiers.set(from_winit_modifiers(state.state()));
                Vec::new()
            }
            WindowEvent::CursorMoved { position, .. } => {
                let point = Point::new(position.x as i32, position.y as i32);
                self.cursor.set(point);
                vec![Message::MouseMove { point, modifiers }]
            }
            WindowEvent::CursorLeft { .. } => vec![Message::MouseLeave],
            WindowEvent::MouseInput { state, button, .. } => {
                let Some(button) = from_winit_mouse_button(*button) else {
                    return Vec::new();
                };
                let action = match state {
                    ElementState::Pressed => ButtonAction::Down,
                    ElementState::Released => ButtonAction::Up,
                };
                vec![Message::MouseButton {
                    button,
                    action,
                    point: self.cursor.get(),
                    modifiers,
                }]
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (delta_x, delta_y) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (*x, *y),
                    MouseScrollDelta::PixelDelta(pos) => {
                        ((pos.x / PIXELS_PER_LINE) as f32, (pos.y / PIXELS_PER_LINE) as f32)
                    }
                };
                vec![Message::MouseWheel {
                    delta_x,
                    delta_y,
                    point: self.cursor.get(),
                    modifiers,
                }]
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                let mut messages = vec![Message::Key(KeyInput {
                    virtual_key: virtual_key(&event.logical_key),
                    pressed,
                    system: modifiers.contains(Modifiers::ALT),
                    modifiers,
                })];
                if pressed {
                    if let Some(text) = &event.text {
                        messages.extend(text.chars().map(|ch| Message::Char { ch }));
                    }
                }
                messages
            }
            WindowEvent::Ime(ime) => vec![Message::Ime(from_winit_ime(ime))],
            WindowEvent::Touch(touch) => vec![Message::Touch {
                points: vec![TouchPoint {
                    id: touch.id,
                    phase: from_winit_touch_phase(touch.phase),
                    point: Point::new(touch.location.x as i32, touch.location.y as i32),
                }],
            }],
            WindowEvent::RedrawRequested => vec![Message::Paint],
            _ => Vec::new(),
        }
    }

    /// Translate `event` and dispatch the result to the window registered
    /// for `id`. Returns `false` when `id` is unknown.
    ///
    /// `Destroyed` destroys the bound window, so it sees `Destroy` and
    /// `NcDestroy` and is released, and drops the mapping.
    pub fn route(&self, ctx: &WindowContext, id: WindowId, event: &WindowEvent) -> bool {
        let Some(hwnd) = self.handle(id) else {
            return false;
        };
        if matches!(event, WindowEvent::Destroyed) {
            self.unregister(id);
            tracing::debug!(target: targets::DISPATCH, hwnd = hwnd.as_raw(), "winit surface destroyed");
            ctx.destroy_window(hwnd);
            return true;
        }
        for msg in self.translate(event) {
            tracing::trace!(target: targets::DISPATCH, hwnd = hwnd.as_raw(), msg = msg.name(), "routed winit event");
            ctx.dispatch(hwnd, msg);
        }
        true
    }
}
