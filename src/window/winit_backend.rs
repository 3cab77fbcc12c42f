//! winit adapter for the window backend
//!
//! Wraps a `winit` window behind `WindowBackend` and converts winit
//! input types to the engine's. winit owns neither the GL context nor
//! the swap chain, so the context-affine calls (`swap_buffers`,
//! `set_swap_interval`, context attach/detach) are no-ops here; the
//! embedder's GL context layer performs them around `WindowSystem`.

use std::sync::Arc;

use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;
use winit::window::CursorGrabMode;

use crate::input::{Button, ButtonState, Key, KeyState};
use super::backend::WindowBackend;

const LOG_SOURCE: &str = "quasar::WinitBackend";

/// `WindowBackend` over a winit window
pub struct WinitWindowBackend {
    window: Arc<winit::window::Window>,
}

impl WinitWindowBackend {
    pub fn new(window: Arc<winit::window::Window>) -> Self {
        Self { window }
    }

    /// The wrapped winit window
    pub fn window(&self) -> &Arc<winit::window::Window> {
        &self.window
    }
}

impl WindowBackend for WinitWindowBackend {
    fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    fn set_size(&self, width: u32, height: u32) {
        let _ = self.window.request_inner_size(PhysicalSize::new(width, height));
    }

    fn set_pos(&self, x: i32, y: i32) {
        self.window.set_outer_position(PhysicalPosition::new(x, y));
    }

    fn set_cursor_pos(&self, x: f64, y: f64) {
        if let Err(err) = self.window.set_cursor_position(PhysicalPosition::new(x, y)) {
            crate::engine_warn!(LOG_SOURCE, "set_cursor_position failed: {}", err);
        }
    }

    fn set_visible(&self, visible: bool) {
        self.window.set_visible(visible);
    }

    fn set_minimized(&self, minimized: bool) {
        self.window.set_minimized(minimized);
    }

    fn set_swap_interval(&self, _interval: i32) {
        // Swap interval belongs to the GL context, which winit does not
        // manage.
    }

    fn set_cursor_grabbed(&self, grabbed: bool) {
        if grabbed {
            // Locked is not available on every platform; Confined is
            // the documented fallback.
            if self.window.set_cursor_grab(CursorGrabMode::Locked).is_err() {
                if let Err(err) = self.window.set_cursor_grab(CursorGrabMode::Confined) {
                    crate::engine_warn!(LOG_SOURCE, "cursor grab failed: {}", err);
                }
            }
        } else if let Err(err) = self.window.set_cursor_grab(CursorGrabMode::None) {
            crate::engine_warn!(LOG_SOURCE, "cursor release failed: {}", err);
        }
        self.window.set_cursor_visible(!grabbed);
    }

    fn swap_buffers(&self) {
        self.window.pre_present_notify();
    }

    fn make_context_current(&self) {}

    fn detach_context(&self) {}

    fn destroy(&self) {
        // winit windows close when their last handle drops; hiding now
        // makes the teardown immediate from the user's point of view.
        self.window.set_visible(false);
    }

    fn extension_supported(&self, _name: &str) -> bool {
        false
    }

    fn set_clipboard(&self, _text: &str) {
        crate::engine_warn!(LOG_SOURCE, "clipboard is not supported by this backend");
    }

    fn clipboard(&self) -> String {
        crate::engine_warn!(LOG_SOURCE, "clipboard is not supported by this backend");
        String::new()
    }

    fn screen_size(&self) -> (u32, u32) {
        match self.window.current_monitor() {
            Some(monitor) => {
                let size = monitor.size();
                (size.width, size.height)
            }
            None => (0, 0),
        }
    }
}

// ============================================================================
// Input conversion
// ============================================================================

/// Convert a winit key code to an engine key
///
/// Returns `None` for keys the engine has no name for; their state is
/// still trackable through the raw scancode path.
pub fn convert_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyA => Key::A,
        KeyCode::KeyB => Key::B,
        KeyCode::KeyC => Key::C,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyE => Key::E,
        KeyCode::KeyF => Key::F,
        KeyCode::KeyG => Key::G,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyI => Key::I,
        KeyCode::KeyJ => Key::J,
        KeyCode::KeyK => Key::K,
        KeyCode::KeyL => Key::L,
        KeyCode::KeyM => Key::M,
        KeyCode::KeyN => Key::N,
        KeyCode::KeyO => Key::O,
        KeyCode::KeyP => Key::P,
        KeyCode::KeyQ => Key::Q,
        KeyCode::KeyR => Key::R,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyT => Key::T,
        KeyCode::KeyU => Key::U,
        KeyCode::KeyV => Key::V,
        KeyCode::KeyW => Key::W,
        KeyCode::KeyX => Key::X,
        KeyCode::KeyY => Key::Y,
        KeyCode::KeyZ => Key::Z,
        KeyCode::Digit0 => Key::Zero,
        KeyCode::Digit1 => Key::One,
        KeyCode::Digit2 => Key::Two,
        KeyCode::Digit3 => Key::Three,
        KeyCode::Digit4 => Key::Four,
        KeyCode::Digit5 => Key::Five,
        KeyCode::Digit6 => Key::Six,
        KeyCode::Digit7 => Key::Seven,
        KeyCode::Digit8 => Key::Eight,
        KeyCode::Digit9 => Key::Nine,
        KeyCode::F1 => Key::F1,
        KeyCode::F2 => Key::F2,
        KeyCode::F3 => Key::F3,
        KeyCode::F4 => Key::F4,
        KeyCode::F5 => Key::F5,
        KeyCode::F6 => Key::F6,
        KeyCode::F7 => Key::F7,
        KeyCode::F8 => Key::F8,
        KeyCode::F9 => Key::F9,
        KeyCode::F10 => Key::F10,
        KeyCode::F11 => Key::F11,
        KeyCode::F12 => Key::F12,
        KeyCode::ArrowLeft => Key::Left,
        KeyCode::ArrowRight => Key::Right,
        KeyCode::ArrowUp => Key::Up,
        KeyCode::ArrowDown => Key::Down,
        KeyCode::Space => Key::Space,
        KeyCode::Enter => Key::Enter,
        KeyCode::Escape => Key::Escape,
        KeyCode::Tab => Key::Tab,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Insert => Key::Insert,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::ShiftRight => Key::RightShift,
        KeyCode::ControlLeft => Key::LeftCtrl,
        KeyCode::ControlRight => Key::RightCtrl,
        KeyCode::AltLeft => Key::LeftAlt,
        KeyCode::AltRight => Key::RightAlt,
        KeyCode::SuperLeft => Key::LeftSuper,
        KeyCode::SuperRight => Key::RightSuper,
        KeyCode::CapsLock => Key::CapsLock,
        KeyCode::NumLock => Key::NumLock,
        KeyCode::PrintScreen => Key::PrintScreen,
        KeyCode::Pause => Key::Pause,
        KeyCode::ContextMenu => Key::Menu,
        KeyCode::Minus => Key::Minus,
        KeyCode::Equal => Key::Equals,
        KeyCode::BracketLeft => Key::LeftBracket,
        KeyCode::BracketRight => Key::RightBracket,
        KeyCode::Backslash => Key::Backslash,
        KeyCode::Semicolon => Key::Semicolon,
        KeyCode::Quote => Key::Apostrophe,
        KeyCode::Comma => Key::Comma,
        KeyCode::Period => Key::Period,
        KeyCode::Slash => Key::Slash,
        KeyCode::Backquote => Key::Grave,
        _ => return None,
    })
}

pub fn convert_key_state(state: ElementState) -> KeyState {
    match state {
        ElementState::Pressed => KeyState::Down,
        ElementState::Released => KeyState::Up,
    }
}

pub fn convert_mouse_button(button: MouseButton) -> Button {
    match button {
        MouseButton::Left => Button::Left,
        MouseButton::Right => Button::Right,
        MouseButton::Middle => Button::Middle,
        MouseButton::Back => Button::Back,
        MouseButton::Forward => Button::Forward,
        MouseButton::Other(id) => Button::Other(id),
    }
}

pub fn convert_button_state(state: ElementState) -> ButtonState {
    match state {
        ElementState::Pressed => ButtonState::Down,
        ElementState::Released => ButtonState::Up,
    }
}
