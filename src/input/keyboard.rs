//! Keyboard state watcher
//!
//! The window's event loop feeds key transitions in; any thread can ask
//! for the current state. Keys the watcher never heard about are `Up`.
//!
//! Keys the engine has no name for still reach the watcher through
//! their OS scancode, so applications can bind exotic keys.

use std::sync::Mutex;

use rustc_hash::FxHashMap;

/// Whether a key is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Up,
    Down,
}

impl KeyState {
    pub fn is_down(self) -> bool {
        self == KeyState::Down
    }
}

/// A named keyboard key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    Zero, One, Two, Three, Four, Five, Six, Seven, Eight, Nine,

    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    Left, Right, Up, Down,

    Space, Enter, Escape, Tab, Backspace, Delete, Insert,
    Home, End, PageUp, PageDown,

    LeftShift, RightShift,
    LeftCtrl, RightCtrl,
    LeftAlt, RightAlt,
    LeftSuper, RightSuper,

    CapsLock, NumLock, PrintScreen, Pause, Menu,

    Minus, Equals, LeftBracket, RightBracket, Backslash,
    Semicolon, Apostrophe, Comma, Period, Slash, Grave,
}

/// Thread-safe keyboard state map
///
/// # Example
///
/// ```
/// use quasar_gfx::input::{Key, KeyState, KeyboardWatcher};
///
/// let keyboard = KeyboardWatcher::new();
/// keyboard.set_state(Key::W, KeyState::Down);
/// assert!(keyboard.down(Key::W));
/// assert!(keyboard.up(Key::Space));
/// ```
pub struct KeyboardWatcher {
    states: Mutex<FxHashMap<Key, KeyState>>,
    raw_states: Mutex<FxHashMap<u64, KeyState>>,
}

impl KeyboardWatcher {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(FxHashMap::default()),
            raw_states: Mutex::new(FxHashMap::default()),
        }
    }

    /// Record a key transition
    pub fn set_state(&self, key: Key, state: KeyState) {
        self.states.lock().unwrap().insert(key, state);
    }

    /// Current state of `key`
    pub fn state(&self, key: Key) -> KeyState {
        self.states
            .lock()
            .unwrap()
            .get(&key)
            .copied()
            .unwrap_or(KeyState::Up)
    }

    pub fn down(&self, key: Key) -> bool {
        self.state(key) == KeyState::Down
    }

    pub fn up(&self, key: Key) -> bool {
        self.state(key) == KeyState::Up
    }

    /// Record a transition for a key known only by OS scancode
    pub fn set_raw_state(&self, scancode: u64, state: KeyState) {
        self.raw_states.lock().unwrap().insert(scancode, state);
    }

    /// Current state of an OS scancode
    pub fn raw_state(&self, scancode: u64) -> KeyState {
        self.raw_states
            .lock()
            .unwrap()
            .get(&scancode)
            .copied()
            .unwrap_or(KeyState::Up)
    }

    /// Snapshot of every key that has reported a transition
    pub fn states(&self) -> FxHashMap<Key, KeyState> {
        self.states.lock().unwrap().clone()
    }
}

impl Default for KeyboardWatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "keyboard_tests.rs"]
mod tests;
