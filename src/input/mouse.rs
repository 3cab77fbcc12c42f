//! Mouse button state watcher

use std::sync::Mutex;

use rustc_hash::FxHashMap;

/// Whether a button is held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Up,
    Down,
}

/// A mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
    Middle,
    Back,
    Forward,

    /// Any button the engine has no name for, by OS index
    Other(u16),
}

/// Thread-safe mouse button state map
///
/// Same contract as `KeyboardWatcher`: the event loop writes
/// transitions, unknown buttons read as `Up`.
pub struct MouseWatcher {
    states: Mutex<FxHashMap<Button, ButtonState>>,
}

impl MouseWatcher {
    pub fn new() -> Self {
        Self {
            states: Mutex::new(FxHashMap::default()),
        }
    }

    /// Record a button transition
    pub fn set_state(&self, button: Button, state: ButtonState) {
        self.states.lock().unwrap().insert(button, state);
    }

    /// Current state of `button`
    pub fn state(&self, button: Button) -> ButtonState {
        self.states
            .lock()
            .unwrap()
            .get(&button)
            .copied()
            .unwrap_or(ButtonState::Up)
    }

    pub fn down(&self, button: Button) -> bool {
        self.state(button) == ButtonState::Down
    }

    pub fn up(&self, button: Button) -> bool {
        self.state(button) == ButtonState::Up
    }

    /// Snapshot of every button that has reported a transition
    pub fn states(&self) -> FxHashMap<Button, ButtonState> {
        self.states.lock().unwrap().clone()
    }
}

impl Default for MouseWatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "mouse_tests.rs"]
mod tests;
