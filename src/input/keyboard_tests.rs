/// Tests for the keyboard watcher

use super::*;
use std::sync::Arc;
use std::thread;

// ============================================================================
// Tests: State Tracking
// ============================================================================

#[test]
fn test_unknown_keys_read_as_up() {
    let keyboard = KeyboardWatcher::new();
    assert_eq!(keyboard.state(Key::A), KeyState::Up);
    assert!(keyboard.up(Key::Escape));
    assert!(!keyboard.down(Key::Space));
}

#[test]
fn test_transitions_are_remembered() {
    let keyboard = KeyboardWatcher::new();
    keyboard.set_state(Key::W, KeyState::Down);
    assert!(keyboard.down(Key::W));

    keyboard.set_state(Key::W, KeyState::Up);
    assert!(keyboard.up(Key::W));
    // Released keys stay in the snapshot once seen.
    assert_eq!(keyboard.states().len(), 1);
}

#[test]
fn test_raw_scancodes_track_separately() {
    let keyboard = KeyboardWatcher::new();
    keyboard.set_raw_state(0xE0_4B, KeyState::Down);

    assert_eq!(keyboard.raw_state(0xE0_4B), KeyState::Down);
    assert_eq!(keyboard.raw_state(0xE0_4D), KeyState::Up);
    assert!(keyboard.states().is_empty());
}

// ============================================================================
// Tests: Thread Safety
// ============================================================================

#[test]
fn test_concurrent_writers_and_readers() {
    let keyboard = Arc::new(KeyboardWatcher::new());
    let writer = {
        let keyboard = keyboard.clone();
        thread::spawn(move || {
            for _ in 0..100 {
                keyboard.set_state(Key::A, KeyState::Down);
                keyboard.set_state(Key::A, KeyState::Up);
            }
        })
    };
    for _ in 0..100 {
        let _ = keyboard.state(Key::A);
    }
    writer.join().unwrap();
    assert_eq!(keyboard.states().len(), 1);
}
