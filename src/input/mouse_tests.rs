/// Tests for the mouse watcher

use super::*;

#[test]
fn test_unknown_buttons_read_as_up() {
    let mouse = MouseWatcher::new();
    assert_eq!(mouse.state(Button::Left), ButtonState::Up);
    assert!(mouse.up(Button::Other(7)));
}

#[test]
fn test_transitions_are_remembered() {
    let mouse = MouseWatcher::new();
    mouse.set_state(Button::Left, ButtonState::Down);
    mouse.set_state(Button::Other(7), ButtonState::Down);

    assert!(mouse.down(Button::Left));
    assert!(mouse.down(Button::Other(7)));
    assert!(mouse.up(Button::Right));

    mouse.set_state(Button::Left, ButtonState::Up);
    assert!(mouse.up(Button::Left));
    assert_eq!(mouse.states().len(), 2);
}
