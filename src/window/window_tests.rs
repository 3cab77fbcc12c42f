/// Tests for the window controller
///
/// The test thread doubles as the window-system thread: it pumps
/// `run_pending` while the window's own thread drains the device
/// queue, mirroring the embedder's event loop.

use super::*;
use crate::window::mock_window::MockWindowFactory;
use crate::canvas::Canvas;
use crate::types::Color;
use std::time::Instant;

fn pump_until(system: &WindowSystem, what: &str, done: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        system.run_pending();
        if Instant::now() > deadline {
            panic!("timed out waiting for {}", what);
        }
        thread::sleep(Duration::from_millis(1));
    }
}

fn open_window(
    props: Props,
) -> (WindowSystem, Arc<MockWindowFactory>, Arc<Window>, Swapper) {
    let system = WindowSystem::new();
    let factory = Arc::new(MockWindowFactory::new());
    let (window, swapper) = system.open(props, factory.clone()).unwrap();
    (system, factory, window, swapper)
}

// ============================================================================
// Tests: Opening
// ============================================================================

#[test]
fn test_open_applies_the_full_property_set() {
    let (system, factory, _window, _swapper) = open_window(Props::default());
    let backend = factory.last_backend().unwrap();

    let calls = backend.calls();
    assert!(calls.contains(&"set_size(800, 450)".to_string()));
    assert!(calls.contains(&"set_pos(560, 315)".to_string())); // centered on 1920x1080
    assert!(calls.contains(&"set_visible(true)".to_string()));
    assert!(calls.contains(&"set_swap_interval(1)".to_string()));
    assert!(calls.contains(&"set_cursor_grabbed(false)".to_string()));
    assert!(calls.iter().any(|c| c.starts_with("set_title(")));
    assert_eq!(system.window_count(), 1);
}

#[test]
fn test_adaptive_vsync_uses_negative_interval() {
    let system = WindowSystem::new();
    let factory = Arc::new(MockWindowFactory::new().with_swap_control_tear());
    let (_window, _swapper) = system.open(Props::default(), factory.clone()).unwrap();

    let backend = factory.last_backend().unwrap();
    assert!(backend
        .calls()
        .contains(&"set_swap_interval(-1)".to_string()));
}

#[test]
fn test_title_substitutes_fps_once() {
    assert_eq!(substitute_fps("Quasar - {FPS}", 0.0), "Quasar - 0FPS");
    assert_eq!(substitute_fps("{FPS} {FPS}", 59.3), "60FPS {FPS}");
    assert_eq!(substitute_fps("plain", 60.0), "plain");
}

// ============================================================================
// Tests: Property Reconciliation
// ============================================================================

#[test]
fn test_request_applies_only_deltas() {
    let (system, factory, window, _swapper) = open_window(Props::default());
    let backend = factory.last_backend().unwrap();
    backend.clear_calls();

    let mut props = window.props();
    props.set_vsync(false);
    window.request(props);
    system.run_pending();

    assert!(backend
        .calls()
        .contains(&"set_swap_interval(0)".to_string()));
    assert_eq!(backend.call_count("set_size"), 0);
    assert_eq!(backend.call_count("set_pos"), 0);
    assert_eq!(backend.call_count("set_visible"), 0);
}

#[test]
fn test_cursor_grab_toggle_resets_delta_baseline() {
    let (system, _factory, window, _swapper) = open_window(Props::default());

    let mut props = window.props();
    props.set_cursor_grabbed(true);
    window.request(props);
    system.run_pending();

    // First motion after a grab is swallowed.
    assert_eq!(window.handle_cursor_moved(100.0, 100.0), None);
    assert_eq!(
        window.handle_cursor_moved(105.0, 95.0),
        Some(CursorMotion::Delta { x: 5.0, y: -5.0 })
    );

    // Toggling the grab again re-arms the suppression.
    let mut props = window.props();
    props.set_cursor_grabbed(false);
    window.request(props);
    system.run_pending();
    let mut props = window.props();
    props.set_cursor_grabbed(true);
    window.request(props);
    system.run_pending();

    assert_eq!(window.handle_cursor_moved(50.0, 50.0), None);
}

#[test]
fn test_ungrabbed_cursor_reports_absolute_position() {
    let (_system, _factory, window, _swapper) = open_window(Props::default());

    assert_eq!(
        window.handle_cursor_moved(12.0, 34.0),
        Some(CursorMotion::Absolute { x: 12.0, y: 34.0 })
    );
    assert_eq!(window.props().cursor_pos(), (12.0, 34.0));
}

// ============================================================================
// Tests: Event Ingestion
// ============================================================================

#[test]
fn test_framebuffer_resize_updates_device_bounds() {
    let (_system, _factory, window, _swapper) = open_window(Props::default());

    window.handle_framebuffer_resized(1024, 768);
    assert_eq!(window.device().bounds(), Rect::new(0, 0, 1024, 768));
    assert_eq!(window.props().framebuffer_size(), (1024, 768));
}

#[test]
fn test_key_and_button_events_reach_the_watchers() {
    let (_system, _factory, window, _swapper) = open_window(Props::default());

    window.handle_key(Key::W, 17, KeyState::Down);
    window.handle_mouse_button(Button::Left, ButtonState::Down);

    assert!(window.keyboard().down(Key::W));
    assert_eq!(window.keyboard().raw_state(17), KeyState::Down);
    assert!(window.mouse().down(Button::Left));
}

#[test]
fn test_close_request_honors_should_close() {
    let mut props = Props::default();
    props.set_should_close(false);
    let (system, _factory, window, _swapper) = open_window(props);

    window.handle_close_request();
    thread::sleep(Duration::from_millis(20));
    assert_eq!(system.window_count(), 1);
}

#[test]
fn test_resized_event_tracks_windowed_size() {
    let (_system, _factory, window, _swapper) = open_window(Props::default());
    window.handle_resized(1000, 700);
    assert_eq!(window.props().size(), (1000, 700));
}

// ============================================================================
// Tests: Rendering and Presentation
// ============================================================================

#[test]
fn test_presented_frames_swap_buffers() {
    let (system, factory, _window, swapper) = open_window(Props::default());
    let backend = factory.last_backend().unwrap();

    swapper.clear(Rect::new(0, 0, 100, 100), Color::new(1.0, 0.0, 0.0, 1.0));
    assert!(swapper.render());

    pump_until(&system, "buffer swap", || backend.call_count("swap_buffers") == 1);
    assert_eq!(swapper.device().clock().frame_count(), 1);
}

// ============================================================================
// Tests: Fullscreen Rebuild
// ============================================================================

#[test]
fn test_fullscreen_toggle_rebuilds_and_restores() {
    let (system, factory, window, swapper) = open_window(Props::default());
    let first_backend = factory.last_backend().unwrap();
    let first_device = window.device();
    first_backend.clear_calls();

    let mut props = window.props();
    props.set_fullscreen(true);
    window.request(props);
    system.run_pending();

    // The toggle pass applies no property, only the rebuild signal.
    assert_eq!(first_backend.call_count("set_size"), 0);
    assert_eq!(first_backend.call_count("set_swap_interval"), 0);

    // An application observing the canvas mid-rebuild synchronizes
    // with the swap and ends up on the replacement device.
    let app = {
        let first = first_device.clone();
        thread::spawn(move || loop {
            let device = swapper.device();
            if !Arc::ptr_eq(&device.inner, &first.inner) {
                return device;
            }
            thread::sleep(Duration::from_millis(1));
        })
    };

    pump_until(&system, "rebuild", || factory.build_count() == 2);
    let new_device = app.join().unwrap();

    assert!(!Arc::ptr_eq(&new_device.inner, &first_device.inner));
    assert!(first_backend.calls().contains(&"detach_context".to_string()));
    pump_until(&system, "old window destruction", || {
        first_backend.call_count("destroy") == 1
    });

    // Fullscreen sizes to the monitor; the force pass applies it.
    assert!(window.props().fullscreen());
    assert_eq!(window.props().size(), (1920, 1080));
    let second_backend = factory.last_backend().unwrap();
    assert!(second_backend
        .calls()
        .contains(&"set_size(1920, 1080)".to_string()));

    // Leaving fullscreen restores the windowed size.
    let mut props = window.props();
    props.set_fullscreen(false);
    window.request(props);
    system.run_pending();
    // The swapper is gone, so the drain loop's ack arm unblocks on the
    // disconnected channel and the rebuild proceeds on its own.
    pump_until(&system, "second rebuild", || factory.build_count() == 3);

    pump_until(&system, "windowed size restore", || {
        window.props().size() == (800, 450)
    });
    assert!(!window.props().fullscreen());
}

// ============================================================================
// Tests: Close
// ============================================================================

#[test]
fn test_close_is_idempotent_and_terminates_at_zero() {
    let (system, factory, window, _swapper) = open_window(Props::default());
    let backend = factory.last_backend().unwrap();

    window.close();
    window.close(); // second close is a no-op

    // run() processes the teardown ops and returns on terminate.
    system.run();
    assert_eq!(system.window_count(), 0);
    assert_eq!(backend.call_count("destroy"), 1);
    assert_eq!(backend.call_count("detach_context"), 1);
}

#[test]
fn test_clipboard_round_trip() {
    let (system, _factory, window, _swapper) = open_window(Props::default());

    window.set_clipboard("copied text");
    system.run_pending();

    let reader = {
        let window = window.clone();
        thread::spawn(move || window.clipboard())
    };
    pump_until(&system, "clipboard read", || reader.is_finished());
    assert_eq!(reader.join().unwrap(), "copied text");
}
