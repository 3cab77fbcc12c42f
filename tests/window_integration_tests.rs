//! End-to-end window tests over the mock window backend
//!
//! The test thread plays the window-system thread: it pumps the main
//! op channel while the window's own thread drains the device queue.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use quasar_gfx::canvas::Canvas;
use quasar_gfx::types::{Color, Rect};
use quasar_gfx::window::{MockWindowFactory, Props, WindowSystem};

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

#[test]
fn window_presents_frames_until_closed() {
    let system = WindowSystem::new();
    let factory = Arc::new(MockWindowFactory::new());
    let (window, canvas) = system.open(Props::default(), factory.clone()).unwrap();
    let backend = factory.last_backend().unwrap();

    for _ in 0..3 {
        canvas.clear(canvas.bounds(), Color::BLACK);
        assert!(canvas.render());
    }
    pump_until(&system, "three buffer swaps", || {
        backend.call_count("swap_buffers") == 3
    });
    assert_eq!(canvas.device().clock().frame_count(), 3);

    window.close();
    system.run(); // returns once the terminate op arrives

    assert_eq!(system.window_count(), 0);
    assert_eq!(backend.call_count("destroy"), 1);
}

#[test]
fn fullscreen_transition_preserves_queued_work() {
    let system = WindowSystem::new();
    let factory = Arc::new(MockWindowFactory::new());
    let (window, canvas) = system.open(Props::default(), factory.clone()).unwrap();
    let old_backend = factory.last_backend().unwrap();
    let old_device = window.device();

    // Work queued on the old device before the toggle.
    canvas.clear(Rect::new(0, 0, 50, 50), Color::WHITE);

    let mut props = window.props();
    props.set_fullscreen(true);
    window.request(props);
    system.run_pending();

    // A concurrent renderer keeps presenting across the rebuild. The
    // render that acknowledges the yield lands on the new device.
    let done = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let renderer = {
        let done = done.clone();
        thread::spawn(move || {
            while !done.load(std::sync::atomic::Ordering::SeqCst) {
                assert!(canvas.render());
                thread::sleep(Duration::from_millis(1));
            }
            canvas
        })
    };
    pump_until(&system, "rebuild", || factory.build_count() == 2);
    done.store(true, std::sync::atomic::Ordering::SeqCst);
    let canvas = renderer.join().unwrap();

    // The old device drained its queue before teardown.
    assert_eq!(old_device.queued_ops(), 0);
    pump_until(&system, "old window destruction", || {
        old_backend.call_count("destroy") == 1
    });

    assert!(window.props().fullscreen());
    assert_eq!(window.props().size(), (1920, 1080));
    assert!(canvas.device().clock().frame_count() >= 1);

    window.close();
    system.run();
}

#[test]
fn two_windows_terminate_after_the_last_close() {
    let system = WindowSystem::new();
    let factory = Arc::new(MockWindowFactory::new());
    let (first, _canvas_a) = system.open(Props::default(), factory.clone()).unwrap();
    let (second, _canvas_b) = system.open(Props::default(), factory.clone()).unwrap();
    assert_eq!(system.window_count(), 2);

    first.close();
    pump_until(&system, "first window teardown", || {
        system.window_count() == 1
    });
    assert!(!system.run_pending()); // no terminate while a window remains

    second.close();
    system.run();
    assert_eq!(system.window_count(), 0);
}
