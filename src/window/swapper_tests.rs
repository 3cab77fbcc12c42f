/// Tests for the device swapper

use super::*;
use crate::backend::MockGlBackend;
use crate::device::DeviceConfig;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn quiet_device() -> Device {
    Device::with_config(
        Arc::new(MockGlBackend::new()),
        DeviceConfig {
            idle_reclaim_interval: Duration::from_secs(3600),
            shared: None,
        },
    )
}

#[test]
fn test_device_passes_through_without_yield() {
    let device = quiet_device();
    let (swapper, _control) = Swapper::new(device.clone());

    assert_eq!(swapper.bounds(), device.bounds());
    assert_eq!(swapper.device().queued_ops(), 0);
}

#[test]
fn test_operations_delegate_to_current_device() {
    let device = quiet_device();
    let (swapper, _control) = Swapper::new(device.clone());

    swapper.clear(Rect::new(0, 0, 10, 10), Color::BLACK);
    assert_eq!(device.queued_ops(), 1);
}

#[test]
fn test_yield_swaps_in_the_published_device() {
    let old = quiet_device();
    let new = quiet_device();
    let (swapper, control) = Swapper::new(old.clone());

    control.request_yield();

    // The window thread waits on the ack, then publishes.
    let publisher = thread::spawn(move || {
        control.ack().recv().unwrap();
        control.publish(new);
    });

    // Enqueue through the swapper mid-rebuild: the op must land on the
    // replacement device, never the one being torn down.
    swapper.clear(Rect::new(0, 0, 10, 10), Color::BLACK);
    publisher.join().unwrap();

    assert_eq!(old.queued_ops(), 0);
    assert_eq!(swapper.device().queued_ops(), 1);
}

#[test]
fn test_sync_runs_at_most_once_per_yield() {
    let device = quiet_device();
    let (swapper, control) = Swapper::new(device.clone());

    control.request_yield();
    let replacement = quiet_device();
    let handle = {
        let replacement = replacement.clone();
        thread::spawn(move || {
            control.ack().recv().unwrap();
            control.publish(replacement);
            control
        })
    };

    let _ = swapper.device();
    let control = handle.join().unwrap();

    // No pending yield: device() must not block on the rendezvous.
    assert_eq!(swapper.device().bounds(), replacement.bounds());
    drop(control);
}
