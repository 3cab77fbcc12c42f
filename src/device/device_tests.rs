/// Tests for the device
///
/// A consumer thread stands in for the window's run loop: it drains the
/// command queue and counts swap requests. Devices are created with a
/// very long idle reclaim interval so queue-length assertions are not
/// disturbed by the background tick.

use super::*;
use crate::backend::MockGlBackend;
use crate::resource::{Mesh, Shader, Texture, Vertex};
use std::sync::atomic::{AtomicUsize, Ordering};

fn quiet_device(mock: Arc<MockGlBackend>) -> Device {
    Device::with_config(
        mock,
        DeviceConfig {
            idle_reclaim_interval: Duration::from_secs(3600),
            shared: None,
        },
    )
}

struct Consumer {
    stop: Sender<()>,
    swaps: Arc<AtomicUsize>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Consumer {
    fn spawn(device: &Device) -> Self {
        let exec = device.exec();
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let swaps = Arc::new(AtomicUsize::new(0));
        let swaps2 = swaps.clone();
        let handle = thread::spawn(move || loop {
            select! {
                recv(exec) -> op => match op {
                    Ok(op) => {
                        if op() {
                            swaps2.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                    Err(_) => return,
                },
                recv(stop_rx) -> _ => return,
            }
        });
        Self {
            stop: stop_tx,
            swaps,
            handle: Some(handle),
        }
    }

    fn swap_count(&self) -> usize {
        self.swaps.load(Ordering::SeqCst)
    }
}

impl Drop for Consumer {
    fn drop(&mut self) {
        let _ = self.stop.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn drawable_object() -> Object {
    let mut o = Object::new();
    o.shader = Some(Arc::new(Shader::new("basic", "vs", "fs")));
    o.meshes = vec![Arc::new(Mesh::new(
        vec![Vertex::new([0.0; 3], [0.0, 1.0, 0.0], [0.0; 2])],
        vec![],
    ))];
    o
}

const FULL: Rect = Rect {
    x: 0,
    y: 0,
    width: 800,
    height: 600,
};

// ============================================================================
// Tests: Creation
// ============================================================================

#[test]
fn test_device_probes_capabilities_and_opens_scissor() {
    let mock = Arc::new(MockGlBackend::new());
    let device = quiet_device(mock.clone());

    assert_eq!(device.info().name, "MockGL");
    assert!(device.info().occlusion_query);
    assert_eq!(device.bounds(), Rect::new(0, 0, 800, 600));
    assert_eq!(mock.call_count("set_scissor"), 1);
}

#[test]
fn test_device_capabilities_flags() {
    let device = quiet_device(Arc::new(MockGlBackend::new()));
    let caps = device.capabilities();
    assert!(caps.contains(CanvasCapabilities::DOWNLOAD));
    assert!(caps.contains(CanvasCapabilities::OCCLUSION_QUERY));

    let no_query = quiet_device(Arc::new(MockGlBackend::new().without_occlusion_query()));
    assert!(!no_query
        .capabilities()
        .contains(CanvasCapabilities::OCCLUSION_QUERY));
}

// ============================================================================
// Tests: Clears
// ============================================================================

#[test]
fn test_clear_with_empty_rect_enqueues_nothing() {
    let mock = Arc::new(MockGlBackend::new());
    let device = quiet_device(mock.clone());
    mock.clear_calls();

    device.clear(Rect::default(), Color::BLACK);
    device.clear_depth(Rect::new(0, 0, 0, 100), 1.0);
    device.clear_stencil(Rect::new(0, 0, 100, 0), 0);

    assert_eq!(device.queued_ops(), 0);
    assert!(mock.calls().is_empty());
}

#[test]
fn test_clear_sets_state_and_scissors() {
    let mock = Arc::new(MockGlBackend::new());
    let device = quiet_device(mock.clone());
    let _consumer = Consumer::spawn(&device);
    mock.clear_calls();

    device.clear(Rect::new(10, 10, 50, 50), Color::new(1.0, 0.0, 0.0, 1.0));
    device.render();

    let calls = mock.calls();
    assert!(calls.contains(&"set_color_write(true, true, true, true)".to_string()));
    assert!(calls.contains(&"set_scissor(Rect(10, 10, 50x50))".to_string()));
    assert!(calls.contains(&"set_clear_color(1, 0, 0, 1)".to_string()));
    assert_eq!(mock.call_count("clear(ClearMask(COLOR)"), 1);
}

#[test]
fn test_clear_rect_is_clamped_to_bounds() {
    let mock = Arc::new(MockGlBackend::new());
    let device = quiet_device(mock.clone());
    let _consumer = Consumer::spawn(&device);
    mock.clear_calls();

    device.clear(Rect::new(-100, -100, 5000, 5000), Color::BLACK);
    device.render();

    assert!(mock
        .calls()
        .contains(&"set_scissor(Rect(0, 0, 800x600))".to_string()));
}

// ============================================================================
// Tests: Render
// ============================================================================

#[test]
fn test_render_presents_ticks_clock_and_requests_swap() {
    let device = quiet_device(Arc::new(MockGlBackend::new()));
    let consumer = Consumer::spawn(&device);

    assert_eq!(device.clock().frame_count(), 0);
    assert!(device.render());
    assert!(device.render());

    assert_eq!(device.clock().frame_count(), 2);
    assert_eq!(consumer.swap_count(), 2);
}

#[test]
fn test_render_flushes_and_reclaims_pending_resources() {
    let mock = Arc::new(MockGlBackend::new());
    let device = quiet_device(mock.clone());
    let _consumer = Consumer::spawn(&device);

    device.resources().enqueue_texture(77);
    mock.clear_calls();
    device.render();

    assert!(mock.calls().contains(&"delete_textures([77])".to_string()));
    assert_eq!(mock.call_count("flush"), 2); // reclaim flush + frame flush
    assert!(!device.resources().has_pending());
}

#[test]
fn test_render_runs_previously_queued_ops() {
    let mock = Arc::new(MockGlBackend::new());
    let device = quiet_device(mock.clone());

    device.clear(FULL, Color::BLACK);
    device.clear_depth(FULL, 1.0);
    assert_eq!(device.queued_ops(), 2);

    let _consumer = Consumer::spawn(&device);
    device.render();

    assert_eq!(device.queued_ops(), 0);
    assert_eq!(mock.call_count("clear(ClearMask(COLOR)"), 1);
    assert_eq!(mock.call_count("clear(ClearMask(DEPTH)"), 1);
}

// ============================================================================
// Tests: Draw
// ============================================================================

#[test]
fn test_draw_uploads_and_draws() {
    let mock = Arc::new(MockGlBackend::new());
    let device = quiet_device(mock.clone());
    let _consumer = Consumer::spawn(&device);

    let o = drawable_object();
    device.draw(FULL, &o, &Camera::new());
    device.render();

    assert!(o.shader.as_ref().unwrap().loaded());
    assert!(o.meshes[0].loaded());
    assert_eq!(mock.call_count("compile_program"), 1);
    assert_eq!(mock.call_count("upload_mesh"), 1);
    assert_eq!(mock.call_count("bind_program"), 1);
    assert_eq!(mock.call_count("set_mvp"), 1);
    assert_eq!(mock.call_count("draw_mesh"), 1);
}

#[test]
fn test_draw_reuses_loaded_resources() {
    let mock = Arc::new(MockGlBackend::new());
    let device = quiet_device(mock.clone());
    let _consumer = Consumer::spawn(&device);

    let o = drawable_object();
    device.draw(FULL, &o, &Camera::new());
    device.draw(FULL, &o, &Camera::new());
    device.render();

    assert_eq!(mock.call_count("compile_program"), 1);
    assert_eq!(mock.call_count("upload_mesh"), 1);
    assert_eq!(mock.call_count("draw_mesh"), 2);
}

#[test]
fn test_draw_invalid_object_is_skipped() {
    let mock = Arc::new(MockGlBackend::new());
    let device = quiet_device(mock.clone());
    mock.clear_calls();

    let mut o = drawable_object();
    o.state = None;
    device.draw(FULL, &o, &Camera::new());

    assert_eq!(device.queued_ops(), 0);
    assert!(mock.calls().is_empty());
}

#[test]
fn test_draw_with_failing_shader_marks_error_and_skips() {
    let mock = Arc::new(MockGlBackend::new());
    let device = quiet_device(mock.clone());
    let _consumer = Consumer::spawn(&device);
    mock.fail_next_compile("0:1 syntax error");

    let o = drawable_object();
    device.draw(FULL, &o, &Camera::new());
    device.render();

    assert_eq!(
        o.shader.as_ref().unwrap().error().as_deref(),
        Some("0:1 syntax error")
    );
    assert_eq!(mock.call_count("draw_mesh"), 0);

    // Later draws reject during validation, without recompiling.
    device.draw(FULL, &o, &Camera::new());
    device.render();
    assert_eq!(mock.call_count("compile_program"), 1);
}

#[test]
fn test_draw_uploads_texture_and_binds_it() {
    let mock = Arc::new(MockGlBackend::new());
    let device = quiet_device(mock.clone());
    let _consumer = Consumer::spawn(&device);

    let mut o = drawable_object();
    let tex = Arc::new(Texture::with_source(
        crate::backend::TexFormat::Rgba,
        ImageData::new(2, 2, vec![0u8; 16]),
    ));
    o.textures = vec![tex.clone()];
    device.draw(FULL, &o, &Camera::new());
    device.render();

    assert!(tex.loaded());
    assert!(!tex.has_source()); // CPU copy released after upload
    assert_eq!(mock.call_count("create_texture"), 1);
    assert_eq!(mock.call_count("upload_texture"), 1);
    assert_eq!(mock.call_count("bind_texture"), 1);
}

// ============================================================================
// Tests: Occlusion Queries
// ============================================================================

#[test]
fn test_occlusion_draw_resolves_by_render() {
    let mock = Arc::new(MockGlBackend::new().with_query_latency(3));
    mock.set_query_result(640);
    let device = quiet_device(mock.clone());
    let _consumer = Consumer::spawn(&device);

    let mut o = drawable_object();
    o.occlusion_test = true;
    device.draw(FULL, &o, &Camera::new());
    assert_eq!(o.sample_count(), -1);

    device.render();
    assert_eq!(o.sample_count(), 640);
    assert_eq!(mock.call_count("begin_query"), 1);
    assert_eq!(mock.call_count("end_query"), 1);
    assert_eq!(mock.call_count("delete_query"), 1);
}

#[test]
fn test_occlusion_draw_without_capability_issues_no_query() {
    let mock = Arc::new(MockGlBackend::new().without_occlusion_query());
    let device = quiet_device(mock.clone());
    let _consumer = Consumer::spawn(&device);

    let mut o = drawable_object();
    o.occlusion_test = true;
    device.draw(FULL, &o, &Camera::new());
    device.render();

    assert_eq!(mock.call_count("gen_query"), 0);
    assert_eq!(o.sample_count(), -1);
}

#[test]
fn test_query_wait_blocks_until_resolved() {
    let mock = Arc::new(MockGlBackend::new().with_query_latency(5));
    let device = quiet_device(mock.clone());
    let _consumer = Consumer::spawn(&device);

    let mut o = drawable_object();
    o.occlusion_test = true;
    device.draw(FULL, &o, &Camera::new());
    device.query_wait();

    assert_eq!(device.inner.queries.pending_count(), 0);
}

// ============================================================================
// Tests: Download
// ============================================================================

#[test]
fn test_download_returns_clamped_pixels() {
    let device = quiet_device(Arc::new(MockGlBackend::new()));
    let _consumer = Consumer::spawn(&device);

    let (tx, rx) = bounded(1);
    device.download(Rect::new(0, 0, 4000, 4000), tx);
    let image = rx.recv().unwrap().unwrap();
    assert_eq!(image.width, 800);
    assert_eq!(image.height, 600);
    assert_eq!(image.rgba.len(), 800 * 600 * 4);
}

#[test]
fn test_download_outside_bounds_returns_none() {
    let device = quiet_device(Arc::new(MockGlBackend::new()));
    let _consumer = Consumer::spawn(&device);

    let (tx, rx) = bounded(1);
    device.download(Rect::new(10_000, 10_000, 4, 4), tx);
    assert!(rx.recv().unwrap().is_none());
}

// ============================================================================
// Tests: Bounds and Idle Reclaim
// ============================================================================

#[test]
fn test_update_bounds_changes_scissor_clamp() {
    let mock = Arc::new(MockGlBackend::new());
    let device = quiet_device(mock.clone());
    let _consumer = Consumer::spawn(&device);

    device.update_bounds(Rect::new(0, 0, 100, 100));
    mock.clear_calls();
    device.clear(FULL, Color::BLACK);
    device.render();

    assert!(mock
        .calls()
        .contains(&"set_scissor(Rect(0, 0, 100x100))".to_string()));
}

#[test]
fn test_idle_thread_reclaims_without_render() {
    let mock = Arc::new(MockGlBackend::new());
    let device = Device::with_config(
        mock.clone(),
        DeviceConfig {
            idle_reclaim_interval: Duration::from_millis(10),
            shared: None,
        },
    );
    let _consumer = Consumer::spawn(&device);

    device.resources().enqueue_shader(5);
    thread::sleep(Duration::from_millis(100));

    assert!(!device.resources().has_pending());
    assert!(mock.call_count("delete_program") >= 1);
}

#[test]
fn test_driver_debug_messages_are_logged_not_fatal() {
    let mock = Arc::new(MockGlBackend::new());
    let device = quiet_device(mock.clone());
    assert_eq!(mock.call_count("set_debug_output"), 1);

    mock.emit_debug(DebugSeverity::High, "GL_OUT_OF_MEMORY in buffer allocation");
    mock.emit_debug(DebugSeverity::Notification, "buffer 3 placed in VRAM");

    // The device keeps working after a driver complaint.
    let _consumer = Consumer::spawn(&device);
    assert!(device.render());
}

#[test]
fn test_shared_device_is_exposed() {
    let first = quiet_device(Arc::new(MockGlBackend::new()));
    let second = Device::with_config(
        Arc::new(MockGlBackend::new()),
        DeviceConfig {
            idle_reclaim_interval: Duration::from_secs(3600),
            shared: Some(first.clone()),
        },
    );
    assert!(second.shared().is_some());
    assert!(first.shared().is_none());
}
