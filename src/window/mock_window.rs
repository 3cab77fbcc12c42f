//! Mock window backend and factory for tests
//!
//! Same recording style as `MockGlBackend`: every native call becomes
//! a string, and tests script the pieces that matter (adaptive-vsync
//! extension presence, clipboard contents).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::backend::MockGlBackend;
use crate::device::{Device, DeviceConfig};
use crate::error::Result;
use super::backend::{BuiltWindow, WindowBackend, WindowFactory};
use super::props::Props;

/// A recording native window
pub struct MockWindowBackend {
    calls: Mutex<Vec<String>>,
    clipboard: Mutex<String>,
    swap_control_tear: bool,
}

impl MockWindowBackend {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            clipboard: Mutex::new(String::new()),
            swap_control_tear: false,
        }
    }

    /// Advertise the swap-control-tear extension (adaptive vsync)
    pub fn with_swap_control_tear(mut self) -> Self {
        self.swap_control_tear = true;
        self
    }

    /// All recorded calls, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls starting with `prefix`
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Forget everything recorded so far
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl Default for MockWindowBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowBackend for MockWindowBackend {
    fn set_title(&self, title: &str) {
        self.record(format!("set_title({})", title));
    }

    fn set_size(&self, width: u32, height: u32) {
        self.record(format!("set_size({}, {})", width, height));
    }

    fn set_pos(&self, x: i32, y: i32) {
        self.record(format!("set_pos({}, {})", x, y));
    }

    fn set_cursor_pos(&self, x: f64, y: f64) {
        self.record(format!("set_cursor_pos({}, {})", x, y));
    }

    fn set_visible(&self, visible: bool) {
        self.record(format!("set_visible({})", visible));
    }

    fn set_minimized(&self, minimized: bool) {
        self.record(format!("set_minimized({})", minimized));
    }

    fn set_swap_interval(&self, interval: i32) {
        self.record(format!("set_swap_interval({})", interval));
    }

    fn set_cursor_grabbed(&self, grabbed: bool) {
        self.record(format!("set_cursor_grabbed({})", grabbed));
    }

    fn swap_buffers(&self) {
        self.record("swap_buffers".to_string());
    }

    fn make_context_current(&self) {
        self.record("make_context_current".to_string());
    }

    fn detach_context(&self) {
        self.record("detach_context".to_string());
    }

    fn destroy(&self) {
        self.record("destroy".to_string());
    }

    fn extension_supported(&self, name: &str) -> bool {
        name.ends_with("swap_control_tear") && self.swap_control_tear
    }

    fn set_clipboard(&self, text: &str) {
        self.record(format!("set_clipboard({})", text));
        *self.clipboard.lock().unwrap() = text.to_string();
    }

    fn clipboard(&self) -> String {
        self.record("clipboard".to_string());
        self.clipboard.lock().unwrap().clone()
    }

    fn screen_size(&self) -> (u32, u32) {
        (1920, 1080)
    }
}

/// Factory producing mock windows over mock GL devices
pub struct MockWindowFactory {
    swap_control_tear: bool,
    builds: AtomicUsize,

    /// Backends built so far, newest last
    built: Mutex<Vec<Arc<MockWindowBackend>>>,
}

impl MockWindowFactory {
    pub fn new() -> Self {
        Self {
            swap_control_tear: false,
            builds: AtomicUsize::new(0),
            built: Mutex::new(Vec::new()),
        }
    }

    pub fn with_swap_control_tear(mut self) -> Self {
        self.swap_control_tear = true;
        self
    }

    /// How many windows this factory has built
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// The most recently built backend
    pub fn last_backend(&self) -> Option<Arc<MockWindowBackend>> {
        self.built.lock().unwrap().last().cloned()
    }
}

impl Default for MockWindowFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowFactory for MockWindowFactory {
    fn build(&self, _props: &Props) -> Result<BuiltWindow> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        let mut backend = MockWindowBackend::new();
        if self.swap_control_tear {
            backend = backend.with_swap_control_tear();
        }
        let backend = Arc::new(backend);
        self.built.lock().unwrap().push(backend.clone());

        let device = Device::with_config(
            Arc::new(MockGlBackend::new()),
            DeviceConfig {
                idle_reclaim_interval: Duration::from_secs(3600),
                shared: None,
            },
        );
        Ok(BuiltWindow {
            backend,
            device,
        })
    }
}
