//! Window backend abstraction
//!
//! `WindowBackend` is the narrow surface the controller needs from a
//! native windowing toolkit; `WindowFactory` builds a native window
//! plus the device rendering into it. Both are trait objects so the
//! controller and its tests run against the mock implementation while
//! production embeds the winit adapter.
//!
//! Native-window mutations are thread-affine. Everything the
//! controller cannot do on its own thread is shipped as a `MainOp` to
//! the single thread running `WindowSystem::run`.

use std::sync::Arc;

use crate::device::Device;
use crate::error::Result;
use super::props::Props;

/// Work routed to the window-system thread
pub enum MainOp {
    /// Run a closure on the window-system thread
    Exec(Box<dyn FnOnce() + Send>),

    /// Last window closed; tear down the windowing subsystem
    Terminate,
}

/// A native window, driven from the window-system thread
pub trait WindowBackend: Send + Sync {
    fn set_title(&self, title: &str);
    fn set_size(&self, width: u32, height: u32);
    fn set_pos(&self, x: i32, y: i32);
    fn set_cursor_pos(&self, x: f64, y: f64);
    fn set_visible(&self, visible: bool);
    fn set_minimized(&self, minimized: bool);

    /// Swap interval: -1 adaptive, 0 off, 1 synced
    fn set_swap_interval(&self, interval: i32);

    fn set_cursor_grabbed(&self, grabbed: bool);

    /// Present the back buffer (called from the window thread)
    fn swap_buffers(&self);

    fn make_context_current(&self);
    fn detach_context(&self);

    /// Destroy the native window (window-system thread only)
    fn destroy(&self);

    fn extension_supported(&self, name: &str) -> bool;

    fn set_clipboard(&self, text: &str);
    fn clipboard(&self) -> String;

    /// Primary monitor size, for centering and fullscreen sizing
    fn screen_size(&self) -> (u32, u32);
}

/// A freshly built native window and the device rendering into it
pub struct BuiltWindow {
    pub backend: Arc<dyn WindowBackend>,
    pub device: Device,
}

/// Builds native window / device pairs
///
/// Invoked on the window-system thread, both at window creation and
/// again on every fullscreen rebuild.
pub trait WindowFactory: Send + Sync {
    fn build(&self, props: &Props) -> Result<BuiltWindow>;
}
