//! Window properties
//!
//! `Props` is a plain value describing everything mutable about a
//! window. Applications build one, hand it to `Window::request`, and
//! the controller reconciles the deltas against the last applied set
//! so unchanged properties cost no native calls.

use crate::types::Precision;

/// Sentinel position meaning "center on the primary monitor"
pub const CENTERED: (i32, i32) = (-1, -1);

/// Desired window properties
#[derive(Debug, Clone, PartialEq)]
pub struct Props {
    title: String,
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    cursor_x: f64,
    cursor_y: f64,
    fullscreen: bool,
    visible: bool,
    minimized: bool,
    focused: bool,
    vsync: bool,
    cursor_grabbed: bool,
    resizable: bool,
    decorated: bool,
    always_on_top: bool,
    should_close: bool,
    resize_render_sync: bool,
    framebuffer_width: u32,
    framebuffer_height: u32,
    precision: Precision,
}

impl Default for Props {
    fn default() -> Self {
        Self {
            title: "Quasar - {FPS}".to_string(),
            width: 800,
            height: 450,
            x: CENTERED.0,
            y: CENTERED.1,
            cursor_x: -1.0,
            cursor_y: -1.0,
            fullscreen: false,
            visible: true,
            minimized: false,
            focused: true,
            vsync: true,
            cursor_grabbed: false,
            resizable: true,
            decorated: true,
            always_on_top: false,
            should_close: true,
            resize_render_sync: false,
            framebuffer_width: 0,
            framebuffer_height: 0,
            precision: Precision {
                red_bits: 8,
                green_bits: 8,
                blue_bits: 8,
                alpha_bits: 8,
                depth_bits: 24,
                stencil_bits: 8,
                samples: 2,
            },
        }
    }
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    /// Window title; one `{FPS}` placeholder is replaced with the
    /// device's current frame rate
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    /// Window position; `CENTERED` centers on the primary monitor
    pub fn pos(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn set_pos(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    /// Cursor position in window coordinates; (-1, -1) leaves it alone
    pub fn cursor_pos(&self) -> (f64, f64) {
        (self.cursor_x, self.cursor_y)
    }

    pub fn set_cursor_pos(&mut self, x: f64, y: f64) {
        self.cursor_x = x;
        self.cursor_y = y;
    }

    pub fn fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.fullscreen = fullscreen;
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn minimized(&self) -> bool {
        self.minimized
    }

    pub fn set_minimized(&mut self, minimized: bool) {
        self.minimized = minimized;
    }

    pub fn focused(&self) -> bool {
        self.focused
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn vsync(&self) -> bool {
        self.vsync
    }

    pub fn set_vsync(&mut self, vsync: bool) {
        self.vsync = vsync;
    }

    /// Whether the cursor is grabbed (hidden, reported as deltas)
    pub fn cursor_grabbed(&self) -> bool {
        self.cursor_grabbed
    }

    pub fn set_cursor_grabbed(&mut self, grabbed: bool) {
        self.cursor_grabbed = grabbed;
    }

    pub fn resizable(&self) -> bool {
        self.resizable
    }

    pub fn set_resizable(&mut self, resizable: bool) {
        self.resizable = resizable;
    }

    pub fn decorated(&self) -> bool {
        self.decorated
    }

    pub fn set_decorated(&mut self, decorated: bool) {
        self.decorated = decorated;
    }

    pub fn always_on_top(&self) -> bool {
        self.always_on_top
    }

    pub fn set_always_on_top(&mut self, on_top: bool) {
        self.always_on_top = on_top;
    }

    /// Whether a native close request closes the window automatically
    pub fn should_close(&self) -> bool {
        self.should_close
    }

    pub fn set_should_close(&mut self, should_close: bool) {
        self.should_close = should_close;
    }

    /// Whether live resizing synchronizes with the next rendered frame
    pub fn resize_render_sync(&self) -> bool {
        self.resize_render_sync
    }

    pub fn set_resize_render_sync(&mut self, sync: bool) {
        self.resize_render_sync = sync;
    }

    pub fn framebuffer_size(&self) -> (u32, u32) {
        (self.framebuffer_width, self.framebuffer_height)
    }

    pub fn set_framebuffer_size(&mut self, width: u32, height: u32) {
        self.framebuffer_width = width;
        self.framebuffer_height = height;
    }

    /// Requested framebuffer precision (creation hint)
    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn set_precision(&mut self, precision: Precision) {
        self.precision = precision;
    }
}

#[cfg(test)]
#[path = "props_tests.rs"]
mod tests;
