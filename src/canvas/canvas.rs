//! Canvas trait - anything that can be drawn to
//!
//! A window's back buffer and an off-screen render-to-texture target
//! expose the same surface: clears, draws, occlusion-query waits,
//! render (present), and pixel downloads. All operations are enqueued
//! onto the owning device's command queue and execute on the render
//! thread; only `render` and `query_wait` block the caller.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::Sender;

use crate::camera::Camera;
use crate::resource::Object;
use crate::types::{Color, ImageData, Precision, Rect};

bitflags::bitflags! {
    /// Optional abilities of a canvas
    ///
    /// Callers check these instead of downcasting the canvas type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CanvasCapabilities: u32 {
        /// `download` returns pixels instead of `None`
        const DOWNLOAD = 1 << 0;

        /// Occlusion queries report real sample counts
        const OCCLUSION_QUERY = 1 << 1;
    }
}

/// A surface commands can target
pub trait Canvas: Send + Sync {
    /// Current drawable bounds
    fn bounds(&self) -> Rect;

    /// Storage precision of this canvas
    fn precision(&self) -> Precision;

    /// Whether multisampling is currently applied
    fn msaa(&self) -> bool;

    /// Toggle multisampling
    fn set_msaa(&self, msaa: bool);

    /// Optional abilities of this canvas
    fn capabilities(&self) -> CanvasCapabilities;

    /// Clear `rect` to `color`
    ///
    /// An empty rectangle is a no-op and enqueues nothing.
    fn clear(&self, rect: Rect, color: Color);

    /// Clear the depth buffer over `rect`
    fn clear_depth(&self, rect: Rect, depth: f64);

    /// Clear the stencil buffer over `rect`
    fn clear_stencil(&self, rect: Rect, stencil: i32);

    /// Draw one object as seen by `camera`, scissored to `rect`
    ///
    /// Invalid objects are skipped with a warning; an empty rectangle
    /// skips silently.
    fn draw(&self, rect: Rect, object: &Object, camera: &Camera);

    /// Block until every outstanding occlusion query has resolved
    fn query_wait(&self);

    /// Finish the frame
    ///
    /// Blocks until all queued commands have executed. Returns whether a
    /// frame was presented to the window; rendering into an off-screen
    /// canvas returns false and leaves the frame clock untouched.
    fn render(&self) -> bool;

    /// Asynchronously read back pixels inside `rect`
    ///
    /// The result arrives on `completion` once the queue reaches the
    /// download; `None` when the rectangle is empty, out of bounds, or
    /// the canvas cannot download.
    fn download(&self, rect: Rect, completion: Sender<Option<ImageData>>);
}

/// Shared bounds/precision/MSAA state embedded in canvas implementations
pub struct CanvasState {
    bounds: RwLock<Rect>,
    precision: Precision,
    msaa: AtomicBool,
}

impl CanvasState {
    /// Create canvas state with MSAA initially enabled
    pub fn new(bounds: Rect, precision: Precision) -> Self {
        Self {
            bounds: RwLock::new(bounds),
            precision,
            msaa: AtomicBool::new(true),
        }
    }

    pub fn bounds(&self) -> Rect {
        *self.bounds.read().unwrap()
    }

    /// Update the bounds (window resize, for the on-screen canvas)
    pub fn set_bounds(&self, bounds: Rect) {
        *self.bounds.write().unwrap() = bounds;
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn msaa(&self) -> bool {
        self.msaa.load(Ordering::SeqCst)
    }

    pub fn set_msaa(&self, msaa: bool) {
        self.msaa.store(msaa, Ordering::SeqCst);
    }
}

#[cfg(test)]
#[path = "canvas_tests.rs"]
mod tests;
