//! Device hand-off during window rebuilds
//!
//! Fullscreen transitions rebuild the native window and its device.
//! The `Swapper` is the application-facing canvas that survives the
//! swap: it delegates to the current device, and before every
//! delegated call it checks whether the window thread has requested a
//! yield. When it has, the swapper acknowledges (a rendezvous the
//! window's drain loop is waiting on), blocks for the replacement
//! device, and installs it. Application code never observes a torn
//! down device.
//!
//! A render issued mid-rebuild therefore synchronizes first and lands
//! on the new device; work already queued on the old device is drained
//! by the window thread before teardown.

use std::sync::Mutex;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::camera::Camera;
use crate::canvas::{Canvas, CanvasCapabilities};
use crate::device::Device;
use crate::resource::Object;
use crate::types::{Color, ImageData, Precision, Rect};

/// Window-thread side of the hand-off
pub struct SwapperControl {
    yield_tx: Sender<()>,
    ack_rx: Receiver<()>,
    handoff_tx: Sender<Device>,
}

impl SwapperControl {
    /// Ask the consumer to yield at its next canvas operation
    pub fn request_yield(&self) {
        let _ = self.yield_tx.send(());
    }

    /// Channel the consumer acknowledges the yield on
    pub fn ack(&self) -> &Receiver<()> {
        &self.ack_rx
    }

    /// Publish the rebuilt device, resuming the consumer
    pub fn publish(&self, device: Device) {
        let _ = self.handoff_tx.send(device);
    }
}

/// Application-facing canvas that survives device rebuilds
pub struct Swapper {
    device: Mutex<Device>,
    yield_rx: Receiver<()>,
    ack_tx: Sender<()>,
    handoff_rx: Receiver<Device>,
}

impl Swapper {
    /// Create a swapper over `device` plus its window-side control
    pub fn new(device: Device) -> (Swapper, SwapperControl) {
        let (yield_tx, yield_rx) = bounded(1);
        // Zero capacity: the ack is a rendezvous with the drain loop.
        let (ack_tx, ack_rx) = bounded(0);
        let (handoff_tx, handoff_rx) = bounded(1);
        (
            Swapper {
                device: Mutex::new(device),
                yield_rx,
                ack_tx,
                handoff_rx,
            },
            SwapperControl {
                yield_tx,
                ack_rx,
                handoff_tx,
            },
        )
    }

    /// Complete any pending device swap, then return the current device
    pub fn device(&self) -> Device {
        self.sync();
        self.device.lock().unwrap().clone()
    }

    /// Observe a yield request, acknowledge it, install the replacement
    fn sync(&self) {
        if self.yield_rx.try_recv().is_err() {
            return;
        }
        let _ = self.ack_tx.send(());
        if let Ok(device) = self.handoff_rx.recv() {
            *self.device.lock().unwrap() = device;
        }
    }
}

impl Canvas for Swapper {
    fn bounds(&self) -> Rect {
        self.device().bounds()
    }

    fn precision(&self) -> Precision {
        self.device().precision()
    }

    fn msaa(&self) -> bool {
        self.device().msaa()
    }

    fn set_msaa(&self, msaa: bool) {
        self.device().set_msaa(msaa);
    }

    fn capabilities(&self) -> CanvasCapabilities {
        self.device().capabilities()
    }

    fn clear(&self, rect: Rect, color: Color) {
        self.device().clear(rect, color);
    }

    fn clear_depth(&self, rect: Rect, depth: f64) {
        self.device().clear_depth(rect, depth);
    }

    fn clear_stencil(&self, rect: Rect, stencil: i32) {
        self.device().clear_stencil(rect, stencil);
    }

    fn draw(&self, rect: Rect, object: &Object, camera: &Camera) {
        self.device().draw(rect, object, camera);
    }

    fn query_wait(&self) {
        self.device().query_wait();
    }

    fn render(&self) -> bool {
        self.device().render()
    }

    fn download(&self, rect: Rect, completion: Sender<Option<ImageData>>) {
        self.device().download(rect, completion);
    }
}

#[cfg(test)]
#[path = "swapper_tests.rs"]
mod tests;
