//! Command executor - the bounded render-thread work queue
//!
//! Every operation against a device (clears, draws, resource uploads,
//! render-to-texture setup, frame completion) becomes one closure
//! enqueued here. A single consumer (the window's run loop, or the
//! device owner in headless use) drains the queue in FIFO order; an
//! operation returning `true` asks the consumer to swap the window's
//! buffers afterwards.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// One render-thread operation
///
/// Returns whether the consumer should present the frame after running it.
pub type RenderOp = Box<dyn FnOnce() -> bool + Send>;

/// Capacity of the command queue
///
/// Producers block once this many operations are waiting, which
/// backpressures threads that enqueue faster than the render thread
/// executes.
pub const EXEC_QUEUE_CAP: usize = 1024;

/// Bounded FIFO queue of render-thread operations
///
/// Cloning is cheap and shares the same queue; both endpoints live in
/// every clone so the channel only closes when the last clone drops.
#[derive(Clone)]
pub struct CommandExecutor {
    tx: Sender<RenderOp>,
    rx: Receiver<RenderOp>,
}

impl CommandExecutor {
    /// Create an empty queue
    pub fn new() -> Self {
        let (tx, rx) = bounded(EXEC_QUEUE_CAP);
        Self { tx, rx }
    }

    /// Enqueue an operation, blocking while the queue is full
    ///
    /// Must not be called from the operation currently being executed by
    /// the consumer: a full queue would deadlock against itself.
    pub fn submit<F>(&self, op: F)
    where
        F: FnOnce() -> bool + Send + 'static,
    {
        // Only fails if every clone is gone, and we hold one.
        let _ = self.tx.send(Box::new(op));
    }

    /// Enqueue an operation unless the queue is full
    ///
    /// Used by the idle reclaim thread, which must never block the
    /// render path. Returns whether the operation was accepted.
    pub fn try_submit(&self, op: RenderOp) -> bool {
        match self.tx.try_send(op) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// The consumer endpoint
    ///
    /// The window run loop selects over this receiver alongside its
    /// control channels.
    pub fn receiver(&self) -> Receiver<RenderOp> {
        self.rx.clone()
    }

    /// Number of operations currently queued
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Execute the operations queued at the moment of the call
    ///
    /// Runs exactly the snapshot length, so operations enqueued by other
    /// threads during the drain wait for the next frame and the drain
    /// always terminates. Swap requests from drained operations are
    /// ignored; frame completion decides presentation on its own.
    ///
    /// Only the consumer thread may call this.
    pub fn drain_queued(&self) -> usize {
        let queued = self.rx.len();
        let mut ran = 0;
        for _ in 0..queued {
            match self.rx.try_recv() {
                Ok(op) => {
                    op();
                    ran += 1;
                }
                Err(_) => break,
            }
        }
        ran
    }
}

impl Default for CommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "exec_tests.rs"]
mod tests;
