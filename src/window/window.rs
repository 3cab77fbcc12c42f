//! Window controller and window system
//!
//! A `Window` owns a native window (through `WindowBackend`) and the
//! `Device` rendering into it. Its dedicated thread drains the
//! device's command queue, swapping buffers whenever an operation
//! presents a frame. Property changes arrive as whole `Props` values
//! and are reconciled against the last applied set so unchanged
//! properties cost nothing.
//!
//! Fullscreen is the one property the native toolkit cannot change on
//! a live window. Toggling it tears the window and device down and
//! rebuilds both, coordinated with the application through the
//! swapper: queued work on the old device is drained first, so nothing
//! submitted before the toggle is lost.
//!
//! `WindowSystem` runs the single thread allowed to mutate native
//! windows. The op channel is an explicit construction parameter of
//! every window rather than process-global state, so independent
//! systems (tests in particular) never share it.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, unbounded, Receiver, Sender};

use crate::device::Device;
use crate::error::Result;
use crate::input::{Button, ButtonState, Key, KeyState, KeyboardWatcher, MouseWatcher};
use crate::types::Rect;
use super::backend::{MainOp, WindowBackend, WindowFactory};
use super::props::{Props, CENTERED};
use super::swapper::{Swapper, SwapperControl};

const LOG_SOURCE: &str = "quasar::Window";

/// How a cursor-moved event should be interpreted
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CursorMotion {
    /// Window-relative position (cursor not grabbed)
    Absolute { x: f64, y: f64 },

    /// Motion delta since the previous event (cursor grabbed)
    Delta { x: f64, y: f64 },
}

/// Native call planned by reconciliation, issued after the lock drops
enum NativeAction {
    Title(String),
    Size(u32, u32),
    Pos(i32, i32),
    CursorPos(f64, f64),
    Visible(bool),
    Minimized(bool),
    SwapInterval(i32),
    CursorGrab(bool),
}

struct WindowState {
    props: Props,
    last: Props,
    backend: Arc<dyn WindowBackend>,
    device: Device,

    /// Windowed size to restore when leaving fullscreen
    before_fullscreen: (u32, u32),

    /// Delta baseline for grabbed-cursor motion; -inf means no motion
    /// seen since the last grab toggle
    last_cursor: (f64, f64),

    closed: bool,
}

// ============================================================================
// Window
// ============================================================================

/// A native window and the thread driving its device
pub struct Window {
    state: RwLock<WindowState>,
    keyboard: Arc<KeyboardWatcher>,
    mouse: Arc<MouseWatcher>,
    factory: Arc<dyn WindowFactory>,
    main: Sender<MainOp>,
    open_windows: Arc<AtomicUsize>,
    control: SwapperControl,
    swap_control_tear: AtomicBool,

    exit_tx: Sender<()>,
    exit_rx: Receiver<()>,
    rebuild_tx: Sender<()>,
    rebuild_rx: Receiver<()>,

    /// Zero-capacity: `handle_damaged` rendezvouses with frame swaps
    frame_tx: Sender<()>,
    frame_rx: Receiver<()>,
}

impl Window {
    /// Build a native window and spawn its device-draining thread
    ///
    /// Must be called on the window-system thread. The returned
    /// `Swapper` is the application's canvas; it stays valid across
    /// fullscreen rebuilds.
    ///
    /// # Errors
    ///
    /// Returns `Error::InitializationFailed` (or the factory's own
    /// error) when the native window or its device cannot be built.
    pub fn open(
        props: Props,
        factory: Arc<dyn WindowFactory>,
        main: Sender<MainOp>,
        open_windows: Arc<AtomicUsize>,
    ) -> Result<(Arc<Window>, Swapper)> {
        let built = factory.build(&props)?;
        let tear = built.backend.extension_supported("WGL_EXT_swap_control_tear")
            || built.backend.extension_supported("GLX_EXT_swap_control_tear");

        let device = built.device.clone();
        let (swapper, control) = Swapper::new(device.clone());

        // Fullscreen matches the built window already; a mismatch here
        // would signal a rebuild before the run loop even starts.
        let mut last = Props::default();
        last.set_fullscreen(props.fullscreen());

        let (exit_tx, exit_rx) = bounded(1);
        let (rebuild_tx, rebuild_rx) = bounded(1);
        let (frame_tx, frame_rx) = bounded(0);

        let window = Arc::new(Window {
            state: RwLock::new(WindowState {
                props: props.clone(),
                last,
                backend: built.backend,
                device,
                before_fullscreen: props.size(),
                last_cursor: (f64::NEG_INFINITY, f64::NEG_INFINITY),
                closed: false,
            }),
            keyboard: Arc::new(KeyboardWatcher::new()),
            mouse: Arc::new(MouseWatcher::new()),
            factory,
            main,
            open_windows: open_windows.clone(),
            control,
            swap_control_tear: AtomicBool::new(tear),
            exit_tx,
            exit_rx,
            rebuild_tx,
            rebuild_rx,
            frame_tx,
            frame_rx,
        });

        window.reconcile(props, true);
        open_windows.fetch_add(1, Ordering::SeqCst);
        crate::engine_info!(LOG_SOURCE, "window opened");

        let runner = window.clone();
        thread::Builder::new()
            .name("quasar-window".to_string())
            .spawn(move || runner.run())
            .map_err(|e| {
                crate::error::Error::InitializationFailed(format!(
                    "window thread: {}",
                    e
                ))
            })?;

        Ok((window, swapper))
    }

    /// Snapshot of the desired properties
    pub fn props(&self) -> Props {
        self.state.read().unwrap().props.clone()
    }

    /// The device currently rendering into this window
    pub fn device(&self) -> Device {
        self.state.read().unwrap().device.clone()
    }

    pub fn keyboard(&self) -> Arc<KeyboardWatcher> {
        self.keyboard.clone()
    }

    pub fn mouse(&self) -> Arc<MouseWatcher> {
        self.mouse.clone()
    }

    /// Apply new properties, from the window-system thread
    pub fn request(self: &Arc<Self>, props: Props) {
        let this = self.clone();
        let _ = self.main.send(MainOp::Exec(Box::new(move || {
            this.reconcile(props, false);
        })));
    }

    /// Read the system clipboard (blocking round-trip)
    pub fn clipboard(&self) -> String {
        let backend = self.state.read().unwrap().backend.clone();
        let (tx, rx) = bounded(1);
        let _ = self.main.send(MainOp::Exec(Box::new(move || {
            let _ = tx.send(backend.clipboard());
        })));
        rx.recv().unwrap_or_default()
    }

    pub fn set_clipboard(&self, text: impl Into<String>) {
        let backend = self.state.read().unwrap().backend.clone();
        let text = text.into();
        let _ = self.main.send(MainOp::Exec(Box::new(move || {
            backend.set_clipboard(&text);
        })));
    }

    /// Close the window; a second call is a no-op
    pub fn close(&self) {
        {
            let mut st = self.state.write().unwrap();
            if st.closed {
                return;
            }
            st.closed = true;
        }
        let _ = self.exit_tx.send(());
    }

    // ===== Property reconciliation =====

    /// Apply `props`, issuing native calls only for the deltas
    ///
    /// A fullscreen change is checked first and handled exclusively:
    /// it signals a rebuild and returns, because the rebuild re-applies
    /// the full property set with `force` afterwards.
    fn reconcile(&self, props: Props, force: bool) {
        let (backend, actions) = {
            let mut st = self.state.write().unwrap();
            st.props = props;

            let fullscreen = st.props.fullscreen();
            if fullscreen != st.last.fullscreen() {
                st.last.set_fullscreen(fullscreen);
                if !fullscreen {
                    let (w, h) = st.before_fullscreen;
                    st.props.set_size(w, h);
                }
                drop(st);
                let _ = self.rebuild_tx.try_send(());
                return;
            }

            let mut actions = Vec::new();

            let fps = st.device.clock().frame_rate();
            actions.push(NativeAction::Title(substitute_fps(st.props.title(), fps)));

            let (width, height) = st.props.size();
            if force || st.last.size() != (width, height) {
                if !fullscreen {
                    st.before_fullscreen = (width, height);
                }
                st.last.set_size(width, height);
                actions.push(NativeAction::Size(width, height));
            }

            let (x, y) = st.props.pos();
            if (force || st.last.pos() != (x, y)) && !fullscreen {
                st.last.set_pos(x, y);
                let (x, y) = if (x, y) == CENTERED {
                    let (sw, sh) = st.backend.screen_size();
                    (
                        (sw as i32 - width as i32) / 2,
                        (sh as i32 - height as i32) / 2,
                    )
                } else {
                    (x, y)
                };
                actions.push(NativeAction::Pos(x, y));
            }

            let (cx, cy) = st.props.cursor_pos();
            if force || st.last.cursor_pos() != (cx, cy) {
                st.last.set_cursor_pos(cx, cy);
                if cx >= 0.0 && cy >= 0.0 {
                    actions.push(NativeAction::CursorPos(cx, cy));
                }
            }

            let visible = st.props.visible();
            if force || st.last.visible() != visible {
                st.last.set_visible(visible);
                actions.push(NativeAction::Visible(visible));
            }

            let minimized = st.props.minimized();
            if force || st.last.minimized() != minimized {
                st.last.set_minimized(minimized);
                actions.push(NativeAction::Minimized(minimized));
            }

            let vsync = st.props.vsync();
            if force || st.last.vsync() != vsync {
                st.last.set_vsync(vsync);
                let interval = if vsync {
                    // Adaptive sync when the tear extension exists.
                    if self.swap_control_tear.load(Ordering::SeqCst) {
                        -1
                    } else {
                        1
                    }
                } else {
                    0
                };
                actions.push(NativeAction::SwapInterval(interval));
            }

            let grabbed = st.props.cursor_grabbed();
            if force || st.last.cursor_grabbed() != grabbed {
                st.last.set_cursor_grabbed(grabbed);
                // The next motion event must not report the jump from
                // wherever the cursor was before the toggle.
                st.last_cursor = (f64::NEG_INFINITY, f64::NEG_INFINITY);
                actions.push(NativeAction::CursorGrab(grabbed));
            }

            (st.backend.clone(), actions)
        };

        // Native calls happen with the lock released: setters can fire
        // events whose handlers re-acquire the state lock.
        for action in actions {
            match action {
                NativeAction::Title(title) => backend.set_title(&title),
                NativeAction::Size(w, h) => backend.set_size(w, h),
                NativeAction::Pos(x, y) => backend.set_pos(x, y),
                NativeAction::CursorPos(x, y) => backend.set_cursor_pos(x, y),
                NativeAction::Visible(v) => backend.set_visible(v),
                NativeAction::Minimized(m) => backend.set_minimized(m),
                NativeAction::SwapInterval(i) => backend.set_swap_interval(i),
                NativeAction::CursorGrab(g) => backend.set_cursor_grabbed(g),
            }
        }
    }

    fn refresh_title(&self) {
        let (backend, title) = {
            let st = self.state.read().unwrap();
            let fps = st.device.clock().frame_rate();
            (st.backend.clone(), substitute_fps(st.props.title(), fps))
        };
        backend.set_title(&title);
    }

    // ===== Run loop =====

    fn run(self: Arc<Self>) {
        let mut exec = self.device().exec();
        {
            let st = self.state.read().unwrap();
            st.backend.make_context_current();
        }
        let title_tick = tick(Duration::from_secs(1));

        loop {
            select! {
                recv(self.exit_rx) -> _ => {
                    self.teardown();
                    let remaining = self.open_windows.fetch_sub(1, Ordering::SeqCst) - 1;
                    crate::engine_info!(LOG_SOURCE, "window closed, {} remaining", remaining);
                    if remaining == 0 {
                        let _ = self.main.send(MainOp::Terminate);
                    }
                    return;
                }
                recv(self.rebuild_rx) -> _ => {
                    exec = self.rebuild(exec);
                }
                recv(exec) -> op => {
                    if let Ok(op) = op {
                        if op() {
                            self.swap_buffers();
                            // Wake a resize handler waiting on this frame.
                            let _ = self.frame_rx.try_recv();
                        }
                    }
                }
                recv(title_tick) -> _ => {
                    let this = self.clone();
                    let _ = self.main.send(MainOp::Exec(Box::new(move || {
                        this.refresh_title();
                    })));
                }
            }
        }
    }

    /// Tear down and rebuild window + device for a fullscreen change
    ///
    /// Keeps draining the old device until the swapper acknowledges the
    /// yield, so no already-submitted work is dropped. Returns the new
    /// device's queue receiver.
    fn rebuild(
        self: &Arc<Self>,
        exec: Receiver<crate::device::RenderOp>,
    ) -> Receiver<crate::device::RenderOp> {
        self.control.request_yield();
        loop {
            select! {
                recv(exec) -> op => {
                    if let Ok(op) = op {
                        if op() {
                            self.swap_buffers();
                        }
                    }
                }
                recv(self.control.ack()) -> _ => {
                    self.teardown();

                    let this = self.clone();
                    let (tx, rx) = bounded(1);
                    let _ = self.main.send(MainOp::Exec(Box::new(move || {
                        if let Err(err) = this.build() {
                            crate::engine_error!(LOG_SOURCE, "window rebuild failed: {}", err);
                        }
                        let _ = tx.send(());
                    })));
                    let _ = rx.recv();

                    let (device, backend) = {
                        let st = self.state.read().unwrap();
                        (st.device.clone(), st.backend.clone())
                    };
                    backend.make_context_current();
                    let exec = device.exec();
                    self.control.publish(device);
                    return exec;
                }
            }
        }
    }

    /// Rebuild the native window and device (window-system thread)
    fn build(&self) -> Result<()> {
        let props = self.state.read().unwrap().props.clone();
        let built = self.factory.build(&props)?;
        let tear = built.backend.extension_supported("WGL_EXT_swap_control_tear")
            || built.backend.extension_supported("GLX_EXT_swap_control_tear");
        self.swap_control_tear.store(tear, Ordering::SeqCst);

        let props = {
            let mut st = self.state.write().unwrap();
            st.backend = built.backend;
            st.device = built.device;
            if st.props.fullscreen() {
                let (width, height) = st.backend.screen_size();
                st.props.set_size(width, height);
                st.last.set_size(width, height);
            } else {
                st.before_fullscreen = st.props.size();
            }
            st.props.clone()
        };

        self.reconcile(props, true);
        Ok(())
    }

    /// Destroy the device and native window of the current generation
    fn teardown(&self) {
        let (device, backend) = {
            let st = self.state.read().unwrap();
            (st.device.clone(), st.backend.clone())
        };
        device.destroy();
        backend.detach_context();
        // Native window destruction belongs to the window-system thread.
        let _ = self.main.send(MainOp::Exec(Box::new(move || {
            backend.destroy();
        })));
    }

    fn swap_buffers(&self) {
        let backend = self.state.read().unwrap().backend.clone();
        backend.swap_buffers();
    }

    // ===== Event ingestion (window-system thread) =====

    pub fn handle_resized(&self, width: u32, height: u32) {
        let mut st = self.state.write().unwrap();
        if !st.last.fullscreen() {
            st.before_fullscreen = (width, height);
        }
        st.last.set_size(width, height);
        st.props.set_size(width, height);
    }

    pub fn handle_moved(&self, x: i32, y: i32) {
        let mut st = self.state.write().unwrap();
        st.last.set_pos(x, y);
        if st.last.fullscreen() {
            // Fullscreen windows do not expose a position.
            return;
        }
        st.props.set_pos(x, y);
    }

    /// Framebuffer resize: updates the device's drawable bounds
    pub fn handle_framebuffer_resized(&self, width: u32, height: u32) {
        let device = {
            let mut st = self.state.write().unwrap();
            st.last.set_framebuffer_size(width, height);
            st.props.set_framebuffer_size(width, height);
            st.device.clone()
        };
        device.update_bounds(Rect::new(0, 0, width, height));
    }

    pub fn handle_minimized(&self, minimized: bool) {
        let mut st = self.state.write().unwrap();
        st.last.set_minimized(minimized);
        st.props.set_minimized(minimized);
    }

    pub fn handle_focus(&self, focused: bool) {
        let mut st = self.state.write().unwrap();
        st.last.set_focused(focused);
        st.props.set_focused(focused);
    }

    /// Cursor motion; returns how the embedder should report it
    ///
    /// With the cursor grabbed, motion is a delta from the previous
    /// event; the first event after a grab toggle is swallowed so the
    /// jump from the pre-grab position never reaches the application.
    pub fn handle_cursor_moved(&self, x: f64, y: f64) -> Option<CursorMotion> {
        let mut st = self.state.write().unwrap();
        if st.props.cursor_grabbed() {
            let (last_x, last_y) = st.last_cursor;
            st.last_cursor = (x, y);
            if last_x == f64::NEG_INFINITY && last_y == f64::NEG_INFINITY {
                return None;
            }
            return Some(CursorMotion::Delta {
                x: x - last_x,
                y: y - last_y,
            });
        }
        st.last.set_cursor_pos(x, y);
        st.props.set_cursor_pos(x, y);
        Some(CursorMotion::Absolute { x, y })
    }

    pub fn handle_key(&self, key: Key, scancode: u64, state: KeyState) {
        self.keyboard.set_state(key, state);
        self.keyboard.set_raw_state(scancode, state);
    }

    pub fn handle_mouse_button(&self, button: Button, state: ButtonState) {
        self.mouse.set_state(button, state);
    }

    /// Native close request (close button, Alt-F4)
    pub fn handle_close_request(&self) {
        if self.state.read().unwrap().props.should_close() {
            self.close();
        }
    }

    /// Live-resize damage: synchronize with the renderer when asked to
    ///
    /// Blocks until two frames present (the in-flight frame, then a
    /// fresh one reflecting the new size).
    pub fn handle_damaged(&self) {
        if !self.state.read().unwrap().props.resize_render_sync() {
            return;
        }
        let _ = self.frame_tx.send(());
        let _ = self.frame_tx.send(());
    }
}

fn substitute_fps(title: &str, frame_rate: f64) -> String {
    let fps = format!("{}FPS", frame_rate.ceil() as u32);
    title.replacen("{FPS}", &fps, 1)
}

// ============================================================================
// WindowSystem
// ============================================================================

/// The single thread allowed to mutate native windows
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use quasar_gfx::window::{MockWindowFactory, Props, WindowSystem};
///
/// let system = WindowSystem::new();
/// let factory = Arc::new(MockWindowFactory::new());
/// let (window, canvas) = system.open(Props::default(), factory).unwrap();
/// window.close();
/// system.run(); // returns once the last window closes
/// # let _ = canvas;
/// ```
pub struct WindowSystem {
    main_tx: Sender<MainOp>,
    main_rx: Receiver<MainOp>,
    open_windows: Arc<AtomicUsize>,
}

impl WindowSystem {
    pub fn new() -> Self {
        let (main_tx, main_rx) = unbounded();
        Self {
            main_tx,
            main_rx,
            open_windows: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Sender for routing work to this system's thread
    pub fn sender(&self) -> Sender<MainOp> {
        self.main_tx.clone()
    }

    /// Number of windows currently open
    pub fn window_count(&self) -> usize {
        self.open_windows.load(Ordering::SeqCst)
    }

    /// Open a window managed by this system
    pub fn open(
        &self,
        props: Props,
        factory: Arc<dyn WindowFactory>,
    ) -> Result<(Arc<Window>, Swapper)> {
        Window::open(
            props,
            factory,
            self.main_tx.clone(),
            self.open_windows.clone(),
        )
    }

    /// Run the window-system loop until the last window closes
    pub fn run(&self) {
        while let Ok(op) = self.main_rx.recv() {
            match op {
                MainOp::Exec(f) => f(),
                MainOp::Terminate => return,
            }
        }
    }

    /// Drain currently queued ops without blocking
    ///
    /// Returns true when the terminate op was processed.
    pub fn run_pending(&self) -> bool {
        while let Ok(op) = self.main_rx.try_recv() {
            match op {
                MainOp::Exec(f) => f(),
                MainOp::Terminate => return true,
            }
        }
        false
    }
}

impl Default for WindowSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
