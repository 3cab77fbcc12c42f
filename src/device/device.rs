//! Device - a GPU rendering device driving one command queue
//!
//! A `Device` wraps a `GlBackend` with everything the backend itself
//! must not know about: the bounded command queue, deferred resource
//! reclamation, occlusion query tracking, the frame clock, and the
//! scissor/bounds bookkeeping that makes render-to-texture canvases and
//! the window surface share one call path.
//!
//! `Device` is a cheap handle (`Clone` shares the same device). Any
//! thread may enqueue work; exactly one consumer drains `exec()` and
//! becomes the render thread.

use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::Duration;

use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use rustc_hash::FxHashSet;

use crate::backend::{DebugSeverity, DsFormat, GlBackend, TexFormat};
use crate::camera::Camera;
use crate::canvas::{Canvas, CanvasCapabilities, CanvasState};
use crate::clock::Clock;
use crate::resource::object::PreDraw;
use crate::resource::{NativeMesh, NativeShader, NativeTexture, Object};
use crate::types::{Color, ImageData, Precision, Rect};
use super::exec::{CommandExecutor, RenderOp};
use super::info::DeviceInfo;
use super::queries::QueryTracker;
use super::reclaim::ResourceManager;
use super::rtt::RttCanvasShared;

const LOG_SOURCE: &str = "quasar::Device";

/// A closure run on the render thread inside another operation
///
/// Render-to-texture canvases use hooks to bind their framebuffer
/// around the shared clear/draw/render implementations.
pub(crate) type Hook = Box<dyn FnOnce() + Send>;

/// Tunables for device creation
pub struct DeviceConfig {
    /// How often the idle thread enqueues a reclaim/poll operation
    pub idle_reclaim_interval: Duration,

    /// Device whose resources (shaders, textures) this one may use
    pub shared: Option<Device>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            idle_reclaim_interval: Duration::from_millis(200),
            shared: None,
        }
    }
}

/// A rendering device
#[derive(Clone)]
pub struct Device {
    pub(crate) inner: Arc<DeviceInner>,
}

pub(crate) struct DeviceInner {
    pub(crate) backend: Arc<dyn GlBackend>,
    pub(crate) canvas: CanvasState,
    pub(crate) info: DeviceInfo,
    pub(crate) clock: Clock,
    pub(crate) exec: CommandExecutor,
    pub(crate) resources: Arc<ResourceManager>,
    pub(crate) queries: Arc<QueryTracker>,

    /// Formats `render_to_texture` accepts, probed once
    pub(crate) rtt_color: FxHashSet<TexFormat>,
    pub(crate) rtt_depth: FxHashSet<DsFormat>,
    pub(crate) rtt_stencil: FxHashSet<DsFormat>,

    /// Canvas currently bound on the render thread, if any
    pub(crate) rtt_bound: Mutex<Option<Arc<RttCanvasShared>>>,

    shared: RwLock<Option<Device>>,
    idle_exit: Sender<()>,
}

impl Drop for DeviceInner {
    fn drop(&mut self) {
        let _ = self.idle_exit.try_send(());
    }
}

impl DeviceInner {
    /// Bounds of whatever target is bound right now
    pub(crate) fn current_bounds(&self) -> Rect {
        match &*self.rtt_bound.lock().unwrap() {
            Some(canvas) => canvas.bounds(),
            None => self.canvas.bounds(),
        }
    }

    /// Clamp `rect` to the bound target and apply it as the scissor
    pub(crate) fn perform_scissor(&self, rect: Rect) {
        self.backend.set_scissor(rect.intersect(self.current_bounds()));
    }
}

impl Device {
    /// Create a device over `backend` with default configuration
    pub fn new(backend: Arc<dyn GlBackend>) -> Device {
        Self::with_config(backend, DeviceConfig::default())
    }

    /// Create a device with explicit configuration
    pub fn with_config(backend: Arc<dyn GlBackend>, config: DeviceConfig) -> Device {
        let caps = backend.capabilities();
        let info = DeviceInfo::from_caps(&caps);
        let canvas = CanvasState::new(caps.viewport, caps.precision);
        let exec = CommandExecutor::new();
        let resources = Arc::new(ResourceManager::new());
        let queries = Arc::new(QueryTracker::new(caps.occlusion_query));

        // Initial raster state: scissor open to the full drawable.
        backend.set_scissor(caps.viewport);

        // Driver diagnostics go to the log and nowhere else.
        backend.set_debug_output(Box::new(|msg| match msg.severity {
            DebugSeverity::High => {
                crate::engine_warn!(LOG_SOURCE, "driver: {}", msg.message);
            }
            _ => {
                crate::engine_debug!(LOG_SOURCE, "driver: {}", msg.message);
            }
        }));

        let (idle_exit_tx, idle_exit_rx) = bounded(1);
        Self::spawn_idle_reclaim(
            exec.clone(),
            resources.clone(),
            queries.clone(),
            backend.clone(),
            config.idle_reclaim_interval,
            idle_exit_rx,
        );

        crate::engine_info!(
            LOG_SOURCE,
            "Device created: {} ({})",
            info.name,
            info.vendor
        );

        Device {
            inner: Arc::new(DeviceInner {
                backend,
                canvas,
                info,
                clock: Clock::new(),
                exec,
                resources,
                queries,
                rtt_color: caps.rtt.color.iter().copied().collect(),
                rtt_depth: caps.rtt.depth.iter().copied().collect(),
                rtt_stencil: caps.rtt.stencil.iter().copied().collect(),
                rtt_bound: Mutex::new(None),
                shared: RwLock::new(config.shared),
                idle_exit: idle_exit_tx,
            }),
        }
    }

    /// Periodically reclaims resources while the application is not
    /// rendering. Uses `try_submit`: when the queue is full the render
    /// path is active anyway and frame completion will reclaim.
    fn spawn_idle_reclaim(
        exec: CommandExecutor,
        resources: Arc<ResourceManager>,
        queries: Arc<QueryTracker>,
        backend: Arc<dyn GlBackend>,
        interval: Duration,
        exit: Receiver<()>,
    ) {
        let _ = thread::Builder::new()
            .name("quasar-device-idle".to_string())
            .spawn(move || {
                let ticker = tick(interval);
                loop {
                    select! {
                        recv(ticker) -> _ => {
                            let resources = resources.clone();
                            let queries = queries.clone();
                            let backend = backend.clone();
                            let op: RenderOp = Box::new(move || {
                                resources.reclaim(backend.as_ref());
                                queries.poll(backend.as_ref());
                                false
                            });
                            let _ = exec.try_submit(op);
                        }
                        recv(exit) -> _ => return,
                    }
                }
            });
    }

    // ===== Accessors =====

    /// Immutable facts about this device
    pub fn info(&self) -> &DeviceInfo {
        &self.inner.info
    }

    /// Frame clock; ticks once per presented frame
    pub fn clock(&self) -> &Clock {
        &self.inner.clock
    }

    /// Deferred-reclamation queues of this device
    pub fn resources(&self) -> &Arc<ResourceManager> {
        &self.inner.resources
    }

    /// Consumer endpoint of the command queue
    ///
    /// Exactly one thread should drain this; it becomes the render
    /// thread. An operation returning `true` requests a buffer swap.
    pub fn exec(&self) -> Receiver<RenderOp> {
        self.inner.exec.receiver()
    }

    /// Number of operations waiting in the queue
    pub fn queued_ops(&self) -> usize {
        self.inner.exec.len()
    }

    /// Device this one shares GPU objects with, if any
    pub fn shared(&self) -> Option<Device> {
        self.inner.shared.read().unwrap().clone()
    }

    /// Update the drawable bounds (window framebuffer resize)
    pub fn update_bounds(&self, bounds: Rect) {
        self.inner.canvas.set_bounds(bounds);
    }

    /// Stop the idle reclaim thread
    ///
    /// Called by the window controller during teardown; also happens
    /// automatically when the last handle drops.
    pub fn destroy(&self) {
        let _ = self.inner.idle_exit.try_send(());
    }

    // ===== Hooked operations =====
    //
    // The hooked_* methods carry optional pre/post hooks that run on
    // the render thread around the operation body. The window canvas
    // passes no hooks; RTT canvases bind and unbind their framebuffer
    // there.

    pub(crate) fn hooked_clear(
        &self,
        rect: Rect,
        color: Color,
        pre: Option<Hook>,
        post: Option<Hook>,
    ) {
        if rect.is_empty() {
            return;
        }
        let inner = self.inner.clone();
        self.inner.exec.submit(move || {
            if let Some(pre) = pre {
                pre();
            }
            let backend = inner.backend.as_ref();
            backend.set_color_write(true, true, true, true);
            inner.perform_scissor(rect);
            backend.set_clear_color(color);
            backend.clear(crate::backend::ClearMask::COLOR);
            inner.queries.poll(backend);
            if let Some(post) = post {
                post();
            }
            false
        });
    }

    pub(crate) fn hooked_clear_depth(
        &self,
        rect: Rect,
        depth: f64,
        pre: Option<Hook>,
        post: Option<Hook>,
    ) {
        if rect.is_empty() {
            return;
        }
        let inner = self.inner.clone();
        self.inner.exec.submit(move || {
            if let Some(pre) = pre {
                pre();
            }
            let backend = inner.backend.as_ref();
            backend.set_depth_write(true);
            inner.perform_scissor(rect);
            backend.set_clear_depth(depth);
            backend.clear(crate::backend::ClearMask::DEPTH);
            inner.queries.poll(backend);
            if let Some(post) = post {
                post();
            }
            false
        });
    }

    pub(crate) fn hooked_clear_stencil(
        &self,
        rect: Rect,
        stencil: i32,
        pre: Option<Hook>,
        post: Option<Hook>,
    ) {
        if rect.is_empty() {
            return;
        }
        let inner = self.inner.clone();
        self.inner.exec.submit(move || {
            if let Some(pre) = pre {
                pre();
            }
            let backend = inner.backend.as_ref();
            backend.set_stencil_mask(0xFFFF, 0xFFFF);
            inner.perform_scissor(rect);
            backend.set_clear_stencil(stencil);
            backend.clear(crate::backend::ClearMask::STENCIL);
            inner.queries.poll(backend);
            if let Some(post) = post {
                post();
            }
            false
        });
    }

    pub(crate) fn hooked_draw(
        &self,
        rect: Rect,
        o: &Object,
        camera: &Camera,
        pre: Option<Hook>,
        post: Option<Hook>,
    ) {
        match o.predraw(rect) {
            PreDraw::Skip => return,
            PreDraw::Reject(err) => {
                crate::engine_warn!(LOG_SOURCE, "draw skipped: {}", err);
                return;
            }
            PreDraw::Proceed => {}
        }
        let loaded = match self.load_object(o) {
            Ok(loaded) => loaded,
            Err(err) => {
                crate::engine_warn!(LOG_SOURCE, "draw skipped: {}", err);
                return;
            }
        };

        let state = match o.state {
            Some(state) => state,
            None => return,
        };
        let mvp = (camera.view_projection() * o.transform).to_cols_array();
        let occlusion = o.occlusion_test && self.inner.queries.enabled();
        let samples = o.samples_cell();
        let inner = self.inner.clone();
        self.inner.exec.submit(move || {
            if let Some(pre) = pre {
                pre();
            }
            let backend = inner.backend.as_ref();
            backend.set_face_culling(state.face_culling);
            backend.set_depth_write(state.depth_write);
            inner.perform_scissor(rect);

            let program = loaded.shader.program;
            backend.bind_program(program);
            backend.set_mvp(program, &mvp);
            for (unit, texture) in loaded.textures.iter().enumerate() {
                backend.bind_texture(texture.id, unit as u32);
            }

            let query = if occlusion {
                let id = backend.gen_query();
                backend.begin_query(id);
                Some(id)
            } else {
                None
            };
            for mesh in &loaded.meshes {
                backend.draw_mesh(&mesh.buffers);
            }
            if let Some(id) = query {
                backend.end_query(id);
                inner.queries.insert(id, samples);
            }
            inner.queries.poll(backend);
            if let Some(post) = post {
                post();
            }
            false
        });
    }

    pub(crate) fn hooked_query_wait(&self, pre: Option<Hook>, post: Option<Hook>) {
        let (tx, rx) = bounded(1);
        let inner = self.inner.clone();
        self.inner.exec.submit(move || {
            if let Some(pre) = pre {
                pre();
            }
            inner.backend.flush();
            inner.queries.wait(inner.backend.as_ref());
            if let Some(post) = post {
                post();
            }
            let _ = tx.send(());
            false
        });
        let _ = rx.recv();
    }

    /// Frame completion; see `Canvas::render`
    pub(crate) fn hooked_render(&self, pre: Option<Hook>, post: Option<Hook>) -> bool {
        let (tx, rx) = bounded(1);
        let inner = self.inner.clone();
        self.inner.exec.submit(move || {
            // Reclamation first: a frame boundary is the natural point
            // to return GPU memory.
            inner.resources.reclaim(inner.backend.as_ref());
            if let Some(pre) = pre {
                pre();
            }
            inner.exec.drain_queued();
            inner.backend.flush();
            inner.queries.wait(inner.backend.as_ref());

            // Presentation is decided while the RTT canvas (if any) is
            // still bound; the post hook unbinds it.
            let presented = inner.rtt_bound.lock().unwrap().is_none();
            if let Some(post) = post {
                post();
            }
            if presented {
                inner.clock.tick();
            }
            let _ = tx.send(presented);
            presented
        });
        rx.recv().unwrap_or(false)
    }

    pub(crate) fn hooked_download(
        &self,
        rect: Rect,
        completion: Sender<Option<ImageData>>,
        pre: Option<Hook>,
        post: Option<Hook>,
    ) {
        let inner = self.inner.clone();
        self.inner.exec.submit(move || {
            if let Some(pre) = pre {
                pre();
            }
            let clamped = rect.intersect(inner.current_bounds());
            let result = if clamped.is_empty() {
                None
            } else {
                let rgba = inner.backend.read_pixels(clamped);
                Some(ImageData::new(clamped.width, clamped.height, rgba))
            };
            let _ = completion.send(result);
            if let Some(post) = post {
                post();
            }
            false
        });
    }

    // ===== Resource loading =====

    /// Upload everything `o` needs, blocking on the render thread
    ///
    /// Shaders, changed meshes, and unloaded textures round-trip through
    /// the command queue one by one; already loaded resources are
    /// reused as-is.
    fn load_object(&self, o: &Object) -> Result<LoadedObject, crate::resource::DrawError> {
        use crate::resource::DrawError;

        let shader = match o.shader.as_ref() {
            Some(shader) => shader,
            None => return Err(DrawError::NilShader),
        };
        if !shader.loaded() {
            let vs = shader.vertex_source.clone();
            let fs = shader.fragment_source.clone();
            let backend = self.inner.backend.clone();
            let resources = self.inner.resources.clone();
            let (tx, rx) = bounded(1);
            self.inner.exec.submit(move || {
                let result = backend
                    .compile_program(&vs, &fs)
                    .map(|program| Arc::new(NativeShader::new(program, resources)));
                let _ = tx.send(result);
                false
            });
            match rx.recv() {
                Ok(Ok(native)) => shader.set_native(native),
                Ok(Err(log)) => {
                    crate::engine_warn!(
                        LOG_SOURCE,
                        "shader \"{}\" failed to compile: {}",
                        shader.name,
                        log
                    );
                    shader.set_error(log);
                    return Err(DrawError::ShaderError);
                }
                Err(_) => return Err(DrawError::ShaderError),
            }
        }

        for mesh in &o.meshes {
            if mesh.loaded() && !mesh.changed() {
                continue;
            }
            if mesh.vertices.is_empty() {
                return Err(DrawError::NoVertices);
            }
            let bytes: Vec<u8> = bytemuck::cast_slice(&mesh.vertices).to_vec();
            let vertex_count = mesh.vertices.len() as u32;
            let indices = mesh.indices.clone();
            let backend = self.inner.backend.clone();
            let resources = self.inner.resources.clone();
            let (tx, rx) = bounded(1);
            self.inner.exec.submit(move || {
                let buffers = backend.upload_mesh(&bytes, vertex_count, &indices);
                let _ = tx.send(Arc::new(NativeMesh::new(buffers, resources)));
                false
            });
            if let Ok(native) = rx.recv() {
                mesh.set_native(native);
            }
        }

        for texture in &o.textures {
            if texture.loaded() {
                continue;
            }
            let source = match texture.take_source() {
                Some(source) => source,
                None => return Err(DrawError::NilSource),
            };
            texture.set_bounds(Rect::new(0, 0, source.width, source.height));
            let format = texture.format;
            let mipmapped = texture.mipmapped;
            let backend = self.inner.backend.clone();
            let resources = self.inner.resources.clone();
            let (tx, rx) = bounded(1);
            self.inner.exec.submit(move || {
                let id = backend.create_texture(format, source.width, source.height);
                backend.upload_texture(id, format, source.width, source.height, &source.rgba);
                if mipmapped {
                    backend.generate_mipmap(id);
                }
                let _ = tx.send(Arc::new(NativeTexture::new(id, resources)));
                false
            });
            if let Ok(native) = rx.recv() {
                texture.set_native(native);
            }
        }

        let native_shader = match shader.native() {
            Some(native) => native,
            None => return Err(DrawError::ShaderError),
        };
        Ok(LoadedObject {
            shader: native_shader,
            meshes: o.meshes.iter().filter_map(|m| m.native()).collect(),
            textures: o.textures.iter().filter_map(|t| t.native()).collect(),
        })
    }
}

/// Natives gathered for one draw, kept alive until the op runs
struct LoadedObject {
    shader: Arc<NativeShader>,
    meshes: Vec<Arc<NativeMesh>>,
    textures: Vec<Arc<NativeTexture>>,
}

// ============================================================================
// Canvas implementation (the window surface)
// ============================================================================

impl Canvas for Device {
    fn bounds(&self) -> Rect {
        self.inner.canvas.bounds()
    }

    fn precision(&self) -> Precision {
        self.inner.canvas.precision()
    }

    fn msaa(&self) -> bool {
        self.inner.canvas.msaa()
    }

    fn set_msaa(&self, msaa: bool) {
        self.inner.canvas.set_msaa(msaa);
    }

    fn capabilities(&self) -> CanvasCapabilities {
        let mut caps = CanvasCapabilities::DOWNLOAD;
        if self.inner.info.occlusion_query {
            caps |= CanvasCapabilities::OCCLUSION_QUERY;
        }
        caps
    }

    fn clear(&self, rect: Rect, color: Color) {
        self.hooked_clear(rect, color, None, None);
    }

    fn clear_depth(&self, rect: Rect, depth: f64) {
        self.hooked_clear_depth(rect, depth, None, None);
    }

    fn clear_stencil(&self, rect: Rect, stencil: i32) {
        self.hooked_clear_stencil(rect, stencil, None, None);
    }

    fn draw(&self, rect: Rect, object: &Object, camera: &Camera) {
        self.hooked_draw(rect, object, camera, None, None);
    }

    fn query_wait(&self) {
        self.hooked_query_wait(None, None);
    }

    fn render(&self) -> bool {
        self.hooked_render(None, None)
    }

    fn download(&self, rect: Rect, completion: Sender<Option<ImageData>>) {
        self.hooked_download(rect, completion, None, None);
    }
}

#[cfg(test)]
#[path = "device_tests.rs"]
mod tests;
