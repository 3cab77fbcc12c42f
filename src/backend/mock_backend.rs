/// Mock GlBackend for unit tests (no GPU required)
///
/// Records every call as a string, hands out sequential handles, and
/// lets tests script driver behavior: capability flags, framebuffer
/// completeness, occlusion query latency and results, and shader
/// compile failures.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use rustc_hash::FxHashMap;

use crate::types::{Color, FaceCullMode, Precision, Rect};
use super::formats::{DsFormat, TexFormat};
use super::gl_backend::{
    Attachment, BackendCaps, BufferId, ClearMask, DebugMessage, DebugSeverity, DebugSink,
    FramebufferId, FramebufferStatus, GlBackend, MeshBuffers, ProgramId, QueryId, RenderbufferId,
    RttFormatCaps, TextureId,
};

/// A recording backend with scriptable behavior
pub struct MockGlBackend {
    caps: BackendCaps,
    calls: Mutex<Vec<String>>,
    next_id: AtomicU32,

    /// How many availability polls a query needs before it resolves
    query_latency: u32,
    query_polls: Mutex<FxHashMap<QueryId, u32>>,
    query_result: AtomicU32,

    fb_status: Mutex<FramebufferStatus>,
    compile_error: Mutex<Option<String>>,
    debug_sink: Mutex<Option<DebugSink>>,
}

impl MockGlBackend {
    /// Create a mock with every capability enabled
    pub fn new() -> Self {
        Self {
            caps: Self::full_caps(),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU32::new(1),
            query_latency: 0,
            query_polls: Mutex::new(FxHashMap::default()),
            query_result: AtomicU32::new(100),
            fb_status: Mutex::new(FramebufferStatus::Complete),
            compile_error: Mutex::new(None),
            debug_sink: Mutex::new(None),
        }
    }

    /// Capabilities of a well-equipped desktop driver
    pub fn full_caps() -> BackendCaps {
        BackendCaps {
            renderer: "MockGL".to_string(),
            vendor: "Quasar".to_string(),
            framebuffer_object: true,
            occlusion_query: true,
            occlusion_query_bits: 32,
            max_texture_size: 8192,
            npot: true,
            depth_clamp: true,
            alpha_to_coverage: true,
            precision: Precision {
                red_bits: 8,
                green_bits: 8,
                blue_bits: 8,
                alpha_bits: 8,
                depth_bits: 24,
                stencil_bits: 8,
                samples: 0,
            },
            viewport: Rect::new(0, 0, 800, 600),
            rtt: RttFormatCaps {
                color: vec![TexFormat::Rgb, TexFormat::Rgba],
                depth: vec![DsFormat::Depth16, DsFormat::Depth24, DsFormat::Depth24Stencil8],
                stencil: vec![DsFormat::Depth24Stencil8],
                max_samples: 4,
            },
        }
    }

    /// Replace the capability set
    pub fn with_caps(mut self, caps: BackendCaps) -> Self {
        self.caps = caps;
        self
    }

    /// Disable framebuffer object support
    pub fn without_framebuffer_object(mut self) -> Self {
        self.caps.framebuffer_object = false;
        self
    }

    /// Disable occlusion query support
    pub fn without_occlusion_query(mut self) -> Self {
        self.caps.occlusion_query = false;
        self.caps.occlusion_query_bits = 0;
        self
    }

    /// Make each query need `polls` availability checks before resolving
    pub fn with_query_latency(mut self, polls: u32) -> Self {
        self.query_latency = polls;
        self
    }

    /// Script the sample count every finished query reports
    pub fn set_query_result(&self, samples: u32) {
        self.query_result.store(samples, Ordering::SeqCst);
    }

    /// Script the framebuffer completeness status
    pub fn with_fb_status(self, status: FramebufferStatus) -> Self {
        *self.fb_status.lock().unwrap() = status;
        self
    }

    /// Make the next program compilation fail with `message`
    pub fn fail_next_compile(&self, message: &str) {
        *self.compile_error.lock().unwrap() = Some(message.to_string());
    }

    /// Deliver a driver debug message to the installed sink
    pub fn emit_debug(&self, severity: DebugSeverity, message: &str) {
        if let Some(sink) = &*self.debug_sink.lock().unwrap() {
            sink(DebugMessage {
                severity,
                message: message.to_string(),
            });
        }
    }

    // ===== Recording helpers =====

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

    fn alloc_id(&self) -> u32 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for MockGlBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl GlBackend for MockGlBackend {
    fn capabilities(&self) -> BackendCaps {
        self.caps.clone()
    }

    fn set_debug_output(&self, sink: DebugSink) {
        self.record("set_debug_output".to_string());
        *self.debug_sink.lock().unwrap() = Some(sink);
    }

    fn set_scissor(&self, rect: Rect) {
        self.record(format!("set_scissor({})", rect));
    }

    fn set_color_write(&self, r: bool, g: bool, b: bool, a: bool) {
        self.record(format!("set_color_write({}, {}, {}, {})", r, g, b, a));
    }

    fn set_depth_write(&self, write: bool) {
        self.record(format!("set_depth_write({})", write));
    }

    fn set_stencil_mask(&self, front: u32, back: u32) {
        self.record(format!("set_stencil_mask({:#x}, {:#x})", front, back));
    }

    fn set_face_culling(&self, mode: FaceCullMode) {
        self.record(format!("set_face_culling({})", mode));
    }

    fn set_clear_color(&self, color: Color) {
        self.record(format!(
            "set_clear_color({}, {}, {}, {})",
            color.r, color.g, color.b, color.a
        ));
    }

    fn set_clear_depth(&self, depth: f64) {
        self.record(format!("set_clear_depth({})", depth));
    }

    fn set_clear_stencil(&self, stencil: i32) {
        self.record(format!("set_clear_stencil({})", stencil));
    }

    fn clear(&self, mask: ClearMask) {
        self.record(format!("clear({:?})", mask));
    }

    fn flush(&self) {
        self.record("flush".to_string());
    }

    fn upload_mesh(&self, vertices: &[u8], vertex_count: u32, indices: &[u32]) -> MeshBuffers {
        let vbo = self.alloc_id();
        let ibo = if indices.is_empty() {
            None
        } else {
            Some(self.alloc_id())
        };
        self.record(format!(
            "upload_mesh(bytes={}, vertices={}, indices={})",
            vertices.len(),
            vertex_count,
            indices.len()
        ));
        MeshBuffers {
            vbo,
            ibo,
            vertex_count,
            index_count: indices.len() as u32,
        }
    }

    fn draw_mesh(&self, mesh: &MeshBuffers) {
        self.record(format!("draw_mesh(vbo={})", mesh.vbo));
    }

    fn delete_buffers(&self, ids: &[BufferId]) {
        self.record(format!("delete_buffers({:?})", ids));
    }

    fn compile_program(
        &self,
        _vertex_source: &str,
        _fragment_source: &str,
    ) -> std::result::Result<ProgramId, String> {
        if let Some(err) = self.compile_error.lock().unwrap().take() {
            self.record(format!("compile_program -> error({})", err));
            return Err(err);
        }
        let id = self.alloc_id();
        self.record(format!("compile_program -> {}", id));
        Ok(id)
    }

    fn bind_program(&self, id: ProgramId) {
        self.record(format!("bind_program({})", id));
    }

    fn set_mvp(&self, id: ProgramId, _mvp: &[f32; 16]) {
        self.record(format!("set_mvp({})", id));
    }

    fn delete_program(&self, id: ProgramId) {
        self.record(format!("delete_program({})", id));
    }

    fn create_texture(&self, format: TexFormat, width: u32, height: u32) -> TextureId {
        let id = self.alloc_id();
        self.record(format!(
            "create_texture({:?}, {}x{}) -> {}",
            format, width, height, id
        ));
        id
    }

    fn create_ds_texture(&self, format: DsFormat, width: u32, height: u32) -> TextureId {
        let id = self.alloc_id();
        self.record(format!(
            "create_ds_texture({:?}, {}x{}) -> {}",
            format, width, height, id
        ));
        id
    }

    fn upload_texture(
        &self,
        id: TextureId,
        format: TexFormat,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) {
        self.record(format!(
            "upload_texture({}, {:?}, {}x{}, bytes={})",
            id,
            format,
            width,
            height,
            pixels.len()
        ));
    }

    fn bind_texture(&self, id: TextureId, unit: u32) {
        self.record(format!("bind_texture({}, unit={})", id, unit));
    }

    fn generate_mipmap(&self, id: TextureId) {
        self.record(format!("generate_mipmap({})", id));
    }

    fn delete_textures(&self, ids: &[TextureId]) {
        self.record(format!("delete_textures({:?})", ids));
    }

    fn gen_framebuffer(&self) -> FramebufferId {
        let id = self.alloc_id();
        self.record(format!("gen_framebuffer -> {}", id));
        id
    }

    fn bind_framebuffer(&self, id: FramebufferId) {
        self.record(format!("bind_framebuffer({})", id));
    }

    fn delete_framebuffers(&self, ids: &[FramebufferId]) {
        self.record(format!("delete_framebuffers({:?})", ids));
    }

    fn create_color_renderbuffer(
        &self,
        format: TexFormat,
        samples: u32,
        width: u32,
        height: u32,
    ) -> RenderbufferId {
        let id = self.alloc_id();
        self.record(format!(
            "create_color_renderbuffer({:?}, samples={}, {}x{}) -> {}",
            format, samples, width, height, id
        ));
        id
    }

    fn create_ds_renderbuffer(
        &self,
        format: DsFormat,
        samples: u32,
        width: u32,
        height: u32,
    ) -> RenderbufferId {
        let id = self.alloc_id();
        self.record(format!(
            "create_ds_renderbuffer({:?}, samples={}, {}x{}) -> {}",
            format, samples, width, height, id
        ));
        id
    }

    fn attach_renderbuffer(&self, attachment: Attachment, id: RenderbufferId) {
        self.record(format!("attach_renderbuffer({:?}, {})", attachment, id));
    }

    fn attach_texture(&self, attachment: Attachment, id: TextureId) {
        self.record(format!("attach_texture({:?}, {})", attachment, id));
    }

    fn check_framebuffer_status(&self) -> FramebufferStatus {
        let status = *self.fb_status.lock().unwrap();
        self.record(format!("check_framebuffer_status -> {:?}", status));
        status
    }

    fn delete_renderbuffers(&self, ids: &[RenderbufferId]) {
        self.record(format!("delete_renderbuffers({:?})", ids));
    }

    fn gen_query(&self) -> QueryId {
        let id = self.alloc_id();
        self.record(format!("gen_query -> {}", id));
        self.query_polls
            .lock()
            .unwrap()
            .insert(id, self.query_latency);
        id
    }

    fn begin_query(&self, id: QueryId) {
        self.record(format!("begin_query({})", id));
    }

    fn end_query(&self, id: QueryId) {
        self.record(format!("end_query({})", id));
    }

    fn query_result_available(&self, id: QueryId) -> bool {
        self.record(format!("query_result_available({})", id));
        let mut polls = self.query_polls.lock().unwrap();
        match polls.get_mut(&id) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                false
            }
            _ => true,
        }
    }

    fn query_result(&self, id: QueryId) -> u32 {
        let samples = self.query_result.load(Ordering::SeqCst);
        self.record(format!("query_result({}) -> {}", id, samples));
        samples
    }

    fn delete_query(&self, id: QueryId) {
        self.record(format!("delete_query({})", id));
        self.query_polls.lock().unwrap().remove(&id);
    }

    fn read_pixels(&self, rect: Rect) -> Vec<u8> {
        self.record(format!("read_pixels({})", rect));
        vec![0u8; (rect.width * rect.height * 4) as usize]
    }
}

#[cfg(test)]
#[path = "mock_backend_tests.rs"]
mod tests;
