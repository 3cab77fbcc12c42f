//! GlBackend trait - the GPU call surface
//!
//! This is the platform-agnostic seam between the device and a concrete
//! OpenGL-style context. Every method is a thin, synchronous GPU call;
//! all sequencing, batching, and thread confinement happen above this
//! trait in the device. Backends must be `Send + Sync` because GPU
//! handles travel between the render thread and resource drop sites,
//! but every method is only ever invoked from the single thread that
//! drains the device's command queue.

use crate::types::{Color, FaceCullMode, Precision, Rect};
use super::formats::{DsFormat, TexFormat};

// ============================================================================
// Handles
// ============================================================================

/// GPU buffer object handle
pub type BufferId = u32;

/// Linked shader program handle
pub type ProgramId = u32;

/// Texture object handle
pub type TextureId = u32;

/// Framebuffer object handle (0 is the window surface)
pub type FramebufferId = u32;

/// Renderbuffer object handle
pub type RenderbufferId = u32;

/// Occlusion query object handle
pub type QueryId = u32;

/// GPU-side buffers backing one mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshBuffers {
    pub vbo: BufferId,
    pub ibo: Option<BufferId>,
    pub vertex_count: u32,
    pub index_count: u32,
}

impl MeshBuffers {
    /// All buffer handles owned by this mesh, for batched deletion
    pub fn buffer_ids(&self) -> Vec<BufferId> {
        let mut ids = vec![self.vbo];
        if let Some(ibo) = self.ibo {
            ids.push(ibo);
        }
        ids
    }
}

// ============================================================================
// Clear / Attachment / Status
// ============================================================================

bitflags::bitflags! {
    /// Buffers affected by a clear call
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearMask: u32 {
        const COLOR = 1 << 0;
        const DEPTH = 1 << 1;
        const STENCIL = 1 << 2;
    }
}

/// Framebuffer attachment point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attachment {
    Color,
    Depth,
    Stencil,
}

/// Severity of a driver debug message
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DebugSeverity {
    Notification,
    Low,
    Medium,
    High,
}

/// A diagnostic message emitted by the driver
///
/// Informational only; a debug message never changes what the device
/// does next.
#[derive(Debug, Clone)]
pub struct DebugMessage {
    pub severity: DebugSeverity,
    pub message: String,
}

/// Receives driver debug messages; may be invoked from any thread
pub type DebugSink = Box<dyn Fn(DebugMessage) + Send + Sync>;

/// Completeness of the currently bound framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramebufferStatus {
    /// Usable as a render target
    Complete,

    /// Valid configuration the implementation cannot render to;
    /// callers fall back gracefully
    Unsupported,

    /// Misconfigured framebuffer with the raw status code; always a
    /// programming error in the creation protocol
    Incomplete(u32),
}

// ============================================================================
// Capabilities
// ============================================================================

/// Render-to-texture formats a backend can attach
#[derive(Debug, Clone, Default)]
pub struct RttFormatCaps {
    pub color: Vec<TexFormat>,
    pub depth: Vec<DsFormat>,
    pub stencil: Vec<DsFormat>,
    pub max_samples: u32,
}

/// Capabilities probed from a backend at device creation
#[derive(Debug, Clone)]
pub struct BackendCaps {
    /// Renderer string reported by the driver
    pub renderer: String,

    /// Vendor string reported by the driver
    pub vendor: String,

    /// Whether off-screen framebuffer objects are available
    pub framebuffer_object: bool,

    /// Whether hardware occlusion queries are available
    pub occlusion_query: bool,

    /// Bit width of occlusion query sample counters
    pub occlusion_query_bits: u32,

    /// Largest supported texture dimension
    pub max_texture_size: u32,

    /// Non-power-of-two texture support
    pub npot: bool,

    /// Depth clamping support
    pub depth_clamp: bool,

    /// Alpha-to-coverage support
    pub alpha_to_coverage: bool,

    /// Precision of the default framebuffer
    pub precision: Precision,

    /// Initial drawable bounds of the context
    pub viewport: Rect,

    /// Off-screen attachment formats
    pub rtt: RttFormatCaps,
}

impl Default for BackendCaps {
    fn default() -> Self {
        Self {
            renderer: String::new(),
            vendor: String::new(),
            framebuffer_object: false,
            occlusion_query: false,
            occlusion_query_bits: 0,
            max_texture_size: 1024,
            npot: false,
            depth_clamp: false,
            alpha_to_coverage: false,
            precision: Precision::default(),
            viewport: Rect::new(0, 0, 640, 480),
            rtt: RttFormatCaps::default(),
        }
    }
}

// ============================================================================
// The backend trait
// ============================================================================

/// Synchronous GPU call surface implemented per context
///
/// Backend implementations (a real GL context, the recording mock) provide
/// concrete GPU behavior; the device provides all ordering guarantees.
pub trait GlBackend: Send + Sync {
    /// Probe driver capabilities
    fn capabilities(&self) -> BackendCaps;

    /// Install the sink for driver debug messages
    ///
    /// Replaces any previously installed sink. Backends without a debug
    /// extension may never invoke it.
    fn set_debug_output(&self, sink: DebugSink);

    // ===== Raster state =====

    /// Set the scissor rectangle (already clamped by the device)
    fn set_scissor(&self, rect: Rect);

    /// Set the color channel write mask
    fn set_color_write(&self, r: bool, g: bool, b: bool, a: bool);

    /// Enable or disable depth writes
    fn set_depth_write(&self, write: bool);

    /// Set front and back stencil write masks
    fn set_stencil_mask(&self, front: u32, back: u32);

    /// Set the face culling mode
    fn set_face_culling(&self, mode: FaceCullMode);

    // ===== Clears =====

    fn set_clear_color(&self, color: Color);
    fn set_clear_depth(&self, depth: f64);
    fn set_clear_stencil(&self, stencil: i32);

    /// Clear the buffers selected by `mask` inside the scissor rectangle
    fn clear(&self, mask: ClearMask);

    /// Flush the command stream to the driver
    fn flush(&self);

    // ===== Meshes =====

    /// Upload vertex bytes (and optional indices) into fresh GPU buffers
    fn upload_mesh(&self, vertices: &[u8], vertex_count: u32, indices: &[u32]) -> MeshBuffers;

    /// Draw one uploaded mesh with the currently bound program
    fn draw_mesh(&self, mesh: &MeshBuffers);

    /// Delete a batch of buffer objects
    fn delete_buffers(&self, ids: &[BufferId]);

    // ===== Shaders =====

    /// Compile and link a program; Err carries the driver's info log
    fn compile_program(
        &self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> std::result::Result<ProgramId, String>;

    /// Bind a program for drawing
    fn bind_program(&self, id: ProgramId);

    /// Upload the model-view-projection matrix for the bound program
    fn set_mvp(&self, id: ProgramId, mvp: &[f32; 16]);

    /// Delete a linked program
    fn delete_program(&self, id: ProgramId);

    // ===== Textures =====

    /// Allocate a color texture with undefined contents
    fn create_texture(&self, format: TexFormat, width: u32, height: u32) -> TextureId;

    /// Allocate a depth (or combined depth/stencil) texture
    fn create_ds_texture(&self, format: DsFormat, width: u32, height: u32) -> TextureId;

    /// Upload pixel data into a texture
    fn upload_texture(
        &self,
        id: TextureId,
        format: TexFormat,
        width: u32,
        height: u32,
        pixels: &[u8],
    );

    /// Bind a texture to a sampling unit
    fn bind_texture(&self, id: TextureId, unit: u32);

    /// Generate the mipmap chain for a texture
    fn generate_mipmap(&self, id: TextureId);

    /// Delete a batch of textures
    fn delete_textures(&self, ids: &[TextureId]);

    // ===== Framebuffers / renderbuffers =====

    fn gen_framebuffer(&self) -> FramebufferId;

    /// Bind a framebuffer; 0 restores the window surface
    fn bind_framebuffer(&self, id: FramebufferId);

    fn delete_framebuffers(&self, ids: &[FramebufferId]);

    fn create_color_renderbuffer(
        &self,
        format: TexFormat,
        samples: u32,
        width: u32,
        height: u32,
    ) -> RenderbufferId;

    fn create_ds_renderbuffer(
        &self,
        format: DsFormat,
        samples: u32,
        width: u32,
        height: u32,
    ) -> RenderbufferId;

    /// Attach a renderbuffer to the bound framebuffer
    fn attach_renderbuffer(&self, attachment: Attachment, id: RenderbufferId);

    /// Attach a texture to the bound framebuffer
    fn attach_texture(&self, attachment: Attachment, id: TextureId);

    /// Query completeness of the bound framebuffer
    fn check_framebuffer_status(&self) -> FramebufferStatus;

    fn delete_renderbuffers(&self, ids: &[RenderbufferId]);

    // ===== Occlusion queries =====

    fn gen_query(&self) -> QueryId;
    fn begin_query(&self, id: QueryId);
    fn end_query(&self, id: QueryId);

    /// Whether the query result can be read without blocking
    fn query_result_available(&self, id: QueryId) -> bool;

    /// Read the sample count of a finished query
    fn query_result(&self, id: QueryId) -> u32;

    fn delete_query(&self, id: QueryId);

    // ===== Downloads =====

    /// Read back RGBA pixels from the bound target (bottom-up rows)
    fn read_pixels(&self, rect: Rect) -> Vec<u8>;
}
