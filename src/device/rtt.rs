//! Render-to-texture canvases
//!
//! `Device::render_to_texture` builds an off-screen framebuffer whose
//! attachments are either renderbuffers (when the caller wants no
//! texture) or textures the caller will sample from later. The
//! resulting `RttCanvas` shares the device's clear/draw/render code
//! paths via hooks that bind its framebuffer on the render thread.
//!
//! Lifecycle: the canvas tracks how many of its texture destinations
//! are still alive. When the last one drops, the canvas becomes a
//! permanent no-op and its framebuffer and renderbuffers are handed to
//! the resource manager. Renderbuffer-only canvases release when the
//! canvas value itself drops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use crossbeam_channel::{bounded, Sender};

use crate::backend::{
    Attachment, DsFormat, FramebufferId, FramebufferStatus, RenderbufferId, TexFormat, TextureId,
};
use crate::camera::Camera;
use crate::canvas::{Canvas, CanvasCapabilities, CanvasState};
use crate::resource::{NativeTexture, Object, Texture};
use crate::types::{Color, ImageData, Precision, Rect};
use super::device::{Device, DeviceInner, Hook};

const LOG_SOURCE: &str = "quasar::RttCanvas";

/// Configuration for an off-screen canvas
///
/// At least one format must be set. A texture destination requires its
/// matching format; a format without a texture gets a renderbuffer.
pub struct RttConfig {
    /// Size of the off-screen canvas
    pub bounds: Rect,

    /// Texture destinations the application will sample from
    pub color: Option<Arc<Texture>>,
    pub depth: Option<Arc<Texture>>,
    pub stencil: Option<Arc<Texture>>,

    /// Storage formats per attachment; `None` omits the attachment
    pub color_format: Option<TexFormat>,
    pub depth_format: Option<DsFormat>,
    pub stencil_format: Option<DsFormat>,

    /// MSAA samples for renderbuffer attachments
    pub samples: u32,
}

impl Default for RttConfig {
    fn default() -> Self {
        Self {
            bounds: Rect::default(),
            color: None,
            depth: None,
            stencil: None,
            color_format: None,
            depth_format: None,
            stencil_format: None,
            samples: 0,
        }
    }
}

impl RttConfig {
    /// Whether this configuration is structurally usable
    pub fn valid(&self) -> bool {
        if self.bounds.is_empty() {
            return false;
        }
        if self.color_format.is_none()
            && self.depth_format.is_none()
            && self.stencil_format.is_none()
        {
            return false;
        }
        if self.color.is_some() && self.color_format.is_none() {
            return false;
        }
        if self.depth.is_some() && self.depth_format.is_none() {
            return false;
        }
        if self.stencil.is_some() && self.stencil_format.is_none() {
            return false;
        }
        true
    }

    /// Whether depth and stencil share one combined buffer
    fn combined_depth_stencil(&self) -> bool {
        match (self.depth_format, self.stencil_format) {
            (Some(depth), Some(stencil)) => depth == stencil && depth.is_combined(),
            _ => false,
        }
    }
}

/// GPU objects handed back by the creation operation
struct RttBuild {
    fbo: FramebufferId,
    renderbuffers: Vec<RenderbufferId>,
    tex_color: Option<TextureId>,
    tex_depth: Option<TextureId>,
    status: FramebufferStatus,
}

/// State shared between an `RttCanvas`, its texture natives, and the
/// device that has it bound
pub struct RttCanvasShared {
    device: Arc<DeviceInner>,
    canvas: CanvasState,
    fbo: FramebufferId,
    renderbuffers: Vec<RenderbufferId>,

    /// Texture destinations still alive; 0 for renderbuffer-only canvases
    live_textures: Mutex<u32>,
    released: AtomicBool,

    /// Mipmapped destinations to regenerate after each render
    mipmap_targets: Mutex<Vec<Weak<Texture>>>,
}

impl RttCanvasShared {
    pub(crate) fn bounds(&self) -> Rect {
        self.canvas.bounds()
    }

    /// Called from a texture native's drop
    pub(crate) fn release_texture(&self) {
        let last = {
            let mut live = self.live_textures.lock().unwrap();
            if *live == 0 {
                return;
            }
            *live -= 1;
            *live == 0
        };
        if last {
            self.release_native();
        }
    }

    /// Hand the framebuffer and renderbuffers to the resource manager
    ///
    /// Runs at most once; afterwards every canvas operation is a no-op.
    fn release_native(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        crate::engine_debug!(LOG_SOURCE, "releasing framebuffer {}", self.fbo);
        self.device.resources.enqueue_framebuffer(self.fbo);
        for rb in &self.renderbuffers {
            self.device.resources.enqueue_renderbuffer(*rb);
        }
    }

    fn noop(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl Drop for RttCanvasShared {
    fn drop(&mut self) {
        self.release_native();
    }
}

/// An off-screen canvas rendering into textures
pub struct RttCanvas {
    shared: Arc<RttCanvasShared>,
    device: Device,
}

impl RttCanvas {
    /// Whether this canvas has been neutralized by texture release
    pub fn released(&self) -> bool {
        self.shared.noop()
    }

    fn bind_hook(&self) -> Hook {
        let shared = self.shared.clone();
        Box::new(move || {
            shared.device.backend.bind_framebuffer(shared.fbo);
            *shared.device.rtt_bound.lock().unwrap() = Some(shared.clone());
        })
    }

    fn unbind_hook(&self) -> Hook {
        let shared = self.shared.clone();
        Box::new(move || {
            *shared.device.rtt_bound.lock().unwrap() = None;
            shared.device.backend.bind_framebuffer(0);
        })
    }

    /// Unbind hook that also refreshes mipmap chains, for `render`
    fn finish_hook(&self) -> Hook {
        let shared = self.shared.clone();
        Box::new(move || {
            let targets = shared.mipmap_targets.lock().unwrap().clone();
            for weak in targets {
                if let Some(texture) = weak.upgrade() {
                    if let Some(native) = texture.native() {
                        shared.device.backend.generate_mipmap(native.id);
                    }
                }
            }
            *shared.device.rtt_bound.lock().unwrap() = None;
            shared.device.backend.bind_framebuffer(0);
        })
    }
}

impl Canvas for RttCanvas {
    fn bounds(&self) -> Rect {
        self.shared.canvas.bounds()
    }

    fn precision(&self) -> Precision {
        self.shared.canvas.precision()
    }

    fn msaa(&self) -> bool {
        self.shared.canvas.msaa()
    }

    fn set_msaa(&self, msaa: bool) {
        self.shared.canvas.set_msaa(msaa);
    }

    fn capabilities(&self) -> CanvasCapabilities {
        let mut caps = CanvasCapabilities::DOWNLOAD;
        if self.device.info().occlusion_query {
            caps |= CanvasCapabilities::OCCLUSION_QUERY;
        }
        caps
    }

    fn clear(&self, rect: Rect, color: Color) {
        if self.shared.noop() {
            return;
        }
        self.device
            .hooked_clear(rect, color, Some(self.bind_hook()), Some(self.unbind_hook()));
    }

    fn clear_depth(&self, rect: Rect, depth: f64) {
        if self.shared.noop() {
            return;
        }
        self.device.hooked_clear_depth(
            rect,
            depth,
            Some(self.bind_hook()),
            Some(self.unbind_hook()),
        );
    }

    fn clear_stencil(&self, rect: Rect, stencil: i32) {
        if self.shared.noop() {
            return;
        }
        self.device.hooked_clear_stencil(
            rect,
            stencil,
            Some(self.bind_hook()),
            Some(self.unbind_hook()),
        );
    }

    fn draw(&self, rect: Rect, object: &Object, camera: &Camera) {
        if self.shared.noop() {
            return;
        }
        self.device.hooked_draw(
            rect,
            object,
            camera,
            Some(self.bind_hook()),
            Some(self.unbind_hook()),
        );
    }

    fn query_wait(&self) {
        if self.shared.noop() {
            return;
        }
        self.device
            .hooked_query_wait(Some(self.bind_hook()), Some(self.unbind_hook()));
    }

    fn render(&self) -> bool {
        if self.shared.noop() {
            return false;
        }
        self.device
            .hooked_render(Some(self.bind_hook()), Some(self.finish_hook()))
    }

    fn download(&self, rect: Rect, completion: Sender<Option<ImageData>>) {
        if self.shared.noop() {
            let _ = completion.send(None);
            return;
        }
        self.device.hooked_download(
            rect,
            completion,
            Some(self.bind_hook()),
            Some(self.unbind_hook()),
        );
    }
}

// ============================================================================
// Creation
// ============================================================================

impl Device {
    /// Create an off-screen canvas rendering into `cfg`'s destinations
    ///
    /// Returns `None` when the device cannot satisfy the request: no
    /// framebuffer object support (checked before any GPU call), a
    /// format outside the probed tables, or a driver that reports the
    /// complete-but-unsupported status.
    ///
    /// # Panics
    ///
    /// Panics on a structurally invalid configuration, and on a
    /// framebuffer the driver reports as incomplete (both are bugs in
    /// the caller or the creation protocol, not runtime conditions).
    pub fn render_to_texture(&self, cfg: RttConfig) -> Option<RttCanvas> {
        assert!(cfg.valid(), "render_to_texture: invalid configuration");

        if !self.inner.info.framebuffer_object {
            return None;
        }
        if let Some(format) = cfg.color_format {
            if !self.inner.rtt_color.contains(&format) {
                return None;
            }
        }
        if let Some(format) = cfg.depth_format {
            if !self.inner.rtt_depth.contains(&format) {
                return None;
            }
        }
        if let Some(format) = cfg.stencil_format {
            if !self.inner.rtt_stencil.contains(&format) {
                return None;
            }
        }

        let bounds = cfg.bounds;
        let samples = cfg.samples;
        let combined = cfg.combined_depth_stencil();
        let has_color_tex = cfg.color.is_some();
        let has_depth_tex = cfg.depth.is_some();
        let color_format = cfg.color_format;
        let depth_format = cfg.depth_format;
        let stencil_format = cfg.stencil_format;

        // Build the framebuffer synchronously on the render thread.
        let backend = self.inner.backend.clone();
        let (tx, rx) = bounded(1);
        self.inner.exec.submit(move || {
            let b = backend.as_ref();
            let fbo = b.gen_framebuffer();
            b.bind_framebuffer(fbo);

            let mut renderbuffers = Vec::new();
            let mut tex_color = None;
            let mut tex_depth = None;

            if let Some(format) = color_format {
                if has_color_tex {
                    let id = b.create_texture(format, bounds.width, bounds.height);
                    b.generate_mipmap(id);
                    b.attach_texture(Attachment::Color, id);
                    tex_color = Some(id);
                } else {
                    let rb =
                        b.create_color_renderbuffer(format, samples, bounds.width, bounds.height);
                    b.attach_renderbuffer(Attachment::Color, rb);
                    renderbuffers.push(rb);
                }
            }

            if combined {
                // One buffer backs both attachments. Texture
                // destinations are never materialized for combined
                // formats.
                let format = depth_format.unwrap_or(DsFormat::Depth24Stencil8);
                let rb = b.create_ds_renderbuffer(format, samples, bounds.width, bounds.height);
                b.attach_renderbuffer(Attachment::Depth, rb);
                b.attach_renderbuffer(Attachment::Stencil, rb);
                renderbuffers.push(rb);
            } else {
                if let Some(format) = depth_format {
                    if has_depth_tex {
                        let id = b.create_ds_texture(format, bounds.width, bounds.height);
                        b.attach_texture(Attachment::Depth, id);
                        tex_depth = Some(id);
                    } else {
                        let rb =
                            b.create_ds_renderbuffer(format, samples, bounds.width, bounds.height);
                        b.attach_renderbuffer(Attachment::Depth, rb);
                        renderbuffers.push(rb);
                    }
                }
                if let Some(format) = stencil_format {
                    // Stencil destinations are renderbuffer-only.
                    let rb =
                        b.create_ds_renderbuffer(format, samples, bounds.width, bounds.height);
                    b.attach_renderbuffer(Attachment::Stencil, rb);
                    renderbuffers.push(rb);
                }
            }

            let status = b.check_framebuffer_status();
            b.bind_framebuffer(0);
            let _ = tx.send(RttBuild {
                fbo,
                renderbuffers,
                tex_color,
                tex_depth,
                status,
            });
            false
        });

        let build = rx.recv().ok()?;
        match build.status {
            FramebufferStatus::Complete => {}
            FramebufferStatus::Unsupported => {
                crate::engine_warn!(
                    LOG_SOURCE,
                    "framebuffer configuration unsupported by the driver"
                );
                let resources = &self.inner.resources;
                resources.enqueue_framebuffer(build.fbo);
                for rb in build.renderbuffers {
                    resources.enqueue_renderbuffer(rb);
                }
                if let Some(id) = build.tex_color {
                    resources.enqueue_texture(id);
                }
                if let Some(id) = build.tex_depth {
                    resources.enqueue_texture(id);
                }
                return None;
            }
            FramebufferStatus::Incomplete(code) => {
                panic!("render_to_texture: incomplete framebuffer ({:#x})", code);
            }
        }

        let (red, green, blue, alpha) = color_format.map(|f| f.bits()).unwrap_or((0, 0, 0, 0));
        let precision = Precision {
            red_bits: red,
            green_bits: green,
            blue_bits: blue,
            alpha_bits: alpha,
            depth_bits: depth_format.map(|f| f.depth_bits()).unwrap_or(0),
            stencil_bits: stencil_format.map(|f| f.stencil_bits()).unwrap_or(0),
            samples,
        };

        let shared = Arc::new(RttCanvasShared {
            device: self.inner.clone(),
            canvas: CanvasState::new(bounds, precision),
            fbo: build.fbo,
            renderbuffers: build.renderbuffers,
            live_textures: Mutex::new(0),
            released: AtomicBool::new(false),
            mipmap_targets: Mutex::new(Vec::new()),
        });

        // Attach texture natives with a back reference to the canvas.
        let mut live = 0;
        if let (Some(texture), Some(id)) = (cfg.color.as_ref(), build.tex_color) {
            Self::finish_rtt_texture(texture, id, &shared, bounds);
            live += 1;
        }
        if let (Some(texture), Some(id)) = (cfg.depth.as_ref(), build.tex_depth) {
            Self::finish_rtt_texture(texture, id, &shared, bounds);
            live += 1;
        }
        *shared.live_textures.lock().unwrap() = live;

        let canvas = RttCanvas {
            shared,
            device: self.clone(),
        };

        // Attachment contents are undefined until written; wipe them.
        canvas.clear(bounds, Color::TRANSPARENT);
        canvas.clear_depth(bounds, 1.0);
        canvas.clear_stencil(bounds, 0);

        Some(canvas)
    }

    fn finish_rtt_texture(
        texture: &Arc<Texture>,
        id: TextureId,
        shared: &Arc<RttCanvasShared>,
        bounds: Rect,
    ) {
        texture.set_native(Arc::new(NativeTexture::new_rtt(
            id,
            shared.device.resources.clone(),
            shared.clone(),
        )));
        texture.set_bounds(bounds);
        let _ = texture.take_source();
        if texture.mipmapped {
            shared
                .mipmap_targets
                .lock()
                .unwrap()
                .push(Arc::downgrade(texture));
        }
    }
}

#[cfg(test)]
#[path = "rtt_tests.rs"]
mod tests;
