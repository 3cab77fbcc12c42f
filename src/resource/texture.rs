//! Textures - CPU pixel sources plus the GPU texture backing them
//!
//! Textures load lazily at first draw, like meshes and shaders. A
//! texture can also be a render-to-texture destination, in which case
//! its native half is created by the canvas and carries a back
//! reference to it: dropping the last such texture permanently
//! neutralizes the canvas and releases its framebuffer.

use std::sync::{Arc, Mutex};

use crate::backend::{TexFormat, TextureId};
use crate::device::{ResourceManager, RttCanvasShared};
use crate::types::{ImageData, Rect};

/// A 2D texture
pub struct Texture {
    /// Storage format on the GPU
    pub format: TexFormat,

    /// Whether a mipmap chain is kept (and regenerated after RTT renders)
    pub mipmapped: bool,

    source: Mutex<Option<ImageData>>,
    bounds: Mutex<Rect>,
    native: Mutex<Option<Arc<NativeTexture>>>,
}

impl Texture {
    /// Create an empty texture (a render-to-texture destination)
    pub fn new(format: TexFormat) -> Self {
        Self {
            format,
            mipmapped: false,
            source: Mutex::new(None),
            bounds: Mutex::new(Rect::default()),
            native: Mutex::new(None),
        }
    }

    /// Create a texture from pixel data
    pub fn with_source(format: TexFormat, source: ImageData) -> Self {
        let bounds = Rect::new(0, 0, source.width, source.height);
        Self {
            format,
            mipmapped: false,
            source: Mutex::new(Some(source)),
            bounds: Mutex::new(bounds),
            native: Mutex::new(None),
        }
    }

    /// Pixel dimensions of the texture
    pub fn bounds(&self) -> Rect {
        *self.bounds.lock().unwrap()
    }

    pub(crate) fn set_bounds(&self, bounds: Rect) {
        *self.bounds.lock().unwrap() = bounds;
    }

    /// Take the CPU pixel source, if still present
    ///
    /// The source is dropped after upload to release the memory.
    pub(crate) fn take_source(&self) -> Option<ImageData> {
        self.source.lock().unwrap().take()
    }

    /// Whether a CPU pixel source is present
    pub fn has_source(&self) -> bool {
        self.source.lock().unwrap().is_some()
    }

    /// Whether a GPU texture is attached
    pub fn loaded(&self) -> bool {
        self.native.lock().unwrap().is_some()
    }

    pub(crate) fn native(&self) -> Option<Arc<NativeTexture>> {
        self.native.lock().unwrap().clone()
    }

    pub(crate) fn set_native(&self, native: Arc<NativeTexture>) {
        *self.native.lock().unwrap() = Some(native);
    }
}

/// GPU texture backing a `Texture`
pub struct NativeTexture {
    pub id: TextureId,
    resources: Arc<ResourceManager>,

    /// Canvas this texture is a render destination of, if any
    rtt: Mutex<Option<Arc<RttCanvasShared>>>,
}

impl NativeTexture {
    pub(crate) fn new(id: TextureId, resources: Arc<ResourceManager>) -> Self {
        Self {
            id,
            resources,
            rtt: Mutex::new(None),
        }
    }

    pub(crate) fn new_rtt(
        id: TextureId,
        resources: Arc<ResourceManager>,
        canvas: Arc<RttCanvasShared>,
    ) -> Self {
        Self {
            id,
            resources,
            rtt: Mutex::new(Some(canvas)),
        }
    }
}

impl Drop for NativeTexture {
    fn drop(&mut self) {
        self.resources.enqueue_texture(self.id);
        if let Some(canvas) = self.rtt.lock().unwrap().take() {
            canvas.release_texture();
        }
    }
}

#[cfg(test)]
#[path = "texture_tests.rs"]
mod tests;
