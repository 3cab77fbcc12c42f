//! Deferred GPU resource reclamation
//!
//! GPU handles can only be deleted on the render thread, but the
//! values owning them drop on whatever thread last touched them. Drop
//! implementations therefore enqueue handles here, and the render
//! thread reclaims the lists at frame completion (plus a 200 ms idle
//! tick for devices that stop rendering).
//!
//! Reclamation swaps each list out under its lock and only then talks
//! to the GPU, so drops on other threads never wait on driver calls.
//! Deletions are batched per kind to keep the call count down.

use std::mem;
use std::sync::Mutex;

use crate::backend::{
    BufferId, FramebufferId, GlBackend, MeshBuffers, ProgramId, RenderbufferId, TextureId,
};

const LOG_SOURCE: &str = "quasar::ResourceManager";

/// Pending GPU handle lists of one device
pub struct ResourceManager {
    meshes: Mutex<Vec<MeshBuffers>>,
    shaders: Mutex<Vec<ProgramId>>,
    textures: Mutex<Vec<TextureId>>,
    framebuffers: Mutex<Vec<FramebufferId>>,
    renderbuffers: Mutex<Vec<RenderbufferId>>,
}

impl ResourceManager {
    /// Create a manager with empty lists
    pub fn new() -> Self {
        Self {
            meshes: Mutex::new(Vec::new()),
            shaders: Mutex::new(Vec::new()),
            textures: Mutex::new(Vec::new()),
            framebuffers: Mutex::new(Vec::new()),
            renderbuffers: Mutex::new(Vec::new()),
        }
    }

    // ===== Enqueue (any thread) =====

    pub fn enqueue_mesh(&self, buffers: MeshBuffers) {
        self.meshes.lock().unwrap().push(buffers);
    }

    pub fn enqueue_shader(&self, program: ProgramId) {
        self.shaders.lock().unwrap().push(program);
    }

    pub fn enqueue_texture(&self, texture: TextureId) {
        self.textures.lock().unwrap().push(texture);
    }

    pub fn enqueue_framebuffer(&self, framebuffer: FramebufferId) {
        self.framebuffers.lock().unwrap().push(framebuffer);
    }

    pub fn enqueue_renderbuffer(&self, renderbuffer: RenderbufferId) {
        self.renderbuffers.lock().unwrap().push(renderbuffer);
    }

    // ===== Pending counts =====

    pub fn pending_meshes(&self) -> usize {
        self.meshes.lock().unwrap().len()
    }

    pub fn pending_shaders(&self) -> usize {
        self.shaders.lock().unwrap().len()
    }

    pub fn pending_textures(&self) -> usize {
        self.textures.lock().unwrap().len()
    }

    pub fn pending_framebuffers(&self) -> usize {
        self.framebuffers.lock().unwrap().len()
    }

    pub fn pending_renderbuffers(&self) -> usize {
        self.renderbuffers.lock().unwrap().len()
    }

    /// Whether any handle awaits deletion
    pub fn has_pending(&self) -> bool {
        self.pending_meshes() > 0
            || self.pending_shaders() > 0
            || self.pending_textures() > 0
            || self.pending_framebuffers() > 0
            || self.pending_renderbuffers() > 0
    }

    // ===== Reclaim (render thread only) =====

    /// Delete every pending handle on `backend`
    ///
    /// Handles enqueued by other threads while deletion is in progress
    /// land on the freshly emptied lists and survive to the next pass.
    /// Ends with a command-stream flush when anything was deleted.
    pub fn reclaim(&self, backend: &dyn GlBackend) {
        let meshes = mem::take(&mut *self.meshes.lock().unwrap());
        let shaders = mem::take(&mut *self.shaders.lock().unwrap());
        let textures = mem::take(&mut *self.textures.lock().unwrap());
        let framebuffers = mem::take(&mut *self.framebuffers.lock().unwrap());
        let renderbuffers = mem::take(&mut *self.renderbuffers.lock().unwrap());

        let deleted_any = !meshes.is_empty()
            || !shaders.is_empty()
            || !textures.is_empty()
            || !framebuffers.is_empty()
            || !renderbuffers.is_empty();

        if !meshes.is_empty() {
            crate::engine_debug!(LOG_SOURCE, "free {} meshes", meshes.len());
            let ids: Vec<BufferId> = meshes.iter().flat_map(|m| m.buffer_ids()).collect();
            backend.delete_buffers(&ids);
        }
        if !shaders.is_empty() {
            crate::engine_debug!(LOG_SOURCE, "free {} shaders", shaders.len());
            for program in shaders {
                backend.delete_program(program);
            }
        }
        if !textures.is_empty() {
            crate::engine_debug!(LOG_SOURCE, "free {} textures", textures.len());
            backend.delete_textures(&textures);
        }
        if !framebuffers.is_empty() {
            crate::engine_debug!(LOG_SOURCE, "free {} framebuffers", framebuffers.len());
            backend.delete_framebuffers(&framebuffers);
        }
        if !renderbuffers.is_empty() {
            crate::engine_debug!(LOG_SOURCE, "free {} renderbuffers", renderbuffers.len());
            backend.delete_renderbuffers(&renderbuffers);
        }

        if deleted_any {
            backend.flush();
        }
    }
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "reclaim_tests.rs"]
mod tests;
