//! Meshes - CPU vertex data plus the GPU buffers backing it
//!
//! A `Mesh` owns its vertices on the CPU side. The first draw uploads
//! it, attaching a `NativeMesh`; dropping the last reference to the
//! native half enqueues its GPU buffers on the owning device's resource
//! manager for deferred deletion on the render thread.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use bytemuck::{Pod, Zeroable};

use crate::backend::MeshBuffers;
use crate::device::ResourceManager;

/// One interleaved vertex
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coord: [f32; 2],
}

impl Vertex {
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }
}

/// A drawable mesh
pub struct Mesh {
    /// Interleaved vertex data
    pub vertices: Vec<Vertex>,

    /// Optional triangle indices; empty means non-indexed drawing
    pub indices: Vec<u32>,

    changed: AtomicBool,
    native: Mutex<Option<Arc<NativeMesh>>>,
}

impl Mesh {
    /// Create a mesh from vertex (and optional index) data
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            indices,
            changed: false.into(),
            native: Mutex::new(None),
        }
    }

    /// Whether GPU buffers are currently attached
    pub fn loaded(&self) -> bool {
        self.native.lock().unwrap().is_some()
    }

    /// Mark the CPU data as modified; the next draw re-uploads it
    pub fn set_changed(&self) {
        self.changed.store(true, Ordering::SeqCst);
    }

    pub fn changed(&self) -> bool {
        self.changed.load(Ordering::SeqCst)
    }

    pub(crate) fn native(&self) -> Option<Arc<NativeMesh>> {
        self.native.lock().unwrap().clone()
    }

    pub(crate) fn set_native(&self, native: Arc<NativeMesh>) {
        *self.native.lock().unwrap() = Some(native);
        self.changed.store(false, Ordering::SeqCst);
    }
}

/// GPU buffers backing a mesh
///
/// Owns the buffer handles; dropping it hands them to the resource
/// manager, never to the GPU directly (drops can happen on any thread).
pub struct NativeMesh {
    pub buffers: MeshBuffers,
    resources: Arc<ResourceManager>,
}

impl NativeMesh {
    pub(crate) fn new(buffers: MeshBuffers, resources: Arc<ResourceManager>) -> Self {
        Self { buffers, resources }
    }
}

impl Drop for NativeMesh {
    fn drop(&mut self) {
        self.resources.enqueue_mesh(self.buffers);
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
