//! Drawable objects and pre-draw validation
//!
//! An `Object` bundles everything one draw call needs: graphics state,
//! shader, meshes, textures, and a world transform. Before enqueueing a
//! draw the device validates the object; broken objects are skipped
//! with a warning rather than poisoning the render thread.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, Ordering};

use glam::{Mat4, Vec3};

use crate::types::{FaceCullMode, Rect};
use super::mesh::Mesh;
use super::shader::Shader;
use super::texture::Texture;

/// Fixed-function state applied while drawing an object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct State {
    pub face_culling: FaceCullMode,
    pub depth_write: bool,
    pub depth_test: bool,
    pub blend: bool,
}

impl Default for State {
    fn default() -> Self {
        Self {
            face_culling: FaceCullMode::Back,
            depth_write: true,
            depth_test: true,
            blend: false,
        }
    }
}

/// Why a draw was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawError {
    NilState,
    NilShader,
    ShaderError,
    NoMeshes,
    NoVertices,
    NilSource,
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrawError::NilState => write!(f, "object has no graphics state"),
            DrawError::NilShader => write!(f, "object has no shader"),
            DrawError::ShaderError => write!(f, "object's shader failed to compile"),
            DrawError::NoMeshes => write!(f, "object has no meshes"),
            DrawError::NoVertices => write!(f, "mesh has no vertices"),
            DrawError::NilSource => write!(f, "texture has no pixel source"),
        }
    }
}

/// Outcome of pre-draw validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PreDraw {
    /// Silently skip (empty rectangle)
    Skip,

    /// Skip with a warning
    Reject(DrawError),

    /// Proceed with the draw
    Proceed,
}

/// One drawable object
pub struct Object {
    /// Fixed-function state; `None` rejects the draw
    pub state: Option<State>,

    /// Shader program; `None` rejects the draw
    pub shader: Option<Arc<Shader>>,

    /// Meshes drawn with the shader; empty rejects the draw
    pub meshes: Vec<Arc<Mesh>>,

    /// Textures bound to consecutive sampling units
    pub textures: Vec<Arc<Texture>>,

    /// World transform
    pub transform: Mat4,

    /// Whether to run a hardware occlusion query around this draw
    pub occlusion_test: bool,

    samples: Arc<AtomicI32>,
}

impl Object {
    /// Create an object with default state and no resources
    pub fn new() -> Self {
        Self {
            state: Some(State::default()),
            shader: None,
            meshes: Vec::new(),
            textures: Vec::new(),
            transform: Mat4::IDENTITY,
            occlusion_test: false,
            samples: Arc::new(AtomicI32::new(-1)),
        }
    }

    /// Samples that passed the last occlusion query
    ///
    /// -1 until the first query for this object resolves.
    pub fn sample_count(&self) -> i32 {
        self.samples.load(Ordering::SeqCst)
    }

    pub(crate) fn samples_cell(&self) -> Arc<AtomicI32> {
        self.samples.clone()
    }

    /// Translation component of the world transform
    pub fn world_position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    /// Validate this object for drawing into `rect`
    pub(crate) fn predraw(&self, rect: Rect) -> PreDraw {
        if rect.is_empty() {
            return PreDraw::Skip;
        }
        if self.state.is_none() {
            return PreDraw::Reject(DrawError::NilState);
        }
        let shader = match &self.shader {
            Some(shader) => shader,
            None => return PreDraw::Reject(DrawError::NilShader),
        };
        if shader.error().is_some() {
            return PreDraw::Reject(DrawError::ShaderError);
        }
        if self.meshes.is_empty() {
            return PreDraw::Reject(DrawError::NoMeshes);
        }
        PreDraw::Proceed
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "object_tests.rs"]
mod tests;
