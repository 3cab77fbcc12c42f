//! Shaders - GLSL sources plus the linked program backing them
//!
//! Compilation happens lazily on the render thread during the first
//! draw. A failed compile parks the driver's info log in the error slot
//! and every later draw with this shader is skipped with a warning.

use std::sync::{Arc, Mutex};

use crate::backend::ProgramId;
use crate::device::ResourceManager;

/// A shader program described by its sources
pub struct Shader {
    /// Name used in warnings and compile errors
    pub name: String,

    pub vertex_source: String,
    pub fragment_source: String,

    error: Mutex<Option<String>>,
    native: Mutex<Option<Arc<NativeShader>>>,
}

impl Shader {
    pub fn new(name: &str, vertex_source: &str, fragment_source: &str) -> Self {
        Self {
            name: name.to_string(),
            vertex_source: vertex_source.to_string(),
            fragment_source: fragment_source.to_string(),
            error: Mutex::new(None),
            native: Mutex::new(None),
        }
    }

    /// Compile error from the driver, if compilation failed
    pub fn error(&self) -> Option<String> {
        self.error.lock().unwrap().clone()
    }

    pub(crate) fn set_error(&self, error: String) {
        *self.error.lock().unwrap() = Some(error);
    }

    /// Whether a linked program is attached
    pub fn loaded(&self) -> bool {
        self.native.lock().unwrap().is_some()
    }

    pub(crate) fn native(&self) -> Option<Arc<NativeShader>> {
        self.native.lock().unwrap().clone()
    }

    pub(crate) fn set_native(&self, native: Arc<NativeShader>) {
        *self.native.lock().unwrap() = Some(native);
    }
}

/// Linked GPU program backing a shader
pub struct NativeShader {
    pub program: ProgramId,
    resources: Arc<ResourceManager>,
}

impl NativeShader {
    pub(crate) fn new(program: ProgramId, resources: Arc<ResourceManager>) -> Self {
        Self { program, resources }
    }
}

impl Drop for NativeShader {
    fn drop(&mut self) {
        self.resources.enqueue_shader(self.program);
    }
}

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
