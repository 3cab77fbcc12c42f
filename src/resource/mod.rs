/// Resource module - CPU-side resources and their GPU-native halves

// Module declarations
pub mod mesh;
pub mod shader;
pub mod texture;
pub mod object;

// Re-export from other modules
pub use mesh::*;
pub use shader::*;
pub use texture::*;
pub use object::*;
