/// Backend module - the narrow seam between the device and the GPU

// Module declarations
pub mod formats;
pub mod gl_backend;
pub mod mock_backend;

// Re-export the full backend surface
pub use formats::*;
pub use gl_backend::*;
pub use mock_backend::*;
