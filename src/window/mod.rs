/// Window module - native window management and device rebuild protocol

// Module declarations
pub mod props;
pub mod swapper;
pub mod backend;
pub mod mock_window;
pub mod window;
pub mod winit_backend;

// Re-export from other modules
pub use props::*;
pub use swapper::*;
pub use backend::*;
pub use mock_window::*;
pub use window::*;
pub use winit_backend::*;
