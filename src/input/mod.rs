/// Input module - thread-safe keyboard and mouse state tracking

// Module declarations
pub mod keyboard;
pub mod mouse;

// Re-export from other modules
pub use keyboard::*;
pub use mouse::*;
