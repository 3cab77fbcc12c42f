/// Utility module - small helpers shared across the engine

// Module declarations
pub mod sort;

// Re-export from other modules
pub use sort::*;
