//! Error types for the Quasar graphics layer
//!
//! This module defines the error types used throughout the crate,
//! including device creation, window management, and resource handling.

use std::fmt;

/// Result type for Quasar operations
pub type Result<T> = std::result::Result<T, Error>;

/// Quasar graphics errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (OpenGL context, GPU driver, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, mesh, shader, etc.)
    InvalidResource(String),

    /// Initialization failed (device, window, subsystems)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an ERROR message and return a `BackendError` from the enclosing function
///
/// # Example
///
/// ```no_run
/// fn check(count: usize) -> quasar_gfx::quasar::Result<()> {
///     if count == 0 {
///         quasar_gfx::engine_bail!("quasar::Device", "no meshes to upload");
///     }
///     Ok(())
/// }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        return Err($crate::error::Error::BackendError(message));
    }};
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
