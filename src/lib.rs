/*!
# Quasar GFX

A device-independent 3D rendering layer with explicit resource
lifetimes.

All GPU-affecting work for a device funnels through one bounded command
queue drained by a single thread, so a thread-affine graphics context
can be driven safely from a concurrent application. On top of that
executor sit deferred resource reclamation, occlusion-query polling,
render-to-texture canvases, and a window controller that can tear down
and rebuild its device (fullscreen transitions) without losing queued
work.

## Architecture

- **Device**: per-surface execution context owning the command queue,
  resource manager, and query tracker
- **Canvas**: the drawable-surface contract (clear/draw/render/download),
  implemented by `Device`, `RttCanvas`, and `Swapper`
- **RttCanvas**: off-screen canvas rendering into sampleable textures
- **Window / WindowSystem**: native window management, property
  reconciliation, and the rebuild/swap protocol
- **GlBackend / WindowBackend**: the narrow native seams; mock
  implementations drive the test suite

Backends provide concrete `GlBackend` / `WindowBackend` implementations;
the engine never issues a native call outside them.
*/

// Internal modules
pub mod error;
pub mod log;
pub mod types;
pub mod clock;
pub mod camera;
pub mod backend;
pub mod canvas;
pub mod resource;
pub mod device;
pub mod util;
pub mod input;
pub mod window;

// Main quasar namespace module
pub mod quasar {
    // Error types
    pub use crate::error::{Error, Result};

    // Core value types
    pub use crate::types::{Color, FaceCullMode, ImageData, Precision, Rect};

    // Camera and frame clock
    pub use crate::camera::Camera;
    pub use crate::clock::Clock;

    // Canvas contract
    pub use crate::canvas::{Canvas, CanvasCapabilities};

    // Device and render-to-texture
    pub use crate::device::{Device, DeviceConfig, DeviceInfo, RttCanvas, RttConfig};

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Backend seam sub-module
    pub mod backend {
        pub use crate::backend::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Input sub-module
    pub mod input {
        pub use crate::input::*;
    }

    // Window sub-module
    pub mod window {
        pub use crate::window::*;
    }
}

// Re-export math library at crate root
pub use glam;
