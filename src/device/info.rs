//! Device information snapshot
//!
//! Capabilities probed once at device creation and exposed read-only,
//! so application code can branch on them without touching the GPU.

use crate::backend::{BackendCaps, DsFormat, TexFormat};

/// Render-to-texture formats supported by a device
#[derive(Debug, Clone, Default)]
pub struct RttFormats {
    pub color: Vec<TexFormat>,
    pub depth: Vec<DsFormat>,
    pub stencil: Vec<DsFormat>,
    pub max_samples: u32,
}

/// Immutable facts about a device
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    /// Driver renderer string
    pub name: String,

    /// Driver vendor string
    pub vendor: String,

    /// Largest supported texture dimension
    pub max_texture_size: u32,

    /// Whether occlusion queries report real sample counts
    pub occlusion_query: bool,

    /// Bit width of occlusion query counters
    pub occlusion_query_bits: u32,

    /// Whether render-to-texture is available at all
    pub framebuffer_object: bool,

    /// Non-power-of-two texture support
    pub npot: bool,

    /// Depth clamping support
    pub depth_clamp: bool,

    /// Alpha-to-coverage support
    pub alpha_to_coverage: bool,

    /// Formats accepted by `render_to_texture`
    pub rtt_formats: RttFormats,
}

impl DeviceInfo {
    pub(crate) fn from_caps(caps: &BackendCaps) -> Self {
        Self {
            name: caps.renderer.clone(),
            vendor: caps.vendor.clone(),
            max_texture_size: caps.max_texture_size,
            occlusion_query: caps.occlusion_query,
            occlusion_query_bits: caps.occlusion_query_bits,
            framebuffer_object: caps.framebuffer_object,
            npot: caps.npot,
            depth_clamp: caps.depth_clamp,
            alpha_to_coverage: caps.alpha_to_coverage,
            rtt_formats: RttFormats {
                color: caps.rtt.color.clone(),
                depth: caps.rtt.depth.clone(),
                stencil: caps.rtt.stencil.clone(),
                max_samples: caps.rtt.max_samples,
            },
        }
    }
}
