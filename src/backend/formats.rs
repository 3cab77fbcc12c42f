//! Texture and depth/stencil storage formats
//!
//! The formats a device can render to off-screen are probed at device
//! creation time; render-to-texture requests are checked against those
//! tables before any GPU object is allocated.

/// Color texture storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TexFormat {
    /// 8 bits per channel, no alpha
    Rgb,

    /// 8 bits per channel with alpha
    Rgba,
}

impl TexFormat {
    /// Bits per channel as (red, green, blue, alpha)
    pub fn bits(&self) -> (u8, u8, u8, u8) {
        match self {
            TexFormat::Rgb => (8, 8, 8, 0),
            TexFormat::Rgba => (8, 8, 8, 8),
        }
    }
}

/// Depth and/or stencil storage format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DsFormat {
    Depth16,
    Depth24,
    Depth32,

    /// Combined 24-bit depth and 8-bit stencil in one buffer
    Depth24Stencil8,
}

impl DsFormat {
    /// Number of depth bits stored
    pub fn depth_bits(&self) -> u8 {
        match self {
            DsFormat::Depth16 => 16,
            DsFormat::Depth24 => 24,
            DsFormat::Depth32 => 32,
            DsFormat::Depth24Stencil8 => 24,
        }
    }

    /// Number of stencil bits stored
    pub fn stencil_bits(&self) -> u8 {
        match self {
            DsFormat::Depth24Stencil8 => 8,
            _ => 0,
        }
    }

    /// Whether this format packs depth and stencil into one buffer
    ///
    /// When a render-to-texture configuration requests the same combined
    /// format for both depth and stencil, a single renderbuffer backs
    /// both attachments.
    pub fn is_combined(&self) -> bool {
        matches!(self, DsFormat::Depth24Stencil8)
    }
}

#[cfg(test)]
#[path = "formats_tests.rs"]
mod tests;
