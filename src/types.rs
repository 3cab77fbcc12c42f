//! Shared value types for the Quasar graphics layer
//!
//! Small plain-data types used across the canvas, device, and window
//! modules: rectangles, colors, framebuffer precision, face culling
//! modes, and downloaded pixel data.

use std::fmt;

/// An axis-aligned rectangle in canvas coordinates
///
/// The origin is the bottom-left corner of the canvas. A rectangle with a
/// zero width or height is *empty* and causes draw, clear, and download
/// operations to become no-ops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Whether this rectangle has zero area
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection of two rectangles
    ///
    /// Returns an empty rectangle when they do not overlap. Used to clamp
    /// scissor and download rectangles to the canvas bounds.
    pub fn intersect(&self, other: Rect) -> Rect {
        let x0 = self.x.max(other.x);
        let y0 = self.y.max(other.y);
        let x1 = (self.x + self.width as i32).min(other.x + other.width as i32);
        let y1 = (self.y + self.height as i32).min(other.y + other.height as i32);
        if x1 <= x0 || y1 <= y0 {
            return Rect::default();
        }
        Rect {
            x: x0,
            y: y0,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Rect({}, {}, {}x{})",
            self.x, self.y, self.width, self.height
        )
    }
}

/// An RGBA color with floating-point channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };
    pub const TRANSPARENT: Color = Color { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };

    /// Create a new color
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Pixel storage precision of a canvas
///
/// Describes how many bits each channel of the canvas actually stores,
/// plus the number of MSAA samples. Zero bits means the canvas has no
/// buffer of that kind (e.g. no stencil buffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Precision {
    pub red_bits: u8,
    pub green_bits: u8,
    pub blue_bits: u8,
    pub alpha_bits: u8,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    pub samples: u32,
}

/// Face culling mode applied while drawing an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FaceCullMode {
    /// Cull back faces (the default)
    #[default]
    Back,

    /// Cull front faces
    Front,

    /// Cull nothing
    None,
}

impl fmt::Display for FaceCullMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaceCullMode::Back => write!(f, "BackFaceCulling"),
            FaceCullMode::Front => write!(f, "FrontFaceCulling"),
            FaceCullMode::None => write!(f, "NoFaceCulling"),
        }
    }
}

/// Pixels downloaded from a canvas
///
/// Rows are stored bottom-up, 4 bytes per pixel (RGBA).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl ImageData {
    /// Create image data, validating the byte length
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);
        Self { width, height, rgba }
    }
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
