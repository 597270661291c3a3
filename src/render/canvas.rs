//! Canvas - the drawing contract the scatter layer renders through
//!
//! The layer never touches pixels directly. It describes every fill as a
//! `Paint` (flat color or gradient in canvas coordinates) and hands it to a
//! `Canvas` together with the shape to fill.

use nalgebra::Point2;
use tiny_skia::Color;

use crate::shapes::Shape;

/// A color stop along a gradient, `offset` in `[0, 1]`
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
    pub offset: f32,
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f32, color: Color) -> Self {
        Self { offset, color }
    }
}

/// How a region is filled
///
/// Gradient geometry is in canvas pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// Flat color
    Solid(Color),
    /// Linear gradient from `start` (offset 0) to `end` (offset 1)
    Linear {
        start: Point2<f32>,
        end: Point2<f32>,
        stops: Vec<GradientStop>,
    },
    /// Concentric radial gradient: offset 0 at `inner_radius` from `center`,
    /// offset 1 at `outer_radius`, padded beyond both
    Radial {
        center: Point2<f32>,
        inner_radius: f32,
        outer_radius: f32,
        stops: Vec<GradientStop>,
    },
}

impl Paint {
    /// Color of the final stop, or the flat color
    ///
    /// Backends fall back to this when a gradient degenerates.
    pub fn fallback_color(&self) -> Color {
        match self {
            Paint::Solid(color) => *color,
            Paint::Linear { stops, .. } | Paint::Radial { stops, .. } => {
                stops.last().map(|s| s.color).unwrap_or(Color::TRANSPARENT)
            }
        }
    }
}

/// Copy of `color` with an 8-bit alpha
pub fn with_alpha(color: Color, alpha: u8) -> Color {
    let mut c = color;
    c.set_alpha(alpha as f32 / 255.0);
    c
}

/// A surface shapes can be drawn onto
///
/// Implementations must be deterministic: drawing the same sequence of calls
/// onto two fresh canvases yields identical results.
pub trait Canvas {
    /// Canvas size in pixels
    fn size(&self) -> (u32, u32);

    /// Replace every pixel with `color`, no blending
    fn clear(&mut self, color: Color);

    /// Fill the whole canvas
    fn fill_all(&mut self, paint: &Paint);

    /// Fill the interior of `shape`
    fn fill(&mut self, shape: &Shape, paint: &Paint);

    /// Fill `shape` shifted by `(dx, dy)` (drop shadows)
    fn fill_translated(&mut self, shape: &Shape, dx: f32, dy: f32, paint: &Paint);

    /// Stroke the outline of `shape` with a flat pen
    fn stroke(&mut self, shape: &Shape, width: f32, color: Color);

    /// Fill the band of `shape` lying within `thickness` of its outline
    ///
    /// This is the outline stroked at twice the thickness, intersected with
    /// the shape's own interior.
    fn fill_bevel(&mut self, shape: &Shape, thickness: f32, paint: &Paint);
}
