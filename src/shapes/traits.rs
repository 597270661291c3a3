//! Outline trait definition
//!
//! `Outline` is the capability every catalog shape shares: it knows its own
//! area and radius, can produce a transformed copy of itself, and can trace
//! its boundary into a path for rendering.
//!
//! ## Coordinate System
//!
//! - Shapes are defined in a local frame centered on the origin
//! - A per-instance affine transform maps that frame into canvas pixels
//! - Canvas Y grows downward, so a vertex at negative Y is drawn "up"

use nalgebra::Affine2;
use tiny_skia::PathBuilder;

/// A closed outline that can be measured, transformed and traced.
///
/// Implementors are immutable values: `transformed` never mutates `self`,
/// it always returns a new instance with the same vertex count and winding.
pub trait Outline {
    /// Enclosed area in the shape's current frame
    fn area(&self) -> f32;

    /// Characteristic radius (circumradius for polygons, edge length for
    /// stars)
    ///
    /// The lighting model treats this as the shape's extent around its
    /// origin when sizing specular and bevel gradients.
    fn radius(&self) -> f32;

    /// Map the shape through an affine transform
    ///
    /// The radius of the result is the transformed length of the reference
    /// segment from the shape's origin to `origin + (radius, 0)`.
    fn transformed(&self, xform: &Affine2<f32>) -> Self
    where
        Self: Sized;

    /// Append the closed boundary of this shape to a path builder
    fn trace(&self, pb: &mut PathBuilder);

    /// Get the name of this shape (for UI display and logging)
    fn name(&self) -> &str;
}
