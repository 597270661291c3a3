//! Transform engine - per-instance placement
//!
//! Each active slot gets an affine transform built from:
//! - a position blending the square-spiral layout with the slot's jitter
//! - a scale drawn from the size distribution tables
//! - a rotation spread around the base angle
//!
//! The transform maps the instance's local frame into canvas pixels as
//! translate, then scale, then rotate:
//!
//! ```text
//! | s·cos r  -s·sin r  tx |
//! | s·sin r   s·cos r  ty |
//! |   0         0       1 |
//! ```

use std::f32::consts::TAU;

use nalgebra::{Affine2, Matrix3, Point2, Vector2};

use super::params::Params;
use crate::random::{size_variation, RandomField};
use crate::scene::Bounds;

/// Square-spiral base position of `slot`, before canvas scaling
///
/// With `n = sqrt(slot)`, the point is `n·(cos, sin)(2π·n/4) / 80`.
pub fn arranged_position(slot: usize) -> Vector2<f32> {
    let n = (slot as f32).sqrt();
    let angle = TAU * n / 4.0;
    Vector2::new(n * angle.cos(), n * angle.sin()) / 80.0
}

/// Translate, then scale, then rotate
pub fn compose(translation: Point2<f32>, scale: f32, rotation: f32) -> Affine2<f32> {
    let (sin, cos) = rotation.sin_cos();
    Affine2::from_matrix_unchecked(Matrix3::new(
        scale * cos, -scale * sin, translation.x,
        scale * sin, scale * cos, translation.y,
        0.0, 0.0, 1.0,
    ))
}

/// Canvas position of `slot`
pub fn position(slot: usize, field: &RandomField, params: &Params, bounds: Bounds) -> Point2<f32> {
    let pr = params.pos_randomness / 1000.0;
    let jitter = Vector2::new(field.pos_x[slot], field.pos_y[slot]);
    let blended = arranged_position(slot) * (1.0 - pr) + jitter * pr;
    bounds.center() + blended * bounds.max_side()
}

/// Scale of `slot`, never negative
pub fn scale(slot: usize, field: &RandomField, params: &Params) -> f32 {
    let skew = params.radius_power / 100.0;
    let variation = size_variation(field.size_index[slot] as usize, skew);
    (params.radius + params.radius_variation * variation / 256.0).max(0.0)
}

/// Rotation of `slot`, radians
pub fn rotation(slot: usize, field: &RandomField, params: &Params) -> f32 {
    params.theta + field.rotation[slot] * params.theta_variation
}

/// Recompute `out` for the active slots, reusing its allocation
pub fn compute_transforms(
    out: &mut Vec<Affine2<f32>>,
    field: &RandomField,
    params: &Params,
    bounds: Bounds,
) {
    let count = params.quantity.min(field.capacity());
    out.clear();
    out.extend((0..count).map(|i| {
        compose(
            position(i, field, params, bounds),
            scale(i, field, params),
            rotation(i, field, params),
        )
    }));
}
