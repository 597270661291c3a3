//! Global scatter parameters
//!
//! Every parameter has a clamp range. Setting a value clamps it first and
//! reports whether the stored value actually changed, so callers can skip
//! invalidation and redraw for no-op updates.

use std::f32::consts::TAU;

use rand::Rng;

/// Widest edge and bevel thickness, in pixels
pub const MAX_BORDER: f32 = 64.0;

/// Inclusive clamp range of a float parameter
pub type Range = (f32, f32);

pub const POS_RANDOMNESS_RANGE: Range = (0.0, 1000.0);
pub const ANGLE_RANGE: Range = (0.0, TAU);
pub const RADIUS_RANGE: Range = (1.0, 512.0);
pub const RADIUS_VARIATION_RANGE: Range = (0.0, 256.0);
pub const PERCENT_RANGE: Range = (0.0, 100.0);
pub const BORDER_RANGE: Range = (0.0, MAX_BORDER);
pub const HUE_RANGE: Range = (0.0, 360.0);
pub const SHADOW_DIVISOR_RANGE: Range = (1.0, 1024.0);
pub const SPECULAR_SHAPE_RANGE: Range = (1.0, 100.0);

/// Global parameters of one scatter layer
#[derive(Clone, Debug, PartialEq)]
pub struct Params {
    /// Active slot count
    pub quantity: usize,
    /// Jitter blend, per mille (0 = spiral, 1000 = fully random)
    pub pos_randomness: f32,
    /// Base rotation, radians
    pub theta: f32,
    /// Rotation spread, radians
    pub theta_variation: f32,
    /// Base scale, pixels
    pub radius: f32,
    /// Scale spread, pixels
    pub radius_variation: f32,
    /// Size distribution skew, percent (0 = linear, 100 = inverse)
    pub radius_power: f32,
    pub edge_thickness: f32,
    /// Degrees
    pub hue: f32,
    /// Degrees
    pub hue_variation: f32,
    pub min_saturation: f32,
    pub max_saturation: f32,
    pub min_lightness: f32,
    pub max_lightness: f32,
    pub min_opacity: u8,
    pub gradient_opacity: u8,
    pub shadow_opacity: u8,
    /// Shadow offset is the light vector divided by this
    pub shadow_divisor: f32,
    pub specular_brightness: u8,
    pub specular_depth: f32,
    pub specular_sharpness: f32,
    pub bevel_thickness: f32,
}

impl Params {
    /// Defaults for a layer of `max_quantity` slots, with a fixed hue
    pub fn new(max_quantity: usize) -> Self {
        Self {
            quantity: max_quantity / 8,
            pos_randomness: 1000.0,
            theta: 0.0,
            theta_variation: TAU,
            radius: 16.0,
            radius_variation: 8.0,
            radius_power: 0.0,
            edge_thickness: 1.0,
            hue: 0.0,
            hue_variation: 60.0,
            min_saturation: 100.0,
            max_saturation: 100.0,
            min_lightness: 50.0,
            max_lightness: 50.0,
            min_opacity: 255,
            gradient_opacity: 191,
            shadow_opacity: 204,
            shadow_divisor: 50.0,
            specular_brightness: 0,
            specular_depth: 33.0,
            specular_sharpness: 75.0,
            bevel_thickness: 0.0,
        }
    }

    /// Defaults with a random hue and hue variation
    pub fn randomized<R: Rng + ?Sized>(rng: &mut R, max_quantity: usize) -> Self {
        Self {
            hue: rng.gen_range(0..360) as f32,
            hue_variation: rng.gen_range(5..180) as f32,
            ..Self::new(max_quantity)
        }
    }
}

/// Clamp `value` into `range` and store it
///
/// Returns `true` only if the stored value changed. NaN is rejected.
pub fn update(field: &mut f32, value: f32, range: Range) -> bool {
    if value.is_nan() {
        return false;
    }
    let value = value.clamp(range.0, range.1);
    if value == *field {
        return false;
    }
    *field = value;
    true
}

/// Store an alpha value, returning `true` if it changed
pub fn update_alpha(field: &mut u8, value: u8) -> bool {
    if value == *field {
        return false;
    }
    *field = value;
    true
}

/// Clamp a signed quantity into `0..=max`
pub fn clamp_quantity(value: i64, max: usize) -> usize {
    if value <= 0 {
        0
    } else {
        usize::try_from(value).map_or(max, |v| v.min(max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_defaults() {
        let params = Params::new(16384);
        assert_eq!(params.quantity, 2048);
        assert_eq!(params.gradient_opacity, 191);
        assert!((params.theta_variation - TAU).abs() < 1e-6);
    }

    #[test]
    fn test_randomized_hue_ranges() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..50 {
            let params = Params::randomized(&mut rng, 64);
            assert!((0.0..360.0).contains(&params.hue));
            assert!((5.0..180.0).contains(&params.hue_variation));
            assert_eq!(params.quantity, 8);
        }
    }

    #[test]
    fn test_update_clamps_and_suppresses() {
        let mut radius = 16.0;
        assert!(!update(&mut radius, 16.0, RADIUS_RANGE));
        assert!(update(&mut radius, 0.0, RADIUS_RANGE));
        assert_eq!(radius, 1.0);
        // Clamps to the value already stored
        assert!(!update(&mut radius, -20.0, RADIUS_RANGE));
        assert!(!update(&mut radius, f32::NAN, RADIUS_RANGE));
        assert!(update(&mut radius, 1e6, RADIUS_RANGE));
        assert_eq!(radius, 512.0);
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(-5, 100), 0);
        assert_eq!(clamp_quantity(0, 100), 0);
        assert_eq!(clamp_quantity(42, 100), 42);
        assert_eq!(clamp_quantity(101, 100), 100);
        assert_eq!(clamp_quantity(i64::MAX, 100), 100);
    }
}
