//! Light source
//!
//! `LightSource` is the resolved light in canvas pixels that layers read.
//! `LightController` holds the user-facing, canvas-relative settings and
//! resolves them against the current canvas size.

use nalgebra::Point2;
use tiny_skia::Color;

/// A point light with a linear falloff band
///
/// Instances closer than `inner_radius` are fully lit, instances past
/// `outer_radius` are dark.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightSource {
    pub position: Point2<f32>,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub color: Color,
}

impl Default for LightSource {
    /// White light at the origin with an infinite plateau
    fn default() -> Self {
        Self {
            position: Point2::origin(),
            inner_radius: f32::MAX,
            outer_radius: f32::MAX,
            color: Color::WHITE,
        }
    }
}

impl LightSource {
    /// Normalized lighting at `distance` from the light, in `[0, 1]`
    ///
    /// ```text
    /// 1 - clamp((distance - inner) / (|outer - inner| + 1), 0, 1)
    /// ```
    pub fn illuminance(&self, distance: f32) -> f32 {
        illuminance(distance, self.inner_radius, self.outer_radius)
    }
}

/// Falloff shared by `LightSource::illuminance`
pub fn illuminance(distance: f32, inner_radius: f32, outer_radius: f32) -> f32 {
    let fade = (outer_radius - inner_radius).abs() + 1.0;
    let dimmed = ((distance - inner_radius).max(0.0) / fade).min(1.0);
    // NaN distances count as fully lit
    (1.0 - dimmed).clamp(0.0, 1.0)
}

/// Canvas-relative light settings
///
/// Position is a fraction of the canvas width/height; radii are fractions of
/// the canvas' larger side.
#[derive(Clone, Debug, PartialEq)]
pub struct LightController {
    x: f32,
    y: f32,
    inner: f32,
    outer: f32,
    color: Color,
}

impl Default for LightController {
    fn default() -> Self {
        Self {
            x: 0.5,
            y: 0.5,
            inner: 0.2,
            outer: 0.8,
            color: Color::WHITE,
        }
    }
}

/// Range of the position fractions
pub const POSITION_RANGE: (f32, f32) = (-1.0, 2.0);
/// Range of the radius fractions
pub const RADIUS_RANGE: (f32, f32) = (0.1, 4.0);

fn set_clamped(field: &mut f32, value: f32, range: (f32, f32)) -> bool {
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

impl LightController {
    pub fn x(&self) -> f32 {
        self.x
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn inner(&self) -> f32 {
        self.inner
    }

    pub fn outer(&self) -> f32 {
        self.outer
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns `true` if the value changed
    pub fn set_x(&mut self, fraction: f32) -> bool {
        set_clamped(&mut self.x, fraction, POSITION_RANGE)
    }

    pub fn set_y(&mut self, fraction: f32) -> bool {
        set_clamped(&mut self.y, fraction, POSITION_RANGE)
    }

    pub fn set_inner(&mut self, fraction: f32) -> bool {
        set_clamped(&mut self.inner, fraction, RADIUS_RANGE)
    }

    pub fn set_outer(&mut self, fraction: f32) -> bool {
        set_clamped(&mut self.outer, fraction, RADIUS_RANGE)
    }

    pub fn set_color(&mut self, color: Color) -> bool {
        if color == self.color {
            return false;
        }
        self.color = color;
        true
    }

    /// Resolve against a canvas of `width` x `height` pixels
    ///
    /// An inner radius beyond the outer one collapses onto the outer radius.
    pub fn resolve(&self, width: f32, height: f32) -> LightSource {
        let span = width.max(height);
        let outer_radius = span * self.outer;
        let inner_radius = if self.inner <= self.outer {
            span * self.inner
        } else {
            outer_radius
        };
        LightSource {
            position: Point2::new(width * self.x, height * self.y),
            inner_radius,
            outer_radius,
            color: self.color,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illuminance_bounds() {
        let radii = [(0.0, 0.0), (10.0, 100.0), (100.0, 10.0), (50.0, 50.0)];
        for (inner, outer) in radii {
            for d in [0.0, 1.0, 9.5, 50.0, 99.0, 500.0, 1e9] {
                let lit = illuminance(d, inner, outer);
                assert!((0.0..=1.0).contains(&lit), "d={} -> {}", d, lit);
            }
            assert_eq!(illuminance(inner, inner, outer), 1.0);
        }
    }

    #[test]
    fn test_illuminance_falloff() {
        // Band of 90 px plus the +1 guard
        assert!((illuminance(55.0, 10.0, 100.0) - (1.0 - 45.0 / 91.0)).abs() < 1e-6);
        assert_eq!(illuminance(200.0, 10.0, 100.0), 0.0);
        // Coincident radii: a one-pixel ramp
        assert!((illuminance(50.5, 50.0, 50.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_default_light_is_white_and_lit() {
        let light = LightSource::default();
        assert_eq!(light.color, Color::WHITE);
        assert_eq!(light.illuminance(1e6), 1.0);
    }

    #[test]
    fn test_resolve() {
        let light = LightController::default().resolve(800.0, 600.0);
        assert_eq!(light.position, Point2::new(400.0, 300.0));
        assert!((light.inner_radius - 160.0).abs() < 1e-4);
        assert!((light.outer_radius - 640.0).abs() < 1e-4);
    }

    #[test]
    fn test_crossed_radii_collapse() {
        let mut ctl = LightController::default();
        assert!(ctl.set_inner(2.0));
        let light = ctl.resolve(100.0, 50.0);
        assert_eq!(light.inner_radius, light.outer_radius);
        assert!((light.outer_radius - 80.0).abs() < 1e-4);
    }

    #[test]
    fn test_setters_clamp_and_suppress() {
        let mut ctl = LightController::default();
        assert!(!ctl.set_x(0.5));
        assert!(ctl.set_x(5.0));
        assert_eq!(ctl.x(), 2.0);
        assert!(!ctl.set_x(3.0));
        assert!(!ctl.set_y(f32::NAN));
        assert!(ctl.set_outer(0.0));
        assert_eq!(ctl.outer(), 0.1);
        assert!(!ctl.set_color(Color::WHITE));
        assert!(ctl.set_color(Color::BLACK));
    }
}
