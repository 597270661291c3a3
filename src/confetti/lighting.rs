//! Lighting model - light metrics, specular highlights and bevels
//!
//! Every instance is measured against the light once per light or geometry
//! change. The measurements drive the instance's illuminance (color), its
//! shadow offset and the two radial gradients centered on the light:
//!
//! - Specular: a bright ring around the light, placed at the instance's
//!   far edge and widened or narrowed by sharpness
//! - Bevel: light on the near rim, black on the far rim, transparent between

use nalgebra::{Affine2, Point2, Vector2};
use tiny_skia::Color;

use super::params::Params;
use crate::render::{with_alpha, GradientStop, Paint};
use crate::scene::LightSource;
use crate::shapes::{Outline, Shape};

/// Smallest gap kept between inner and outer gradient radii
const MIN_BAND: f32 = 1e-3;

/// Where an instance sits relative to the light
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightMetric {
    /// Instance origin minus light position
    pub offset: Vector2<f32>,
    pub distance: f32,
    /// `[0, 1]`, 1 fully lit
    pub illuminance: f32,
    /// Drop-shadow displacement, pointing away from the light
    pub shadow: Vector2<f32>,
}

impl LightMetric {
    pub fn measure(xform: &Affine2<f32>, light: &LightSource, shadow_divisor: f32) -> Self {
        let origin = xform.transform_point(&Point2::origin());
        let offset = origin - light.position;
        let distance = offset.norm();
        Self {
            offset,
            distance,
            illuminance: light.illuminance(distance),
            shadow: offset / shadow_divisor.max(1.0),
        }
    }
}

pub fn compute_light_metrics(
    out: &mut Vec<LightMetric>,
    transforms: &[Affine2<f32>],
    light: &LightSource,
    shadow_divisor: f32,
) {
    out.clear();
    out.extend(
        transforms
            .iter()
            .map(|xf| LightMetric::measure(xf, light, shadow_divisor)),
    );
}

/// Clamp a gradient band so `0 <= inner < outer`
pub fn band(inner: f32, outer: f32) -> (f32, f32) {
    let inner = inner.max(0.0);
    (inner, outer.max(inner + MIN_BAND))
}

/// Alpha of the highlight: illuminance times brightness
pub fn highlight_alpha(illuminance: f32, brightness: u8) -> u8 {
    (illuminance.clamp(0.0, 1.0) * brightness as f32) as u8
}

/// Specular ring radii for an instance of `radius` at `distance`
///
/// The ring is centered at `max(distance, radius)` shifted by depth (±50% of
/// the radius) and is `radius * (100 - sharpness) / 100` wide on each side.
pub fn specular_band(distance: f32, radius: f32, depth: f32, sharpness: f32) -> (f32, f32) {
    let prime = distance.max(radius) + radius * (depth - 50.0) / 100.0;
    let half_width = radius * (100.0 - sharpness) / 100.0;
    band(prime - half_width, prime + half_width)
}

/// Bevel gradient radii: one radius either side of the instance center
pub fn bevel_band(distance: f32, radius: f32) -> (f32, f32) {
    band(distance.max(radius) - radius, (distance + radius).max(radius))
}

/// Specular and bevel paints of one instance
#[derive(Clone, Debug, PartialEq)]
pub struct Highlight {
    pub specular: Paint,
    pub bevel: Paint,
}

impl Highlight {
    pub fn new(
        metric: &LightMetric,
        radius: f32,
        color: Color,
        light: &LightSource,
        params: &Params,
    ) -> Self {
        let alpha = highlight_alpha(metric.illuminance, params.specular_brightness);
        let lit = with_alpha(light.color, alpha);

        let (inner_radius, outer_radius) = specular_band(
            metric.distance,
            radius,
            params.specular_depth,
            params.specular_sharpness,
        );
        let specular = Paint::Radial {
            center: light.position,
            inner_radius,
            outer_radius,
            stops: vec![
                GradientStop::new(0.0, lit),
                GradientStop::new(1.0, with_alpha(light.color, 0)),
            ],
        };

        let (inner_radius, outer_radius) = bevel_band(metric.distance, radius);
        let bevel = Paint::Radial {
            center: light.position,
            inner_radius,
            outer_radius,
            stops: vec![
                GradientStop::new(0.0, lit),
                GradientStop::new(0.5, with_alpha(color, 0)),
                GradientStop::new(1.0, with_alpha(Color::BLACK, alpha)),
            ],
        };

        Self { specular, bevel }
    }
}

pub fn compute_highlights(
    out: &mut Vec<Highlight>,
    shapes: &[Shape],
    metrics: &[LightMetric],
    colors: &[Color],
    light: &LightSource,
    params: &Params,
) {
    out.clear();
    out.extend(
        shapes
            .iter()
            .zip(metrics)
            .zip(colors)
            .map(|((shape, metric), &color)| {
                Highlight::new(metric, shape.radius(), color, light, params)
            }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confetti::transform::compose;

    fn light() -> LightSource {
        LightSource {
            position: Point2::new(100.0, 100.0),
            inner_radius: 10.0,
            outer_radius: 110.0,
            color: Color::WHITE,
        }
    }

    #[test]
    fn test_measure() {
        let xf = compose(Point2::new(130.0, 140.0), 3.0, 1.0);
        let m = LightMetric::measure(&xf, &light(), 10.0);
        assert!((m.distance - 50.0).abs() < 1e-4);
        assert!((m.shadow - Vector2::new(3.0, 4.0)).norm() < 1e-5);
        assert!((m.illuminance - (1.0 - 40.0 / 101.0)).abs() < 1e-5);
    }

    #[test]
    fn test_shadow_divisor_guard() {
        let xf = compose(Point2::new(110.0, 100.0), 1.0, 0.0);
        let m = LightMetric::measure(&xf, &light(), 0.0);
        assert!((m.shadow.x - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_specular_band() {
        // Far from the light: centered on the distance, depth 50 adds nothing
        let (inner, outer) = specular_band(100.0, 10.0, 50.0, 75.0);
        assert!((inner - 97.5).abs() < 1e-4);
        assert!((outer - 102.5).abs() < 1e-4);
        // Inside the shape the ring starts at its radius
        let (inner, outer) = specular_band(2.0, 10.0, 50.0, 0.0);
        assert_eq!(inner, 0.0);
        assert!((outer - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_band_is_never_degenerate() {
        let (inner, outer) = specular_band(50.0, 10.0, 33.0, 100.0);
        assert!(outer > inner);
        let (inner, outer) = band(-5.0, -10.0);
        assert_eq!(inner, 0.0);
        assert!(outer > inner);
    }

    #[test]
    fn test_bevel_band() {
        let (inner, outer) = bevel_band(50.0, 8.0);
        assert!((inner - 42.0).abs() < 1e-5);
        assert!((outer - 58.0).abs() < 1e-5);
        let (inner, outer) = bevel_band(0.0, 8.0);
        assert_eq!(inner, 0.0);
        assert!((outer - 8.0).abs() < 1e-5);
    }

    #[test]
    fn test_highlight_stops() {
        let mut params = Params::new(8);
        params.specular_brightness = 200;
        let metric = LightMetric {
            offset: Vector2::new(30.0, 0.0),
            distance: 30.0,
            illuminance: 0.5,
            shadow: Vector2::zeros(),
        };
        let red = Color::from_rgba8(255, 0, 0, 255);
        let h = Highlight::new(&metric, 5.0, red, &light(), &params);

        match &h.specular {
            Paint::Radial { center, stops, .. } => {
                assert_eq!(*center, Point2::new(100.0, 100.0));
                assert!((stops[0].color.alpha() - 100.0 / 255.0).abs() < 1e-6);
                assert_eq!(stops[1].color.alpha(), 0.0);
            }
            _ => panic!("expected a radial gradient"),
        }
        match &h.bevel {
            Paint::Radial { stops, .. } => {
                assert_eq!(stops.len(), 3);
                assert_eq!(stops[1].color.red(), 1.0);
                assert_eq!(stops[1].color.alpha(), 0.0);
                assert_eq!(stops[2].color.red(), 0.0);
                assert!((stops[2].color.alpha() - 100.0 / 255.0).abs() < 1e-6);
            }
            _ => panic!("expected a radial gradient"),
        }
    }
}
