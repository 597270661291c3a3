//! Color engine - per-instance hue, saturation, lightness and fill
//!
//! Instance colors are HSL values drawn within the configured ranges, then
//! tinted by the light color and dimmed by the instance's illuminance.
//! Fills are two-stop alpha gradients across each shape.

use nalgebra::{Affine2, Point2};
use tiny_skia::Color;

use super::lighting::LightMetric;
use super::params::Params;
use crate::random::RandomField;
use crate::render::{with_alpha, GradientStop, Paint};

/// Hue of one instance as a fraction of a full turn, in `[0, 1)`
pub fn hue(sample: f32, params: &Params) -> f32 {
    let degrees = params.hue_variation * (sample - 0.5) + params.hue;
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    (degrees.rem_euclid(360.0) / 360.0) % 1.0
}

/// A value within `[min, max]` percent, as a fraction
///
/// Crossed bounds (`min > max`) collapse to their average with no variation.
pub fn spread(sample: f32, min: f32, max: f32) -> f32 {
    if min <= max {
        min / 100.0 + sample * (max - min) / 100.0
    } else {
        (min + max) / 200.0
    }
}

/// HSL to RGB, every component in `[0, 1]`
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h6 = h.rem_euclid(1.0) * 6.0;
    let x = c * (1.0 - (h6 % 2.0 - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h6 as i32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    [r + m, g + m, b + m]
}

/// Opaque color from an HSL triple, tinted by `light` and scaled by
/// `illuminance`
pub fn lit_color(hsl: [f32; 3], light: Color, illuminance: f32) -> Color {
    let [r, g, b] = hsl_to_rgb(hsl[0], hsl[1], hsl[2]);
    let channel = |c: f32, tint: f32| (c * tint * illuminance).clamp(0.0, 1.0);
    Color::from_rgba(
        channel(r, light.red()),
        channel(g, light.green()),
        channel(b, light.blue()),
        1.0,
    )
    .unwrap_or(Color::BLACK)
}

/// Leading fill alpha: `255 - (255 - min_opacity) * sample`
pub fn fill_alpha(sample: f32, min_opacity: u8) -> u8 {
    let fade = ((255 - min_opacity) as f32 * sample.clamp(0.0, 1.0)) as u8;
    255 - fade
}

/// Fill of one instance: the paint plus its leading alpha
///
/// The leading alpha also scales the instance's shadow.
#[derive(Clone, Debug, PartialEq)]
pub struct Fill {
    pub paint: Paint,
    pub alpha: u8,
}

/// Linear gradient across the shape's local X extent
///
/// Runs from local `(-1, 0)` to `(1, 0)` mapped through `xform`; the trailing
/// stop is capped at `gradient_opacity`.
pub fn fill_gradient(xform: &Affine2<f32>, color: Color, alpha: u8, gradient_opacity: u8) -> Paint {
    Paint::Linear {
        start: xform.transform_point(&Point2::new(-1.0, 0.0)),
        end: xform.transform_point(&Point2::new(1.0, 0.0)),
        stops: vec![
            GradientStop::new(0.0, with_alpha(color, alpha)),
            GradientStop::new(1.0, with_alpha(color, alpha.min(gradient_opacity))),
        ],
    }
}

pub fn compute_hues(out: &mut Vec<f32>, field: &RandomField, params: &Params) {
    let count = params.quantity.min(field.capacity());
    out.clear();
    out.extend(field.hue[..count].iter().map(|&u| hue(u, params)));
}

pub fn compute_saturations(out: &mut Vec<f32>, field: &RandomField, params: &Params) {
    let count = params.quantity.min(field.capacity());
    out.clear();
    out.extend(
        field.saturation[..count]
            .iter()
            .map(|&u| spread(u, params.min_saturation, params.max_saturation)),
    );
}

pub fn compute_lightnesses(out: &mut Vec<f32>, field: &RandomField, params: &Params) {
    let count = params.quantity.min(field.capacity());
    out.clear();
    out.extend(
        field.lightness[..count]
            .iter()
            .map(|&u| spread(u, params.min_lightness, params.max_lightness)),
    );
}

/// Final colors from the clamped HSL arrays and light metrics
pub fn compute_colors(
    out: &mut Vec<Color>,
    hues: &[f32],
    saturations: &[f32],
    lightnesses: &[f32],
    metrics: &[LightMetric],
    light: Color,
) {
    out.clear();
    out.extend(
        hues.iter()
            .zip(saturations)
            .zip(lightnesses)
            .zip(metrics)
            .map(|(((&h, &s), &l), m)| lit_color([h, s, l], light, m.illuminance)),
    );
}

pub fn compute_fills(
    out: &mut Vec<Fill>,
    transforms: &[Affine2<f32>],
    colors: &[Color],
    field: &RandomField,
    params: &Params,
) {
    out.clear();
    out.extend(
        transforms
            .iter()
            .zip(colors)
            .zip(&field.opacity)
            .map(|((xf, &color), &sample)| {
                let alpha = fill_alpha(sample, params.min_opacity);
                Fill {
                    paint: fill_gradient(xf, color, alpha, params.gradient_opacity),
                    alpha,
                }
            }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confetti::transform::compose;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_hsl_primaries() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), [0.0, 1.0, 0.0]));
        assert!(close(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), [0.0, 0.0, 1.0]));
        assert!(close(hsl_to_rgb(0.5, 1.0, 0.5), [0.0, 1.0, 1.0]));
    }

    #[test]
    fn test_hsl_gray_and_extremes() {
        assert!(close(hsl_to_rgb(0.3, 0.0, 0.25), [0.25, 0.25, 0.25]));
        assert!(close(hsl_to_rgb(0.7, 1.0, 0.0), [0.0, 0.0, 0.0]));
        assert!(close(hsl_to_rgb(0.7, 1.0, 1.0), [1.0, 1.0, 1.0]));
        // Pastel red
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.75), [1.0, 0.5, 0.5]));
    }

    #[test]
    fn test_hue_wraps() {
        let mut params = Params::new(8);
        params.hue = 350.0;
        params.hue_variation = 40.0;
        // 350 + 40 * 0.5 = 370 -> 10 degrees
        assert!((hue(1.0, &params) - 10.0 / 360.0).abs() < 1e-5);
        params.hue = 0.0;
        // -20 degrees -> 340
        assert!((hue(0.0, &params) - 340.0 / 360.0).abs() < 1e-5);
        for u in [0.0, 0.25, 0.5, 0.999] {
            assert!((0.0..1.0).contains(&hue(u, &params)));
        }
    }

    #[test]
    fn test_spread_collapse() {
        for u in [0.0, 0.3, 0.99] {
            assert_eq!(spread(u, 80.0, 20.0), 0.5);
        }
        assert!((spread(0.5, 20.0, 80.0) - 0.5).abs() < 1e-6);
        assert!((spread(0.0, 20.0, 80.0) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_lit_color() {
        let red = [0.0, 1.0, 0.5];
        assert_eq!(lit_color(red, Color::WHITE, 1.0), Color::from_rgba8(255, 0, 0, 255));
        assert_eq!(lit_color(red, Color::WHITE, 0.0), Color::BLACK);

        // A cyan light removes the red channel entirely
        let cyan = Color::from_rgba8(0, 255, 255, 255);
        let c = lit_color([0.0, 0.0, 1.0], cyan, 0.5);
        assert_eq!(c.red(), 0.0);
        assert!((c.green() - 0.5).abs() < 1e-6);
        assert_eq!(c.alpha(), 1.0);
    }

    #[test]
    fn test_fill_alpha() {
        assert_eq!(fill_alpha(0.0, 0), 255);
        assert_eq!(fill_alpha(1.0, 0), 0);
        assert_eq!(fill_alpha(0.7, 255), 255);
        assert_eq!(fill_alpha(0.5, 55), 155);
    }

    #[test]
    fn test_fill_gradient_axis() {
        let xf = compose(Point2::new(100.0, 50.0), 10.0, 0.0);
        let paint = fill_gradient(&xf, Color::WHITE, 200, 100);
        match paint {
            Paint::Linear { start, end, stops } => {
                assert!((start - Point2::new(90.0, 50.0)).norm() < 1e-4);
                assert!((end - Point2::new(110.0, 50.0)).norm() < 1e-4);
                assert!((stops[0].color.alpha() - 200.0 / 255.0).abs() < 1e-6);
                assert!((stops[1].color.alpha() - 100.0 / 255.0).abs() < 1e-6);
            }
            _ => panic!("expected a linear gradient"),
        }
        // Trailing stop never exceeds the leading one
        if let Paint::Linear { stops, .. } = fill_gradient(&xf, Color::WHITE, 50, 191) {
            assert_eq!(stops[0].color.alpha(), stops[1].color.alpha());
        }
    }
}
