//! Confetti layer - a lit, randomized scatter of shapes
//!
//! The layer turns a small set of global parameters plus a fixed random field
//! into per-instance transforms, colors and gradients, and draws them.
//!
//! ## Lazy recompute
//!
//! Setters only store the new value and invalidate the derived arrays whose
//! formula reads it (see `cache`). Arrays are rebuilt on demand when they are
//! read, each `compute_*` bringing its own inputs up to date first, so one
//! draw recomputes in the order transforms, light metrics, color, gradients.
//!
//! ## Submodules
//!
//! - `params` - parameter values and clamp ranges
//! - `cache` - invalidation state and the dependency graph
//! - `transform`, `lighting`, `color` - the per-instance formulas
//! - `render` - quality governor and the draw pass

pub mod cache;
pub mod color;
pub mod lighting;
pub mod params;
pub mod render;
pub mod transform;

pub use cache::{Derived, EntryState, InvalidationCache};
pub use color::Fill;
pub use lighting::{Highlight, LightMetric};
pub use params::{Params, MAX_BORDER};
pub use render::{QualityGovernor, RenderMode};

use std::any::Any;
use std::time::Instant;

use flagset::FlagSet;
use nalgebra::Affine2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tiny_skia::Color;

use crate::config::ConfettiConfig;
use crate::random::RandomField;
use crate::render::Canvas;
use crate::scene::{Bounds, Layer, LightSource};
use crate::shapes::{Outline, Shape, ShapeCatalog};
use params::{
    clamp_quantity, update, update_alpha, ANGLE_RANGE, BORDER_RANGE, HUE_RANGE, PERCENT_RANGE,
    POS_RANDOMNESS_RANGE, RADIUS_RANGE, RADIUS_VARIATION_RANGE, SHADOW_DIVISOR_RANGE,
    SPECULAR_SHAPE_RANGE,
};

/// The first `n` items, or all of them if there are fewer
fn prefix<T>(items: &[T], n: usize) -> &[T] {
    &items[..n.min(items.len())]
}

/// Cache-managed per-instance arrays
#[derive(Default)]
struct DerivedArrays {
    transforms: Vec<Affine2<f32>>,
    shapes: Vec<Shape>,
    metrics: Vec<LightMetric>,
    hues: Vec<f32>,
    saturations: Vec<f32>,
    lightnesses: Vec<f32>,
    colors: Vec<Color>,
    fills: Vec<Fill>,
    highlights: Vec<Highlight>,
}

/// A scatter layer
pub struct Confetti {
    name: String,
    visible: bool,
    max_quantity: usize,
    params: Params,
    catalog: ShapeCatalog,
    rng: StdRng,
    field: RandomField,
    bounds: Bounds,
    light: LightSource,
    cache: InvalidationCache,
    arrays: DerivedArrays,
    governor: QualityGovernor,
    redraw: bool,
}

impl Confetti {
    /// Create a layer with randomized defaults
    ///
    /// The light starts as the default white light until the scene pushes
    /// its own.
    pub fn new(config: &ConfettiConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let max_quantity = config.max_quantity.max(1);
        let params = Params::randomized(&mut rng, max_quantity);
        let catalog = ShapeCatalog::standard(&mut rng);
        let field = RandomField::generate(&mut rng, max_quantity);

        log::info!(
            "Created confetti layer: {} of {} slots, hue {}±{}",
            params.quantity,
            max_quantity,
            params.hue,
            params.hue_variation / 2.0
        );

        Self {
            name: "Confetti".to_string(),
            visible: true,
            max_quantity,
            params,
            catalog,
            rng,
            field,
            bounds: Bounds::new(config.width as f32, config.height as f32),
            light: LightSource::default(),
            cache: InvalidationCache::new(),
            arrays: DerivedArrays::default(),
            governor: QualityGovernor::new(),
            redraw: true,
        }
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn catalog(&self) -> &ShapeCatalog {
        &self.catalog
    }

    pub fn max_quantity(&self) -> usize {
        self.max_quantity
    }

    pub fn quantity(&self) -> usize {
        self.params.quantity
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn light(&self) -> &LightSource {
        &self.light
    }

    pub fn cache(&self) -> &InvalidationCache {
        &self.cache
    }

    pub fn governor(&self) -> &QualityGovernor {
        &self.governor
    }

    /// Mode the next draw will use
    pub fn render_mode(&self) -> RenderMode {
        self.governor.mode()
    }

    /// Invalidate `roots` and request a redraw if `changed`
    fn changed(&mut self, changed: bool, what: &str, roots: FlagSet<Derived>) -> bool {
        if changed {
            self.cache.invalidate(roots);
            self.redraw = true;
            log::debug!("Confetti {} changed", what);
        }
        changed
    }

    // Parameter setters. Each clamps, ignores no-op updates and returns
    // whether the effective value changed.

    /// Active instance count, clamped to `0..=max_quantity`
    pub fn set_quantity(&mut self, value: i64) -> bool {
        let value = clamp_quantity(value, self.max_quantity);
        let changed = value != self.params.quantity;
        self.params.quantity = value;
        self.changed(changed, "quantity", FlagSet::default())
    }

    /// Jitter blend, per mille
    pub fn set_pos_randomness(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.pos_randomness, value, POS_RANDOMNESS_RANGE);
        self.changed(c, "position randomness", Derived::Transforms.into())
    }

    /// Base rotation, radians
    pub fn set_theta(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.theta, value, ANGLE_RANGE);
        self.changed(c, "theta", Derived::Transforms.into())
    }

    pub fn set_theta_variation(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.theta_variation, value, ANGLE_RANGE);
        self.changed(c, "theta variation", Derived::Transforms.into())
    }

    pub fn set_radius(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.radius, value, RADIUS_RANGE);
        self.changed(c, "radius", Derived::Transforms.into())
    }

    pub fn set_radius_variation(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.radius_variation, value, RADIUS_VARIATION_RANGE);
        self.changed(c, "radius variation", Derived::Transforms.into())
    }

    /// Size distribution skew, percent
    pub fn set_radius_power(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.radius_power, value, PERCENT_RANGE);
        self.changed(c, "radius power", Derived::Transforms.into())
    }

    pub fn set_edge_thickness(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.edge_thickness, value, BORDER_RANGE);
        self.changed(c, "edge thickness", FlagSet::default())
    }

    /// Degrees
    pub fn set_hue(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.hue, value, HUE_RANGE);
        self.changed(c, "hue", Derived::Hue.into())
    }

    pub fn set_hue_variation(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.hue_variation, value, HUE_RANGE);
        self.changed(c, "hue variation", Derived::Hue.into())
    }

    pub fn set_min_saturation(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.min_saturation, value, PERCENT_RANGE);
        self.changed(c, "min saturation", Derived::Saturation.into())
    }

    pub fn set_max_saturation(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.max_saturation, value, PERCENT_RANGE);
        self.changed(c, "max saturation", Derived::Saturation.into())
    }

    pub fn set_min_lightness(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.min_lightness, value, PERCENT_RANGE);
        self.changed(c, "min lightness", Derived::Lightness.into())
    }

    pub fn set_max_lightness(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.max_lightness, value, PERCENT_RANGE);
        self.changed(c, "max lightness", Derived::Lightness.into())
    }

    pub fn set_min_opacity(&mut self, value: u8) -> bool {
        let c = update_alpha(&mut self.params.min_opacity, value);
        self.changed(c, "min opacity", Derived::FillGradients.into())
    }

    pub fn set_gradient_opacity(&mut self, value: u8) -> bool {
        let c = update_alpha(&mut self.params.gradient_opacity, value);
        self.changed(c, "gradient opacity", Derived::FillGradients.into())
    }

    pub fn set_shadow_opacity(&mut self, value: u8) -> bool {
        let c = update_alpha(&mut self.params.shadow_opacity, value);
        self.changed(c, "shadow opacity", FlagSet::default())
    }

    /// Larger divisors pull shadows closer to their shapes
    pub fn set_shadow_divisor(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.shadow_divisor, value, SHADOW_DIVISOR_RANGE);
        self.changed(c, "shadow divisor", Derived::LightMetrics.into())
    }

    pub fn set_specular_brightness(&mut self, value: u8) -> bool {
        let c = update_alpha(&mut self.params.specular_brightness, value);
        self.changed(c, "specular brightness", Derived::Specular.into())
    }

    /// Percent
    pub fn set_specular_depth(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.specular_depth, value, SPECULAR_SHAPE_RANGE);
        self.changed(c, "specular depth", Derived::Specular.into())
    }

    /// Percent
    pub fn set_specular_sharpness(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.specular_sharpness, value, SPECULAR_SHAPE_RANGE);
        self.changed(c, "specular sharpness", Derived::Specular.into())
    }

    pub fn set_bevel_thickness(&mut self, value: f32) -> bool {
        let c = update(&mut self.params.bevel_thickness, value, BORDER_RANGE);
        self.changed(c, "bevel thickness", Derived::Specular.into())
    }

    /// Relative frequency of catalog entry `index`
    pub fn set_shape_weight(&mut self, index: usize, weight: u32) -> bool {
        let c = self.catalog.set_weight(index, weight);
        self.changed(c, "shape weight", Derived::TransformedShapes.into())
    }

    /// Draw a new random field from the layer's RNG stream
    pub fn reshuffle(&mut self) {
        self.field = RandomField::generate(&mut self.rng, self.max_quantity);
        self.reshuffled();
    }

    /// Draw a new random field from a fresh seed
    pub fn reshuffle_with_seed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.field = RandomField::generate(&mut self.rng, self.max_quantity);
        self.reshuffled();
    }

    fn reshuffled(&mut self) {
        self.cache.invalidate_all();
        self.redraw = true;
        log::debug!("Confetti reshuffled");
    }

    // Compute operations. Each returns at once if its array is valid for the
    // active quantity, otherwise brings its inputs up to date and rebuilds.

    pub fn compute_transforms(&mut self) {
        if self.cache.is_valid(Derived::Transforms, self.params.quantity) {
            return;
        }
        transform::compute_transforms(
            &mut self.arrays.transforms,
            &self.field,
            &self.params,
            self.bounds,
        );
        self.cache
            .mark_valid(Derived::Transforms, self.arrays.transforms.len());
    }

    pub fn compute_transformed_shapes(&mut self) {
        if self.cache.is_valid(Derived::TransformedShapes, self.params.quantity) {
            return;
        }
        self.compute_transforms();

        if self.catalog.total_weight() == 0 {
            log::warn!("All shape weights are zero, using the default shape");
        }
        let catalog = &self.catalog;
        let shapes = &mut self.arrays.shapes;
        shapes.clear();
        shapes.extend(
            self.arrays
                .transforms
                .iter()
                .zip(&self.field.shape)
                .filter_map(|(xf, &u)| catalog.pick(u).map(|s| s.transformed(xf))),
        );
        self.cache
            .mark_valid(Derived::TransformedShapes, shapes.len());
    }

    pub fn compute_light_metrics(&mut self) {
        if self.cache.is_valid(Derived::LightMetrics, self.params.quantity) {
            return;
        }
        self.compute_transforms();
        lighting::compute_light_metrics(
            &mut self.arrays.metrics,
            &self.arrays.transforms,
            &self.light,
            self.params.shadow_divisor,
        );
        self.cache
            .mark_valid(Derived::LightMetrics, self.arrays.metrics.len());
    }

    pub fn compute_hues(&mut self) {
        if self.cache.is_valid(Derived::Hue, self.params.quantity) {
            return;
        }
        color::compute_hues(&mut self.arrays.hues, &self.field, &self.params);
        self.cache.mark_valid(Derived::Hue, self.arrays.hues.len());
    }

    pub fn compute_saturations(&mut self) {
        if self.cache.is_valid(Derived::Saturation, self.params.quantity) {
            return;
        }
        color::compute_saturations(&mut self.arrays.saturations, &self.field, &self.params);
        self.cache
            .mark_valid(Derived::Saturation, self.arrays.saturations.len());
    }

    pub fn compute_lightnesses(&mut self) {
        if self.cache.is_valid(Derived::Lightness, self.params.quantity) {
            return;
        }
        self.compute_light_metrics();
        color::compute_lightnesses(&mut self.arrays.lightnesses, &self.field, &self.params);
        self.cache
            .mark_valid(Derived::Lightness, self.arrays.lightnesses.len());
    }

    pub fn compute_colors(&mut self) {
        if self.cache.is_valid(Derived::Color, self.params.quantity) {
            return;
        }
        self.compute_hues();
        self.compute_saturations();
        self.compute_lightnesses();
        self.compute_light_metrics();
        color::compute_colors(
            &mut self.arrays.colors,
            &self.arrays.hues,
            &self.arrays.saturations,
            &self.arrays.lightnesses,
            &self.arrays.metrics,
            self.light.color,
        );
        self.cache.mark_valid(Derived::Color, self.arrays.colors.len());
    }

    pub fn compute_fills(&mut self) {
        if self.cache.is_valid(Derived::FillGradients, self.params.quantity) {
            return;
        }
        self.compute_transforms();
        self.compute_colors();
        color::compute_fills(
            &mut self.arrays.fills,
            &self.arrays.transforms,
            &self.arrays.colors,
            &self.field,
            &self.params,
        );
        self.cache
            .mark_valid(Derived::FillGradients, self.arrays.fills.len());
    }

    pub fn compute_highlights(&mut self) {
        if self.cache.is_valid(Derived::Specular, self.params.quantity) {
            return;
        }
        self.compute_transformed_shapes();
        self.compute_light_metrics();
        self.compute_colors();
        lighting::compute_highlights(
            &mut self.arrays.highlights,
            &self.arrays.shapes,
            &self.arrays.metrics,
            &self.arrays.colors,
            &self.light,
            &self.params,
        );
        self.cache
            .mark_valid(Derived::Specular, self.arrays.highlights.len());
    }

    // Readers. Each forces its array up to date and returns the active
    // prefix.

    pub fn transforms(&mut self) -> &[Affine2<f32>] {
        self.compute_transforms();
        prefix(&self.arrays.transforms, self.params.quantity)
    }

    pub fn transformed_shapes(&mut self) -> &[Shape] {
        self.compute_transformed_shapes();
        prefix(&self.arrays.shapes, self.params.quantity)
    }

    pub fn light_metrics(&mut self) -> &[LightMetric] {
        self.compute_light_metrics();
        prefix(&self.arrays.metrics, self.params.quantity)
    }

    pub fn hues(&mut self) -> &[f32] {
        self.compute_hues();
        prefix(&self.arrays.hues, self.params.quantity)
    }

    pub fn saturations(&mut self) -> &[f32] {
        self.compute_saturations();
        prefix(&self.arrays.saturations, self.params.quantity)
    }

    pub fn lightnesses(&mut self) -> &[f32] {
        self.compute_lightnesses();
        prefix(&self.arrays.lightnesses, self.params.quantity)
    }

    pub fn colors(&mut self) -> &[Color] {
        self.compute_colors();
        prefix(&self.arrays.colors, self.params.quantity)
    }

    pub fn fills(&mut self) -> &[Fill] {
        self.compute_fills();
        prefix(&self.arrays.fills, self.params.quantity)
    }

    pub fn highlights(&mut self) -> &[Highlight] {
        self.compute_highlights();
        prefix(&self.arrays.highlights, self.params.quantity)
    }

    /// Draw the active instances
    pub fn render(&mut self, canvas: &mut dyn Canvas) {
        let mode = self.governor.mode();
        let fast = mode.is_fast();
        let needs_highlights =
            self.params.specular_brightness > 0 || self.params.bevel_thickness > 0.0;

        self.compute_transformed_shapes();
        self.compute_colors();
        if !fast {
            self.compute_fills();
            if needs_highlights {
                self.compute_highlights();
            }
        }

        let n = self.params.quantity;
        let arrays = &self.arrays;
        let frame = render::Frame {
            shapes: prefix(&arrays.shapes, n),
            colors: prefix(&arrays.colors, n),
            metrics: prefix(&arrays.metrics, n),
            fills: (!fast).then(|| prefix(&arrays.fills, n)),
            highlights: (!fast && needs_highlights).then(|| prefix(&arrays.highlights, n)),
            params: &self.params,
            mode,
        };

        let start = Instant::now();
        render::draw_instances(canvas, &frame);
        let elapsed = start.elapsed();

        log::debug!("Drew {} instances in {:?} ({:?})", n, elapsed, mode);
        self.governor.record(mode, elapsed);
    }
}

impl Layer for Confetti {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn set_visible(&mut self, visible: bool) {
        if visible != self.visible {
            self.visible = visible;
            self.redraw = true;
        }
    }

    fn bounds_changed(&mut self, bounds: Bounds) {
        let c = bounds != self.bounds;
        self.bounds = bounds;
        self.changed(c, "bounds", Derived::Transforms.into());
    }

    fn light_changed(&mut self, light: &LightSource) {
        let c = *light != self.light;
        self.light = *light;
        self.changed(c, "light", Derived::LightMetrics | Derived::Color);
    }

    fn set_interacting(&mut self, interacting: bool) {
        self.governor.set_interacting(interacting);
        if !interacting {
            self.redraw = true;
        }
    }

    fn draw(&mut self, canvas: &mut dyn Canvas) {
        self.render(canvas);
    }

    fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw)
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::recording::RecordingCanvas;
    use crate::render::PixmapCanvas;
    use crate::shapes::DEFAULT_ENTRY;
    use flagset::Flags;
    use nalgebra::Point2;
    use std::time::Duration;

    fn layer(seed: u64) -> Confetti {
        Confetti::new(&ConfettiConfig {
            max_quantity: 256,
            seed: Some(seed),
            width: 400,
            height: 300,
        })
    }

    /// Force every derived array
    fn compute_all(c: &mut Confetti) {
        c.compute_fills();
        c.compute_highlights();
    }

    #[test]
    fn test_deterministic_recompute() {
        let mut c = layer(5);
        c.set_specular_brightness(120);
        compute_all(&mut c);
        let transforms = c.transforms().to_vec();
        let shapes = c.transformed_shapes().to_vec();
        let colors = c.colors().to_vec();
        let fills = c.fills().to_vec();
        let highlights = c.highlights().to_vec();

        c.cache.invalidate_all();
        compute_all(&mut c);
        assert_eq!(c.transforms(), &transforms[..]);
        assert_eq!(c.transformed_shapes(), &shapes[..]);
        assert_eq!(c.colors(), &colors[..]);
        assert_eq!(c.fills(), &fills[..]);
        assert_eq!(c.highlights(), &highlights[..]);

        // A second layer with the same seed agrees too
        let mut twin = layer(5);
        twin.set_specular_brightness(120);
        assert_eq!(twin.colors(), &colors[..]);
    }

    #[test]
    fn test_hue_change_keeps_transforms() {
        let mut c = layer(1);
        compute_all(&mut c);
        let transforms = c.cache().recompute_count(Derived::Transforms);
        let metrics = c.cache().recompute_count(Derived::LightMetrics);
        let colors = c.cache().recompute_count(Derived::Color);

        let hue = c.params().hue;
        assert!(c.set_hue((hue + 90.0) % 360.0));
        compute_all(&mut c);
        assert_eq!(c.cache().recompute_count(Derived::Transforms), transforms);
        assert_eq!(c.cache().recompute_count(Derived::LightMetrics), metrics);
        assert_eq!(c.cache().recompute_count(Derived::Color), colors + 1);
    }

    #[test]
    fn test_quantity_clamp() {
        let mut c = layer(2);
        c.set_quantity(257);
        assert_eq!(c.quantity(), 256);
        c.set_quantity(-5);
        assert_eq!(c.quantity(), 0);
        assert!(c.transforms().is_empty());
    }

    #[test]
    fn test_growing_quantity_extends_arrays() {
        let mut c = layer(2);
        c.set_quantity(10);
        assert_eq!(c.colors().len(), 10);
        let first = c.colors()[3];
        let count = c.cache().recompute_count(Derived::Color);

        // Shrinking reuses the longer arrays
        c.set_quantity(4);
        assert_eq!(c.colors().len(), 4);
        assert_eq!(c.cache().recompute_count(Derived::Color), count);

        c.set_quantity(50);
        assert_eq!(c.colors().len(), 50);
        assert_eq!(c.colors()[3], first);
    }

    #[test]
    fn test_saturation_collapse() {
        let mut c = layer(3);
        c.set_min_saturation(80.0);
        c.set_max_saturation(20.0);
        assert!(c.saturations().iter().all(|&s| s == 0.5));
    }

    #[test]
    fn test_spiral_scenario() {
        let mut c = layer(4);
        c.set_quantity(3);
        c.set_pos_randomness(0.0);
        c.set_theta(0.0);
        c.set_theta_variation(0.0);

        let center = Point2::new(200.0, 150.0);
        for (i, xf) in c.transforms().iter().enumerate() {
            let world = xf.transform_point(&Point2::origin());
            let expected = center + transform::arranged_position(i) * 400.0;
            assert!((world - expected).norm() < 1e-4, "slot {}", i);
        }
    }

    #[test]
    fn test_linear_no_variation_scale() {
        let mut c = layer(4);
        c.set_radius(20.0);
        c.set_radius_power(0.0);
        c.set_radius_variation(0.0);
        for xf in c.transforms() {
            let m = xf.matrix();
            let scale = (m[(0, 0)] * m[(0, 0)] + m[(1, 0)] * m[(1, 0)]).sqrt();
            assert!((scale - 20.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_noop_setters() {
        let mut c = layer(6);
        assert!(c.take_redraw_request());
        compute_all(&mut c);
        let before: Vec<u64> = Derived::LIST
            .iter()
            .map(|&d| c.cache().recompute_count(d))
            .collect();

        let p = c.params().clone();
        let weight = c.catalog().get(0).unwrap().weight();
        assert!(!c.set_quantity(p.quantity as i64));
        assert!(!c.set_radius(p.radius));
        assert!(!c.set_hue(p.hue));
        assert!(!c.set_min_opacity(p.min_opacity));
        assert!(!c.set_shadow_divisor(p.shadow_divisor));
        assert!(!c.set_shape_weight(0, weight));
        assert!(!c.take_redraw_request());

        compute_all(&mut c);
        let after: Vec<u64> = Derived::LIST
            .iter()
            .map(|&d| c.cache().recompute_count(d))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_setters_invalidate_their_roots() {
        let mut c = layer(7);
        compute_all(&mut c);

        c.set_min_opacity(10);
        assert_eq!(c.cache().state(Derived::FillGradients), EntryState::Stale);
        assert!(c.cache().is_valid(Derived::Color, 0));

        c.set_shape_weight(2, 99);
        assert_eq!(c.cache().state(Derived::TransformedShapes), EntryState::Stale);
        assert!(c.cache().is_valid(Derived::Transforms, 0));

        c.set_edge_thickness(5.0);
        c.set_shadow_opacity(7);
        assert!(c.cache().is_valid(Derived::Transforms, 0));
        assert!(c.take_redraw_request());
    }

    #[test]
    fn test_resize_rederives_transforms() {
        let mut c = layer(15);
        c.set_pos_randomness(0.0);
        compute_all(&mut c);
        c.take_redraw_request();

        let bounds = Bounds::new(1000.0, 500.0);
        c.bounds_changed(bounds);
        assert_eq!(c.cache().state(Derived::Transforms), EntryState::Stale);
        assert_eq!(c.cache().state(Derived::Specular), EntryState::Stale);
        assert!(c.take_redraw_request());

        let origin = c.transforms()[0].transform_point(&Point2::origin());
        assert!((origin - bounds.center()).norm() < 1e-4);

        // Same size again: nothing to redo
        compute_all(&mut c);
        let before: Vec<u64> = Derived::LIST
            .iter()
            .map(|&d| c.cache().recompute_count(d))
            .collect();
        c.bounds_changed(bounds);
        compute_all(&mut c);
        let after: Vec<u64> = Derived::LIST
            .iter()
            .map(|&d| c.cache().recompute_count(d))
            .collect();
        assert_eq!(before, after);
        assert!(!c.take_redraw_request());
    }

    #[test]
    fn test_light_change_recolors() {
        let mut c = layer(8);
        let mut light = LightSource {
            position: Point2::new(200.0, 150.0),
            inner_radius: 1000.0,
            outer_radius: 2000.0,
            color: Color::WHITE,
        };
        c.light_changed(&light);
        let lit = c.colors().to_vec();

        light.color = Color::BLACK;
        c.light_changed(&light);
        assert!(c.cache().is_valid(Derived::Transforms, 0));
        assert!(c.colors().iter().all(|col| *col == Color::BLACK));
        assert_ne!(c.colors(), &lit[..]);
    }

    #[test]
    fn test_zero_weights_fall_back() {
        let mut c = layer(9);
        for i in 0..c.catalog().len() {
            c.set_shape_weight(i, 0);
        }
        let sides: Vec<usize> = c
            .transformed_shapes()
            .iter()
            .map(|s| match s {
                Shape::Polygon(p) => p.sides(),
                _ => 0,
            })
            .collect();
        assert!(!sides.is_empty());
        assert!(sides.iter().all(|&n| n == DEFAULT_ENTRY + 3));
    }

    #[test]
    fn test_reshuffle_with_seed() {
        let mut a = layer(10);
        let mut b = layer(11);
        a.reshuffle_with_seed(77);
        b.reshuffle_with_seed(77);
        // Only the hue defaults are randomized, so geometry follows the field
        assert_eq!(a.transforms(), b.transforms());

        let before = a.transforms().to_vec();
        a.reshuffle();
        assert_ne!(a.transforms(), &before[..]);
    }

    #[test]
    fn test_fast_render_skips_gradients() {
        let mut c = layer(12);
        c.set_quantity(5);
        c.set_specular_brightness(50);
        c.governor.set_interacting(true);
        c.governor.record(RenderMode::Full, Duration::from_millis(200));
        assert_eq!(c.render_mode(), RenderMode::Fast);

        let mut canvas = RecordingCanvas::new(400, 300);
        c.render(&mut canvas);
        assert!(!c.cache().is_valid(Derived::FillGradients, 0));
        assert!(!c.cache().is_valid(Derived::Specular, 0));
        assert!(canvas
            .tags()
            .iter()
            .all(|t| matches!(*t, "shadow" | "fill_flat" | "stroke")));

        // Release: the next frame is full quality again
        c.set_interacting(false);
        assert!(c.take_redraw_request());
        let mut canvas = RecordingCanvas::new(400, 300);
        c.render(&mut canvas);
        let tags = canvas.tags();
        assert_eq!(tags.iter().filter(|t| **t == "fill_linear").count(), 5);
        // Specular highlights are radial gradients
        assert_eq!(tags.iter().filter(|t| **t == "fill_radial").count(), 5);
    }

    #[test]
    fn test_render_is_repeatable() {
        let mut c = layer(14);
        c.set_quantity(40);
        c.set_specular_brightness(90);
        c.set_bevel_thickness(2.0);

        let mut first = PixmapCanvas::new(400, 300).unwrap();
        c.render(&mut first);
        let mut second = PixmapCanvas::new(400, 300).unwrap();
        c.render(&mut second);
        assert_eq!(first.data(), second.data());
        assert!(first.data().iter().any(|&b| b != 0));
    }

    #[test]
    fn test_empty_quantity_draws_nothing() {
        let mut c = layer(13);
        c.set_quantity(0);
        let mut canvas = RecordingCanvas::new(400, 300);
        c.render(&mut canvas);
        assert!(canvas.calls.is_empty());
    }
}
