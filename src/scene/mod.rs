//! Scene - composition root for layers, light and background
//!
//! The scene owns the canvas bounds and the light. Whenever either changes it
//! pushes the new value down to every layer; layers never hold a reference
//! back to the scene.
//!
//! ## Render order
//!
//! 1. Clear to transparent
//! 2. Radial background around the light (if visible)
//! 3. Each visible layer, first added drawn first

mod light;

pub use light::{illuminance, LightController, LightSource, POSITION_RANGE, RADIUS_RANGE};

use std::any::Any;
use std::path::Path;

use nalgebra::Point2;
use tiny_skia::Color;

use crate::render::{Canvas, GradientStop, Paint, PixmapCanvas};

/// Canvas size in pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point2<f32> {
        Point2::new(self.width / 2.0, self.height / 2.0)
    }

    /// The larger of width and height
    pub fn max_side(&self) -> f32 {
        self.width.max(self.height)
    }
}

/// Something the scene draws and keeps informed
pub trait Layer {
    fn name(&self) -> &str;

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// The canvas was resized
    fn bounds_changed(&mut self, bounds: Bounds);

    /// The light moved, resized or changed color
    fn light_changed(&mut self, light: &LightSource);

    /// A parameter drag started (`true`) or ended (`false`)
    fn set_interacting(&mut self, interacting: bool);

    fn draw(&mut self, canvas: &mut dyn Canvas);

    /// Returns and clears the layer's pending redraw request
    fn take_redraw_request(&mut self) -> bool;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Radial backdrop centered on the light
#[derive(Clone, Debug, PartialEq)]
pub struct Background {
    pub visible: bool,
    /// Color at the light
    pub lit: Color,
    /// Color at the light's outer radius and beyond
    pub unlit: Color,
}

impl Default for Background {
    fn default() -> Self {
        Self {
            visible: true,
            lit: Color::from_rgba8(63, 63, 63, 255),
            unlit: Color::from_rgba8(15, 15, 15, 255),
        }
    }
}

impl Background {
    pub fn paint(&self, light: &LightSource) -> Paint {
        Paint::Radial {
            center: light.position,
            inner_radius: 0.0,
            outer_radius: light.outer_radius,
            stops: vec![
                GradientStop::new(0.0, self.lit),
                GradientStop::new(1.0, self.unlit),
            ],
        }
    }
}

pub struct Scene {
    bounds: Bounds,
    light: LightController,
    resolved: LightSource,
    background: Background,
    layers: Vec<Box<dyn Layer>>,
    redraw: bool,
}

impl Scene {
    pub fn new(bounds: Bounds) -> Self {
        let light = LightController::default();
        let resolved = light.resolve(bounds.width, bounds.height);
        Self {
            bounds,
            light,
            resolved,
            background: Background::default(),
            layers: Vec::new(),
            redraw: true,
        }
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// Resize the canvas, re-resolving the light
    pub fn set_bounds(&mut self, bounds: Bounds) -> bool {
        if bounds == self.bounds {
            return false;
        }
        log::debug!("Scene resized to {}x{}", bounds.width, bounds.height);
        self.bounds = bounds;
        for layer in &mut self.layers {
            layer.bounds_changed(bounds);
        }
        self.refresh_light();
        self.redraw = true;
        true
    }

    /// Light settings, canvas-relative
    pub fn light_controller(&self) -> &LightController {
        &self.light
    }

    /// The light in canvas pixels
    pub fn light(&self) -> &LightSource {
        &self.resolved
    }

    /// Edit the light settings
    ///
    /// `edit` returns whether it changed anything; only then is the light
    /// re-resolved and pushed to the layers.
    pub fn edit_light(&mut self, edit: impl FnOnce(&mut LightController) -> bool) -> bool {
        if !edit(&mut self.light) {
            return false;
        }
        self.refresh_light();
        self.redraw = true;
        true
    }

    fn refresh_light(&mut self) {
        let resolved = self.light.resolve(self.bounds.width, self.bounds.height);
        if resolved == self.resolved {
            return;
        }
        log::debug!(
            "Light at ({:.0}, {:.0}), radii {:.0}..{:.0}",
            resolved.position.x,
            resolved.position.y,
            resolved.inner_radius,
            resolved.outer_radius
        );
        self.resolved = resolved;
        for layer in &mut self.layers {
            layer.light_changed(&resolved);
        }
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn set_background_visible(&mut self, visible: bool) -> bool {
        if visible == self.background.visible {
            return false;
        }
        self.background.visible = visible;
        self.redraw = true;
        true
    }

    /// Set the background colors at the light and beyond its outer radius
    pub fn set_background_colors(&mut self, lit: Color, unlit: Color) -> bool {
        if lit == self.background.lit && unlit == self.background.unlit {
            return false;
        }
        self.background.lit = lit;
        self.background.unlit = unlit;
        self.redraw = true;
        true
    }

    /// Append a layer, bringing it up to date with bounds and light
    ///
    /// Returns the layer's index.
    pub fn add_layer(&mut self, mut layer: Box<dyn Layer>) -> usize {
        layer.bounds_changed(self.bounds);
        layer.light_changed(&self.resolved);
        log::info!("Added layer '{}'", layer.name());
        self.layers.push(layer);
        self.redraw = true;
        self.layers.len() - 1
    }

    pub fn layers(&self) -> &[Box<dyn Layer>] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer_mut(&mut self, index: usize) -> Option<&mut (dyn Layer + 'static)> {
        self.layers.get_mut(index).map(|l| &mut **l)
    }

    /// First layer of concrete type `T`
    pub fn find_layer_mut<T: Layer + 'static>(&mut self) -> Option<&mut T> {
        self.layers
            .iter_mut()
            .find_map(|l| l.as_any_mut().downcast_mut::<T>())
    }

    /// Forward a press to every layer
    pub fn begin_interaction(&mut self) {
        for layer in &mut self.layers {
            layer.set_interacting(true);
        }
    }

    /// Forward a release to every layer and request a full-quality redraw
    pub fn end_interaction(&mut self) {
        for layer in &mut self.layers {
            layer.set_interacting(false);
        }
        self.redraw = true;
    }

    /// Returns and clears the pending redraw request of the scene and every
    /// layer
    pub fn take_redraw_request(&mut self) -> bool {
        let mut redraw = std::mem::take(&mut self.redraw);
        for layer in &mut self.layers {
            redraw |= layer.take_redraw_request();
        }
        redraw
    }

    /// Render the current frame offscreen at the scene's size and write it to
    /// `path` as PNG
    pub fn export_png(&mut self, path: impl AsRef<Path>) -> crate::Result<()> {
        let path = path.as_ref();
        let width = self.bounds.width.round().max(0.0) as u32;
        let height = self.bounds.height.round().max(0.0) as u32;

        let mut canvas = PixmapCanvas::new(width, height)?;
        self.render(&mut canvas);
        canvas.save_png(path)?;

        log::info!("Exported {}x{} frame to {}", width, height, path.display());
        Ok(())
    }

    pub fn render(&mut self, canvas: &mut dyn Canvas) {
        canvas.clear(Color::TRANSPARENT);
        if self.background.visible {
            canvas.fill_all(&self.background.paint(&self.resolved));
        }
        for layer in &mut self.layers {
            if layer.is_visible() {
                layer.draw(canvas);
            }
        }
    }
}
