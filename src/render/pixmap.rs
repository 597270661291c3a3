//! Raster canvas backed by a tiny-skia pixmap
//!
//! Everything is drawn anti-aliased in canvas pixel coordinates. Gradients
//! map onto tiny-skia shaders; radial gradients are concentric, so the inner
//! radius is folded into the stop offsets.

use std::path::Path;

use image::{ImageFormat, RgbaImage};
use thiserror::Error;
use tiny_skia::{
    Color, FillRule, LinearGradient, Mask, Pixmap, Point, RadialGradient, Shader, SpreadMode,
    Stroke, Transform,
};

use super::canvas::{Canvas, GradientStop, Paint};
use crate::shapes::Shape;

/// Errors that can occur while allocating or reading back a canvas
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Cannot allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },

    #[error("Pixel buffer does not match {width}x{height} image")]
    Image { width: u32, height: u32 },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

fn skia_stops(stops: &[GradientStop]) -> Vec<tiny_skia::GradientStop> {
    stops
        .iter()
        .map(|s| tiny_skia::GradientStop::new(s.offset, s.color))
        .collect()
}

/// Build a shader for `paint`, falling back to a flat color when the
/// gradient is degenerate (zero length, zero radius)
fn shader_for(paint: &Paint) -> Shader<'static> {
    let shader = match paint {
        Paint::Solid(color) => return Shader::SolidColor(*color),
        Paint::Linear { start, end, stops } => LinearGradient::new(
            Point::from_xy(start.x, start.y),
            Point::from_xy(end.x, end.y),
            skia_stops(stops),
            SpreadMode::Pad,
            Transform::identity(),
        ),
        Paint::Radial {
            center,
            inner_radius,
            outer_radius,
            stops,
        } => {
            if *outer_radius <= 0.0 {
                None
            } else {
                let inner = (inner_radius / outer_radius).clamp(0.0, 1.0);
                let span = 1.0 - inner;
                let remapped: Vec<GradientStop> = stops
                    .iter()
                    .map(|s| GradientStop::new(inner + s.offset * span, s.color))
                    .collect();
                let c = Point::from_xy(center.x, center.y);
                RadialGradient::new(
                    c,
                    c,
                    *outer_radius,
                    skia_stops(&remapped),
                    SpreadMode::Pad,
                    Transform::identity(),
                )
            }
        }
    };
    shader.unwrap_or_else(|| Shader::SolidColor(paint.fallback_color()))
}

fn skia_paint(paint: &Paint) -> tiny_skia::Paint<'static> {
    let mut p = tiny_skia::Paint::default();
    p.shader = shader_for(paint);
    p.anti_alias = true;
    p
}

/// A CPU raster canvas
pub struct PixmapCanvas {
    pixmap: Pixmap,
    /// Scratch clip mask reused for bevel bands
    bevel_mask: Option<Mask>,
}

impl PixmapCanvas {
    /// Allocate a transparent canvas
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        let pixmap = Pixmap::new(width, height).ok_or(RenderError::Pixmap { width, height })?;
        Ok(Self {
            pixmap,
            bevel_mask: None,
        })
    }

    /// Premultiplied RGBA8 pixel data, row-major
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Straight-alpha copy of the current frame
    pub fn to_image(&self) -> Result<RgbaImage, RenderError> {
        let (width, height) = (self.pixmap.width(), self.pixmap.height());
        let mut bytes = Vec::with_capacity(self.pixmap.data().len());
        for px in self.pixmap.pixels() {
            let c = px.demultiply();
            bytes.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
        }
        RgbaImage::from_raw(width, height, bytes).ok_or(RenderError::Image { width, height })
    }

    /// Write the current frame to `path` as PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        self.to_image()?
            .save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }
}

impl Canvas for PixmapCanvas {
    fn size(&self) -> (u32, u32) {
        (self.pixmap.width(), self.pixmap.height())
    }

    fn clear(&mut self, color: Color) {
        self.pixmap.fill(color);
    }

    fn fill_all(&mut self, paint: &Paint) {
        let (w, h) = self.size();
        if let Some(rect) = tiny_skia::Rect::from_xywh(0.0, 0.0, w as f32, h as f32) {
            self.pixmap
                .fill_rect(rect, &skia_paint(paint), Transform::identity(), None);
        }
    }

    fn fill(&mut self, shape: &Shape, paint: &Paint) {
        if let Some(path) = shape.path() {
            self.pixmap.fill_path(
                &path,
                &skia_paint(paint),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn fill_translated(&mut self, shape: &Shape, dx: f32, dy: f32, paint: &Paint) {
        if let Some(path) = shape.path_translated(dx, dy) {
            self.pixmap.fill_path(
                &path,
                &skia_paint(paint),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn stroke(&mut self, shape: &Shape, width: f32, color: Color) {
        if width <= 0.0 {
            return;
        }
        if let Some(path) = shape.path() {
            let stroke = Stroke {
                width,
                ..Stroke::default()
            };
            self.pixmap.stroke_path(
                &path,
                &skia_paint(&Paint::Solid(color)),
                &stroke,
                Transform::identity(),
                None,
            );
        }
    }

    fn fill_bevel(&mut self, shape: &Shape, thickness: f32, paint: &Paint) {
        if thickness <= 0.0 {
            return;
        }
        let Some(path) = shape.path() else {
            return;
        };

        if self.bevel_mask.is_none() {
            self.bevel_mask = Mask::new(self.pixmap.width(), self.pixmap.height());
        }
        let Some(mask) = self.bevel_mask.as_mut() else {
            return;
        };
        mask.data_mut().fill(0);
        mask.fill_path(&path, FillRule::Winding, true, Transform::identity());

        let stroke = Stroke {
            width: thickness * 2.0,
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &path,
            &skia_paint(paint),
            &stroke,
            Transform::identity(),
            Some(&*mask),
        );
    }
}
