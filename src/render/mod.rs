//! Render module - drawing surfaces
//!
//! This module provides:
//! - The `Canvas` trait and `Paint` descriptors the layers draw through
//! - `PixmapCanvas`, a tiny-skia raster backend

mod canvas;
mod pixmap;

pub use canvas::{with_alpha, Canvas, GradientStop, Paint};
pub use pixmap::{PixmapCanvas, RenderError};

#[cfg(test)]
pub(crate) use canvas::recording;
