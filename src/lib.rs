//! confetti - procedural scatter of lit, randomized shapes
//!
//! A `Confetti` layer places thousands of polygons, stars and circles on a
//! canvas, colors them from configurable hue/saturation/lightness ranges and
//! lights them from a movable light source with shadows, specular highlights
//! and bevels. Derived per-instance data is cached and rebuilt lazily, and
//! rendering drops to flat fills while parameters are being dragged.
//!
//! ## Modules
//! - `shapes`: the shape variants and the weighted shape catalog
//! - `random`: per-slot random field and size distribution tables
//! - `confetti`: the layer, its parameters, cache and render pipeline
//! - `scene`: light source, background and layer composition
//! - `render`: the `Canvas` drawing contract and a raster backend

pub mod config;
pub mod confetti;
pub mod error;
pub mod random;
pub mod render;
pub mod scene;
pub mod shapes;

pub use config::{ConfettiConfig, ConfigError};
pub use confetti::{Confetti, RenderMode};
pub use error::{Error, Result};
pub use render::{Canvas, PixmapCanvas, RenderError};
pub use scene::{Bounds, Layer, LightController, LightSource, Scene};
