//! Shapes module - the catalog of shapes the scatter layer places
//!
//! This module provides:
//! - `Outline` trait shared by every shape (area, radius, transform, trace)
//! - Primitive shapes: RegularPolygon, Star, Circle, and the closed `Shape` enum
//! - `ShapeCatalog` of weighted, area-normalized shapes

mod traits;
mod primitives;
mod catalog;

pub use traits::Outline;
pub use primitives::{Circle, RegularPolygon, Shape, Star};
pub use catalog::{CatalogEntry, ShapeCatalog, DEFAULT_ENTRY, REFERENCE_AREA, STANDARD_LEN};
