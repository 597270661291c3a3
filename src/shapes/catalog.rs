//! Shape catalog - the weighted set of shapes instances are picked from
//!
//! Each entry carries an integer weight. An instance's uniform shape-pick
//! sample selects an entry with probability proportional to its weight.

use std::f32::consts::PI;

use rand::Rng;

use super::primitives::{Circle, RegularPolygon, Shape, Star};

/// Area every catalog polygon and circle is normalized to
pub const REFERENCE_AREA: f32 = PI;

/// Entry used for every pick when all weights are zero (Hexagons)
pub const DEFAULT_ENTRY: usize = 3;

/// Number of entries in the standard catalog
pub const STANDARD_LEN: usize = 6;

/// A shape entry in the catalog with its relative frequency
#[derive(Clone, Debug)]
pub struct CatalogEntry {
    /// Canonical, normalized shape
    shape: Shape,
    /// Display name (plural, as shown on the weight slider)
    name: &'static str,
    /// Relative frequency among instances
    weight: u32,
}

impl CatalogEntry {
    /// Create a new catalog entry
    pub fn new(name: &'static str, shape: impl Into<Shape>, weight: u32) -> Self {
        Self {
            shape: shape.into(),
            name,
            weight,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }
}

/// An ordered set of weighted shapes
///
/// Picks walk the cumulative weights, so entry `i` owns the half-open range
/// `[cumulative[i-1], cumulative[i])` of the total weight.
#[derive(Clone, Debug)]
pub struct ShapeCatalog {
    entries: Vec<CatalogEntry>,
    /// Running sum of weights, one per entry
    cumulative: Vec<u32>,
}

impl ShapeCatalog {
    /// Create a catalog from explicit entries
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut catalog = Self {
            entries,
            cumulative: Vec::new(),
        };
        catalog.recompute_cumulative();
        catalog
    }

    /// The standard catalog with the given weights for
    /// Triangles, Squares, Pentagons, Hexagons, Stars and Circles
    pub fn standard_with_weights(weights: [u32; STANDARD_LEN]) -> Self {
        const POLYGONS: [&str; 4] = ["Triangles", "Squares", "Pentagons", "Hexagons"];

        let mut entries: Vec<CatalogEntry> = POLYGONS
            .iter()
            .enumerate()
            .map(|(i, &name)| {
                let poly = RegularPolygon::with_area(i + 3, REFERENCE_AREA);
                CatalogEntry::new(name, poly, weights[i])
            })
            .collect();

        // Stars keep their own reference area, set by this edge length
        let edge = ((72f32.to_radians().tan() + 54f32.to_radians().tan()) / 5.0).sqrt();
        entries.push(CatalogEntry::new("Stars", Star::pentagram(edge), weights[4]));

        let radius = (REFERENCE_AREA / PI).sqrt();
        entries.push(CatalogEntry::new("Circles", Circle::new(radius), weights[5]));

        Self::new(entries)
    }

    /// The standard catalog with randomized weights
    ///
    /// Polygons and circles get a weight in `2..20`; stars start at 1.
    pub fn standard<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut weights = [0u32; STANDARD_LEN];
        for (i, w) in weights.iter_mut().enumerate() {
            *w = if i == 4 { 1 } else { rng.gen_range(2..20) };
        }
        Self::standard_with_weights(weights)
    }

    /// Get the number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get a reference to an entry
    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    /// Iterate over entries
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    /// Sum of all weights
    pub fn total_weight(&self) -> u32 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Update an entry's weight
    ///
    /// Returns `true` if the weight actually changed.
    pub fn set_weight(&mut self, index: usize, weight: u32) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) if entry.weight != weight => {
                entry.weight = weight;
                self.recompute_cumulative();
                true
            }
            _ => false,
        }
    }

    /// Recompute running weight sums
    fn recompute_cumulative(&mut self) {
        self.cumulative.clear();
        let mut total = 0u32;
        for entry in &self.entries {
            total = total.saturating_add(entry.weight);
            self.cumulative.push(total);
        }
    }

    /// Map a uniform sample in `[0, 1)` to an entry index
    ///
    /// Falls back to `DEFAULT_ENTRY` (or the last entry of a shorter
    /// catalog) when every weight is zero.
    pub fn pick_index(&self, u: f32) -> usize {
        let total = self.total_weight();
        if total == 0 {
            return DEFAULT_ENTRY.min(self.entries.len().saturating_sub(1));
        }
        let slot = ((u * total as f32) as u32).min(total - 1);
        self.cumulative.partition_point(|&c| c <= slot)
    }

    /// Map a uniform sample in `[0, 1)` to a shape
    ///
    /// Returns `None` only for an empty catalog.
    pub fn pick(&self, u: f32) -> Option<&Shape> {
        self.entries.get(self.pick_index(u)).map(|e| &e.shape)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::Outline;
    use nalgebra::Affine2;

    const STAR_REFERENCE_AREA: f32 = 1.894_427;

    #[test]
    fn test_standard_catalog_layout() {
        let catalog = ShapeCatalog::standard_with_weights([1, 2, 3, 4, 5, 6]);
        assert_eq!(catalog.len(), STANDARD_LEN);
        assert_eq!(catalog.total_weight(), 21);
        assert_eq!(catalog.get(DEFAULT_ENTRY).unwrap().name(), "Hexagons");
        assert!(matches!(catalog.get(4).unwrap().shape(), Shape::Star(_)));
        assert!(matches!(catalog.get(5).unwrap().shape(), Shape::Circle(_)));
    }

    #[test]
    fn test_area_normalization() {
        let catalog = ShapeCatalog::standard_with_weights([1; STANDARD_LEN]);
        let identity = Affine2::identity();

        for entry in catalog.iter() {
            let canonical = entry.shape().area();
            let copied = entry.shape().transformed(&identity).area();
            assert!((copied - canonical).abs() < 1e-4, "{}", entry.name());
            if !matches!(entry.shape(), Shape::Star(_)) {
                assert!((canonical - REFERENCE_AREA).abs() < 1e-4, "{}", entry.name());
            }
        }

        let star = catalog.get(4).unwrap().shape();
        assert!((star.area() - STAR_REFERENCE_AREA).abs() < 1e-3);
    }

    #[test]
    fn test_star_lighting_radius_is_edge() {
        let catalog = ShapeCatalog::standard_with_weights([1; STANDARD_LEN]);
        let edge = ((72f32.to_radians().tan() + 54f32.to_radians().tan()) / 5.0).sqrt();
        let star = catalog.get(4).unwrap().shape();
        assert!((star.radius() - edge).abs() < 1e-5);
        assert!((star.radius() - 0.943_829).abs() < 1e-4);
    }

    #[test]
    fn test_pick_proportional() {
        // Weights 1 and 3 on the first two entries only
        let catalog = ShapeCatalog::standard_with_weights([1, 3, 0, 0, 0, 0]);
        assert_eq!(catalog.pick_index(0.0), 0);
        assert_eq!(catalog.pick_index(0.2), 0);
        assert_eq!(catalog.pick_index(0.25), 1);
        assert_eq!(catalog.pick_index(0.99), 1);
    }

    #[test]
    fn test_pick_skips_zero_weights() {
        let catalog = ShapeCatalog::standard_with_weights([0, 0, 0, 0, 0, 2]);
        for u in [0.0, 0.3, 0.6, 0.999] {
            assert_eq!(catalog.pick_index(u), 5);
        }
    }

    #[test]
    fn test_zero_weight_fallback() {
        let catalog = ShapeCatalog::standard_with_weights([0; STANDARD_LEN]);
        assert_eq!(catalog.total_weight(), 0);
        assert_eq!(catalog.pick_index(0.7), DEFAULT_ENTRY);
        assert_eq!(catalog.pick(0.7).unwrap().name(), "Hexagon");
    }

    #[test]
    fn test_set_weight_noop() {
        let mut catalog = ShapeCatalog::standard_with_weights([2; STANDARD_LEN]);
        assert!(!catalog.set_weight(0, 2));
        assert!(catalog.set_weight(0, 7));
        assert_eq!(catalog.total_weight(), 17);
        assert!(!catalog.set_weight(99, 1));
    }
}
