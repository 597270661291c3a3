//! Size distribution tables
//!
//! Two descending lookup tables indexed by an instance's size-distribution
//! sample. Blending between them moves the size spread from uniform toward
//! "mostly small, a few large".

use once_cell::sync::Lazy;

/// Number of distribution samples; size indices are drawn from `0..SAMPLES`
pub const SAMPLES: usize = 500;

/// `SAMPLES - k` for `k = 0..=SAMPLES`: a straight ramp from 500 down to 0
pub static LINEAR_DISTRIBUTION: Lazy<Vec<f32>> =
    Lazy::new(|| (0..=SAMPLES).map(|k| (SAMPLES - k) as f32).collect());

/// `(SAMPLES + 1) / (k + 1) - 1` for `k = 0..SAMPLES`: 500 down to ~0.002,
/// falling steeply so most indices map to small values
pub static INVERSE_DISTRIBUTION: Lazy<Vec<f32>> = Lazy::new(|| {
    (0..SAMPLES)
        .map(|k| (SAMPLES + 1) as f32 / (k + 1) as f32 - 1.0)
        .collect()
});

/// Blend the two tables at `index`
///
/// `skew` is 0 for the pure linear ramp and 1 for the pure inverse falloff.
/// Indices past the end of the inverse table clamp to its last entry.
pub fn size_variation(index: usize, skew: f32) -> f32 {
    let linear = LINEAR_DISTRIBUTION[index.min(SAMPLES)];
    let inverse = INVERSE_DISTRIBUTION[index.min(SAMPLES - 1)];
    linear * (1.0 - skew) + inverse * skew
}
