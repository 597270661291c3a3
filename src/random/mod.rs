//! Random module - reproducible per-slot randomness
//!
//! This module provides:
//! - `RandomField` of per-slot uniform draws, regenerated on reshuffle
//! - Size distribution tables (linear and inverse falloff)

mod distribution;
mod field;

pub use distribution::{size_variation, INVERSE_DISTRIBUTION, LINEAR_DISTRIBUTION, SAMPLES};
pub use field::RandomField;
