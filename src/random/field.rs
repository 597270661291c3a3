//! Random field - per-slot random draws for every instance axis
//!
//! Each slot `i` owns one independent sample per axis. Samples persist until
//! the field is regenerated, so an instance keeps its identity (shape, jitter,
//! color offsets) while global parameters change around it.

use rand::Rng;

use super::distribution::SAMPLES;

/// Fixed-capacity table of uniform draws, one column per axis
#[derive(Clone, Debug, PartialEq)]
pub struct RandomField {
    /// Shape pick in `[0, 1)`
    pub shape: Vec<f32>,
    /// Position jitter X in `[-0.5, 0.5)`
    pub pos_x: Vec<f32>,
    /// Position jitter Y in `[-0.5, 0.5)`
    pub pos_y: Vec<f32>,
    /// Rotation in `[0, 1)`, scaled by the rotation variation
    pub rotation: Vec<f32>,
    /// Index into the size distribution tables, `0..SAMPLES`
    pub size_index: Vec<u16>,
    /// Hue offset in `[0, 1)`
    pub hue: Vec<f32>,
    /// Saturation in `[0, 1)`
    pub saturation: Vec<f32>,
    /// Lightness in `[0, 1)`
    pub lightness: Vec<f32>,
    /// Opacity `1 - sqrt(u)`, biased toward 0 (which renders as high alpha)
    pub opacity: Vec<f32>,
}

fn uniform<R: Rng + ?Sized>(rng: &mut R, capacity: usize) -> Vec<f32> {
    (0..capacity).map(|_| rng.gen::<f32>()).collect()
}

impl RandomField {
    /// Draw a full field of `capacity` slots
    ///
    /// Axes are drawn column by column in a fixed order, so the same RNG state
    /// always yields the same field.
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, capacity: usize) -> Self {
        let shape = uniform(rng, capacity);
        let pos_x = uniform(rng, capacity).into_iter().map(|u| u - 0.5).collect();
        let pos_y = uniform(rng, capacity).into_iter().map(|u| u - 0.5).collect();
        let rotation = uniform(rng, capacity);
        let size_index = (0..capacity)
            .map(|_| rng.gen_range(0..SAMPLES as u16))
            .collect();
        let hue = uniform(rng, capacity);
        let saturation = uniform(rng, capacity);
        let lightness = uniform(rng, capacity);
        let opacity = uniform(rng, capacity)
            .into_iter()
            .map(|u| 1.0 - u.sqrt())
            .collect();

        log::debug!("Generated random field with {} slots", capacity);

        Self {
            shape,
            pos_x,
            pos_y,
            rotation,
            size_index,
            hue,
            saturation,
            lightness,
            opacity,
        }
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.shape.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_ranges() {
        let mut rng = StdRng::seed_from_u64(7);
        let field = RandomField::generate(&mut rng, 2000);
        assert_eq!(field.capacity(), 2000);

        for i in 0..field.capacity() {
            assert!((0.0..1.0).contains(&field.shape[i]));
            assert!((-0.5..0.5).contains(&field.pos_x[i]));
            assert!((-0.5..0.5).contains(&field.pos_y[i]));
            assert!((field.size_index[i] as usize) < SAMPLES);
            assert!((0.0..=1.0).contains(&field.opacity[i]));
        }
    }

    #[test]
    fn test_same_seed_same_field() {
        let a = RandomField::generate(&mut StdRng::seed_from_u64(42), 256);
        let b = RandomField::generate(&mut StdRng::seed_from_u64(42), 256);
        assert_eq!(a, b);

        let c = RandomField::generate(&mut StdRng::seed_from_u64(43), 256);
        assert_ne!(a, c);
    }

    #[test]
    fn test_opacity_mean_is_one_third() {
        let field = RandomField::generate(&mut StdRng::seed_from_u64(1), 4096);
        let mean: f32 = field.opacity.iter().sum::<f32>() / 4096.0;
        // E[1 - sqrt(u)] = 1/3
        assert!((mean - 1.0 / 3.0).abs() < 0.03);
    }
}
