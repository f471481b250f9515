//! Deterministic RNG utilities for reproducible tests.

use nalgebra::Point2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Create a deterministic `ChaCha8Rng` from a seed.
///
/// All test randomization should go through this to ensure reproducibility.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// `count` targets drawn uniformly from the disc of `radius` around `center`.
pub fn random_targets(count: usize, center: Point2<f64>, radius: f64, seed: u64) -> Vec<Point2<f64>> {
    let mut rng = seeded_rng(seed);
    (0..count)
        .map(|_| {
            // sqrt keeps the density uniform over the disc area
            let r = radius * rng.r#gen::<f64>().sqrt();
            let theta = rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI);
            center + nalgebra::Vector2::new(r * theta.cos(), r * theta.sin())
        })
        .collect()
}

/// `count` joint angles (radians) drawn uniformly from `[lower, upper)`.
pub fn random_angles(count: usize, lower: f64, upper: f64, seed: u64) -> Vec<f64> {
    let mut rng = seeded_rng(seed);
    (0..count).map(|_| rng.gen_range(lower..upper)).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
