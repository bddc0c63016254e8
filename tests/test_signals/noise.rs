use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

/// Seeded Gaussian noise
pub fn white_noise(len: usize, std_dev: f32, seed: u64) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let normal = Normal::new(0.0, std_dev as f64).unwrap();
    (0..len).map(|_| normal.sample(&mut rng) as f32).collect()
}
