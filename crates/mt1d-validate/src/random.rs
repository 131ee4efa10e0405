//! Reproducible random test vectors.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, StandardNormal};

/// `n` independent standard-normal samples from a generator seeded with `seed`.
pub fn random_vector(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    sample(&mut rng, n)
}

/// Draw `n` standard-normal samples from `rng`.
pub fn sample(rng: &mut StdRng, n: usize) -> Vec<f64> {
    (0..n)
        .map(|_| -> f64 { StandardNormal.sample(rng) })
        .collect()
}

pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

pub fn norm(a: &[f64]) -> f64 {
    dot(a, a).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_vectors_repeat() {
        assert_eq!(random_vector(16, 3), random_vector(16, 3));
        assert_ne!(random_vector(16, 3), random_vector(16, 4));
    }

    #[test]
    fn test_dot_and_norm() {
        assert_eq!(dot(&[1.0, 2.0], &[3.0, -1.0]), 1.0);
        assert_eq!(norm(&[3.0, 4.0]), 5.0);
    }
}
