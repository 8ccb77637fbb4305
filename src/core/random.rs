use std::f64::consts::PI;

use rand::Rng;
use rand::rngs::{SmallRng, StdRng, ThreadRng};

/// Source of uniform samples in `[0, 1)`.
///
/// Production code plugs in one of rand's generators; tests can feed a
/// fixed sequence to make simulations reproducible.
pub trait RandomSource {
    fn uniform(&mut self) -> f64;
}

impl RandomSource for StdRng {
    fn uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

impl RandomSource for SmallRng {
    fn uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

impl RandomSource for ThreadRng {
    fn uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn uniform(&mut self) -> f64 {
        (**self).uniform()
    }
}

/// Normal variate via Box–Muller. Consumes two uniforms per call and keeps
/// no cached second variate.
pub fn generate_normal<S: RandomSource + ?Sized>(source: &mut S, mean: f64, std_dev: f64) -> f64 {
    let u1 = source.uniform().max(1e-12);
    let u2 = source.uniform();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    mean + std_dev * z0
}

pub(crate) fn derive_seed(base_seed: u64, trial: u64) -> u64 {
    splitmix64(base_seed ^ trial.rotate_left(32))
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

#[cfg(test)]
pub(crate) struct CyclingSource {
    values: Vec<f64>,
    next: usize,
}

#[cfg(test)]
impl CyclingSource {
    pub(crate) fn new(values: &[f64]) -> Self {
        Self {
            values: values.to_vec(),
            next: 0,
        }
    }
}

#[cfg(test)]
impl RandomSource for CyclingSource {
    fn uniform(&mut self) -> f64 {
        let value = self.values[self.next % self.values.len()];
        self.next += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn assert_approx(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn box_muller_matches_hand_calculation() {
        // u1 = e^-0.5 gives r = 1; u2 = 0 gives cos(0) = 1.
        let mut source = CyclingSource::new(&[(-0.5_f64).exp(), 0.0]);
        assert_approx(generate_normal(&mut source, 10.0, 2.0), 12.0, 1e-12);

        // u2 = 0.5 flips the sign.
        let mut source = CyclingSource::new(&[(-0.5_f64).exp(), 0.5]);
        assert_approx(generate_normal(&mut source, 10.0, 2.0), 8.0, 1e-12);
    }

    #[test]
    fn zero_uniform_is_guarded_against_log_of_zero() {
        let mut source = CyclingSource::new(&[0.0, 0.25]);
        let value = generate_normal(&mut source, 0.0, 1.0);
        assert!(value.is_finite());
    }

    #[test]
    fn zero_std_dev_returns_mean() {
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..100 {
            assert_eq!(generate_normal(&mut rng, 42.0, 0.0), 42.0);
        }
    }

    #[test]
    fn seeded_samples_have_expected_moments() {
        let mut rng = StdRng::seed_from_u64(2024);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| generate_normal(&mut rng, 5.0, 3.0)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert_approx(mean, 5.0, 0.1);
        assert_approx(variance.sqrt(), 3.0, 0.1);
    }

    #[test]
    fn derived_seeds_differ_per_trial() {
        let a = derive_seed(42, 0);
        let b = derive_seed(42, 1);
        let c = derive_seed(43, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, derive_seed(42, 0));
    }
}
