//! Seeded randomness for the simulated brick.
//!
//! Every random draw in the mock goes through one generator, so a run is
//! reproducible from `random_seed` alone. Seed 0 draws from OS entropy.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Bernoulli, Distribution, StandardNormal};

/// Random source shared by the encoder and light simulators
#[derive(Clone)]
pub struct NoiseGenerator {
    rng: SmallRng,
}

impl NoiseGenerator {
    pub fn new(seed: u64) -> Self {
        let rng = match seed {
            0 => SmallRng::from_entropy(),
            seed => SmallRng::seed_from_u64(seed),
        };
        Self { rng }
    }

    /// Additive zero-mean Gaussian error, e.g. light sensor jitter
    #[inline]
    pub fn jitter(&mut self, stddev: f64) -> f64 {
        if stddev <= 0.0 {
            return 0.0;
        }
        let n: f64 = self.rng.sample(StandardNormal);
        n * stddev
    }

    /// Multiplicative factor around 1.0 applied to wheel travel
    #[inline]
    pub fn slip_factor(&mut self, stddev: f64) -> f64 {
        1.0 + self.jitter(stddev)
    }

    /// Whether a read with the given failure rate fails this time
    pub fn read_fails(&mut self, rate: f64) -> bool {
        match Bernoulli::new(rate.min(1.0)) {
            Ok(dist) if rate > 0.0 => dist.sample(&mut self.rng),
            _ => false,
        }
    }
}
