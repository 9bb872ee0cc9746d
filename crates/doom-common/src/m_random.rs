// m_random.rs — deterministic random source for the play simulation
//
// Gameplay randomness must be reproducible from a seed so recorded
// sessions replay identically; nothing here may read wall-clock entropy.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub struct MRandom {
    rng: StdRng,
    seed: u64,
}

impl MRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
        }
    }

    /// Next value in 0..=255.
    pub fn p_random(&mut self) -> i32 {
        self.rng.gen_range(0..=255)
    }

    /// Restart the sequence from the original seed.
    pub fn clear_random(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for MRandom {
    fn default() -> Self {
        Self::new(0)
    }
}
