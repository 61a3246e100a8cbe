//! Seeded step source for open-addressing collision probes.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Attempt budget shared by load and expansion probing. Hitting it means
/// the load-factor bound is broken or the hash distribution is
/// pathological, so the operation fails instead of spinning.
pub(crate) const MAX_PROBE_ATTEMPTS: usize = 1024;

/// Pseudo-random source of probe steps.
///
/// Steps are drawn from `[0, max(capacity >> 5, 8))`, the same bound for
/// initial placement and for rehashing on expansion. The source is
/// explicit and seedable so collision handling is reproducible in tests.
#[derive(Debug, Clone)]
pub struct ProbeSequence {
    rng: SmallRng,
}

impl ProbeSequence {
    /// Entropy-seeded sequence (production default).
    pub fn from_entropy() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    /// Deterministic sequence for a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Next probe step for a ring of `capacity` entries.
    pub fn step(&mut self, capacity: usize) -> usize {
        let bound = (capacity >> 5).max(8);
        self.rng.gen_range(0..bound)
    }
}
