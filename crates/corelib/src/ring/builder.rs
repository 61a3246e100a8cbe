//! Builder for configuring a [`HashRing`].

use crate::hasher::{RingHash, Xxh3RingHash};
use crate::ring::probe::ProbeSequence;
use crate::ring::ring::HashRing;
use crate::storage::DEFAULT_ALLOC_UNIT;

/// Default initial ring capacity (entries).
pub const DEFAULT_RING_CAPACITY: usize = 32;

/// Configures capacity, allocation unit, probe seed and hasher for a ring.
///
/// ```
/// use corelib::{HashRing, RingBuilder};
///
/// let mut ring: HashRing<String> = RingBuilder::new()
///     .with_capacity(64)
///     .with_probe_seed(7)
///     .build();
/// ring.load("replica-a".to_owned()).unwrap();
/// ```
pub struct RingBuilder<H = Xxh3RingHash> {
    capacity: usize,
    alloc_unit: usize,
    seed: Option<u64>,
    hasher: H,
}

impl RingBuilder<Xxh3RingHash> {
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_RING_CAPACITY,
            alloc_unit: DEFAULT_ALLOC_UNIT,
            seed: None,
            hasher: Xxh3RingHash,
        }
    }
}

impl Default for RingBuilder<Xxh3RingHash> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> RingBuilder<H> {
    /// Initial ring capacity; rounded up to the next power of two.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Page allocation unit for the backing storage directory, in bytes.
    pub fn with_alloc_unit(mut self, alloc_unit: usize) -> Self {
        self.alloc_unit = alloc_unit;
        self
    }

    /// Fixed seed for the collision-probe sequence. Without one the
    /// sequence is seeded from entropy.
    pub fn with_probe_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Swaps the ring hasher.
    pub fn with_hasher<H2>(self, hasher: H2) -> RingBuilder<H2> {
        RingBuilder {
            capacity: self.capacity,
            alloc_unit: self.alloc_unit,
            seed: self.seed,
            hasher,
        }
    }

    /// Builds the ring.
    pub fn build<T>(self) -> HashRing<T, H>
    where
        H: RingHash<T>,
    {
        let capacity = self.capacity.max(1).next_power_of_two();
        let probe = match self.seed {
            Some(seed) => ProbeSequence::from_seed(seed),
            None => ProbeSequence::from_entropy(),
        };
        HashRing::with_parts(capacity, self.alloc_unit, self.hasher, probe)
    }
}
