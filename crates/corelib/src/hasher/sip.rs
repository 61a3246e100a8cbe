//! SipHash-1-3 ring hash.

use crate::hasher::traits::RingHash;
use siphasher::sip::SipHasher13;
use std::hash::{Hash, Hasher};

/// SipHash-1-3 ring hash, keyed so different instances place the same
/// items differently.
#[derive(Clone, Copy, Debug, Default)]
pub struct SipRingHash {
    key0: u64,
    key1: u64,
}

impl SipRingHash {
    /// Creates a keyed hasher.
    pub fn with_keys(key0: u64, key1: u64) -> Self {
        Self { key0, key1 }
    }
}

impl<T: Hash + 'static> RingHash<T> for SipRingHash {
    fn hash_item(&self, item: &T) -> u32 {
        let mut hasher = SipHasher13::new_with_keys(self.key0, self.key1);
        item.hash(&mut hasher);
        hasher.finish() as u32
    }

    fn name(&self) -> &'static str {
        "SipRingHash"
    }
}
