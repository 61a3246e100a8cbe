//! xxh3-backed ring hash (default).

use crate::hasher::traits::RingHash;
use std::hash::{Hash, Hasher};
use xxhash_rust::xxh3::Xxh3;

/// Default ring hash built on xxh3.
///
/// Works for any item implementing [`std::hash::Hash`]; the 64-bit digest
/// is truncated to the 32 bits the ring consumes.
#[derive(Clone, Copy, Debug, Default)]
pub struct Xxh3RingHash;

impl<T: Hash + 'static> RingHash<T> for Xxh3RingHash {
    fn hash_item(&self, item: &T) -> u32 {
        let mut hasher = Xxh3::new();
        item.hash(&mut hasher);
        hasher.finish() as u32
    }

    fn name(&self) -> &'static str {
        "Xxh3RingHash"
    }
}
