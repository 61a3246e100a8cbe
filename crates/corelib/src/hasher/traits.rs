//! Core ring-hash trait definition.

/// Converts items into 32-bit ring hashes.
///
/// Implementations must be deterministic for equal items and are expected
/// to be cheap; the ring calls this once per `load` and once per stored
/// element on every expansion.
pub trait RingHash<T>: Send + Sync + 'static {
    /// Hash an item to a ring position seed.
    fn hash_item(&self, item: &T) -> u32;

    /// Returns the name of this hasher.
    fn name(&self) -> &'static str;
}
