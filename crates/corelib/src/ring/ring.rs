//! The consistent-hashing ring.

use crate::error::{Error, Result};
use crate::hasher::{RingHash, Xxh3RingHash};
use crate::ring::builder::RingBuilder;
use crate::ring::probe::{ProbeSequence, MAX_PROBE_ATTEMPTS};
use crate::storage::{Directory, SlotRef};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Expansion triggers when occupied entries reach `capacity / LOAD_DIVISOR`.
const LOAD_DIVISOR: usize = 3;

/// Consistent-hashing ring indexing address-stable storage.
///
/// The ring itself stores no elements; entries are [`SlotRef`] handles
/// into the backing [`Directory`]. A side table maps each stored element's
/// handle to the ring indices referencing it, so one element may occupy
/// several positions (virtual nodes) without changing the lookup path.
///
/// # Invariants
///
/// - `capacity` is a power of two.
/// - Occupied entries stay below `capacity / 3`; crossing the threshold
///   doubles the ring and rehashes every stored element.
/// - Every occupied entry resolves to a live element in the directory, and
///   a handle appears in the side table iff at least one entry holds it.
///
/// # Concurrency
///
/// Not internally synchronized: mutations take `&mut self` and must be
/// serialized by the caller; [`HashRing::access`] takes `&self` and may
/// interleave with other reads only.
pub struct HashRing<T, H = Xxh3RingHash> {
    entries: Vec<Option<SlotRef>>,
    indices: HashMap<SlotRef, Vec<usize>>,
    storage: Directory<T>,
    hasher: H,
    probe: ProbeSequence,
    /// Occupied entry count (ring positions, not stored elements).
    size: usize,
}

impl<T: Hash + 'static> HashRing<T, Xxh3RingHash> {
    /// Ring with default capacity (32), allocation unit and hasher.
    pub fn new() -> Self {
        RingBuilder::new().build()
    }

    /// Ring with a chosen initial capacity, rounded up to a power of two.
    pub fn with_capacity(capacity: usize) -> Self {
        RingBuilder::new().with_capacity(capacity).build()
    }
}

impl<T: Hash + 'static> Default for HashRing<T, Xxh3RingHash> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, H: RingHash<T>> HashRing<T, H> {
    pub(crate) fn with_parts(
        capacity: usize,
        alloc_unit: usize,
        hasher: H,
        probe: ProbeSequence,
    ) -> Self {
        debug_assert!(capacity.is_power_of_two());
        Self {
            entries: vec![None; capacity],
            indices: HashMap::new(),
            storage: Directory::with_alloc_unit(alloc_unit),
            hasher,
            probe,
            size: 0,
        }
    }

    /// Stored element count.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Occupied ring entries. Equals [`HashRing::len`] unless elements were
    /// loaded with extra replicas.
    pub fn entry_count(&self) -> usize {
        self.size
    }

    /// Current ring capacity (always a power of two).
    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    /// Name of the configured hasher.
    pub fn hasher_name(&self) -> &'static str {
        self.hasher.name()
    }

    /// Loads an item onto the ring at one position.
    ///
    /// Expands first when the occupied-entry count has reached a third of
    /// capacity, then hashes the item, probes for a free entry, stores the
    /// item and records the chosen index. Fails only on mapping failure,
    /// capacity overflow or probe exhaustion.
    pub fn load(&mut self, item: T) -> Result<()> {
        self.load_weighted(item, 1)
    }

    /// Loads an item at `replicas` ring positions (virtual nodes).
    ///
    /// The item is stored once; every position references the same handle.
    /// `replicas == 0` is a no-op and stores nothing.
    pub fn load_weighted(&mut self, item: T, replicas: usize) -> Result<()> {
        if replicas == 0 {
            return Ok(());
        }
        while self.size + replicas > self.capacity() / LOAD_DIVISOR {
            self.expand()?;
        }
        let hash = self.hasher.hash_item(&item);
        let handle = self.storage.insert(item)?;
        let mut placed = Vec::with_capacity(replicas);
        for _ in 0..replicas {
            match probe_free(&self.entries, &mut self.probe, hash) {
                Ok(index) => {
                    self.entries[index] = Some(handle);
                    placed.push(index);
                }
                Err(err) => {
                    if placed.is_empty() {
                        // keep the side-table invariant: no entry, no key
                        self.storage.remove(handle);
                    } else {
                        self.size += placed.len();
                        self.indices.insert(handle, placed);
                    }
                    return Err(err);
                }
            }
        }
        self.size += placed.len();
        self.indices.insert(handle, placed);
        Ok(())
    }

    /// The consistent-hashing lookup: returns the element owning ring
    /// position `index`, i.e. the nearest occupied successor scanning
    /// forward with wrap-around.
    pub fn access(&self, index: usize) -> Result<&T> {
        let capacity = self.capacity();
        if index >= capacity {
            return Err(Error::OutOfRange { index, capacity });
        }
        if self.size == 0 {
            return Err(Error::EmptyRing);
        }
        let mut index = index;
        loop {
            if let Some(handle) = self.entries[index] {
                // never fires while the ring invariant holds
                return self.storage.get(handle).ok_or(Error::EmptyRing);
            }
            index = (index + 1) % capacity;
        }
    }

    /// Removes the first stored item (in insertion order) equal to `needle`
    /// under the caller-supplied predicate.
    ///
    /// Clears every ring entry recorded for the element, erases its
    /// side-table record and destroys the stored element. Returns whether a
    /// match was found; not finding one is a normal negative result.
    pub fn remove<F>(&mut self, needle: &T, equals: F) -> bool
    where
        F: Fn(&T, &T) -> bool,
    {
        let found = self
            .storage
            .iter()
            .find(|(_, item)| equals(item, needle))
            .map(|(handle, _)| handle);
        let Some(handle) = found else {
            return false;
        };
        if let Some(positions) = self.indices.remove(&handle) {
            for index in positions {
                debug_assert_eq!(self.entries[index], Some(handle));
                self.entries[index] = None;
                self.size -= 1;
            }
        }
        self.storage.remove(handle);
        true
    }

    /// True if some stored item equals `needle` under the predicate.
    pub fn contains<F>(&self, needle: &T, equals: F) -> bool
    where
        F: Fn(&T, &T) -> bool,
    {
        self.storage.iter().any(|(_, item)| equals(item, needle))
    }

    /// Iterates stored items in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.storage.iter().map(|(_, item)| item)
    }

    /// Doubles capacity and rehashes every stored element.
    ///
    /// Stop-the-world: the ring array and side table are rebuilt in full,
    /// preserving each element's recorded position multiplicity. Fails if
    /// doubling would overflow the 32-bit hash index width.
    fn expand(&mut self) -> Result<()> {
        let capacity = self.capacity();
        let doubled = capacity
            .checked_mul(2)
            .filter(|&c| c as u64 <= 1u64 << 32)
            .ok_or(Error::CapacityOverflow { capacity })?;
        let mut entries = vec![None; doubled];
        let mut indices: HashMap<SlotRef, Vec<usize>> =
            HashMap::with_capacity(self.indices.len());
        let mut size = 0;
        for (handle, item) in self.storage.iter() {
            let hash = self.hasher.hash_item(item);
            let replicas = self.indices.get(&handle).map_or(1, Vec::len);
            let mut positions = Vec::with_capacity(replicas);
            for _ in 0..replicas {
                let index = probe_free(&entries, &mut self.probe, hash)?;
                entries[index] = Some(handle);
                positions.push(index);
                size += 1;
            }
            indices.insert(handle, positions);
        }
        self.entries = entries;
        self.indices = indices;
        self.size = size;
        Ok(())
    }
}

impl<T, H: RingHash<T>> fmt::Debug for HashRing<T, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashRing")
            .field("len", &self.len())
            .field("entries", &self.size)
            .field("capacity", &self.capacity())
            .field("hasher", &self.hasher.name())
            .finish()
    }
}

/// Probes for a free entry starting at the hash position, stepping by
/// bounded pseudo-random increments to spread collision chains.
fn probe_free(
    entries: &[Option<SlotRef>],
    probe: &mut ProbeSequence,
    hash: u32,
) -> Result<usize> {
    let capacity = entries.len();
    debug_assert!(capacity.is_power_of_two());
    let mut index = hash as usize & (capacity - 1);
    let mut attempts = 0;
    while entries[index].is_some() {
        if attempts >= MAX_PROBE_ATTEMPTS {
            return Err(Error::ProbeExhausted { attempts });
        }
        index = (index + probe.step(capacity)) % capacity;
        attempts += 1;
    }
    Ok(index)
}
