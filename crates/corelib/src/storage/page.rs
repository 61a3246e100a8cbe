//! Fixed-capacity slab page backed by an anonymous memory mapping.

use crate::error::Result;
use crate::storage::slot::{SlotCell, SlotLinks, SlotRef};
use memmap2::MmapMut;
use std::marker::PhantomData;
use std::mem;
use std::ptr;

/// Default allocation unit for a page, in bytes.
pub const DEFAULT_ALLOC_UNIT: usize = 4096;

const BITS_PER_WORD: usize = 64;

/// A fixed block of slots carved out of one anonymous mapping.
///
/// The mapping is requested zero-initialized from the operating system and
/// never moves, which is what gives stored elements their address
/// stability: the directory may reorder its page table freely, the mapped
/// memory stays put until the page is dropped.
///
/// # Invariant
///
/// Bitmap bit `i` is set iff slot `i` holds a live (constructed) element.
/// Every raw access below is guarded by that bit.
pub(crate) struct Page<T> {
    map: MmapMut,
    bitmap: Box<[u64]>,
    slot_count: usize,
    _marker: PhantomData<T>,
}

impl<T> Page<T> {
    /// Maps a new zeroed page of `alloc_unit` bytes.
    ///
    /// The slot count is the number of whole cells that fit in the unit,
    /// with a minimum of one (the mapping grows to a single cell when the
    /// element outsizes the unit).
    pub(crate) fn new(alloc_unit: usize) -> Result<Self> {
        let cell = mem::size_of::<SlotCell<T>>();
        debug_assert!(mem::align_of::<SlotCell<T>>() <= DEFAULT_ALLOC_UNIT);
        let slot_count = (alloc_unit / cell).max(1);
        let map = MmapMut::map_anon(alloc_unit.max(cell * slot_count))?;
        let words = (slot_count + BITS_PER_WORD - 1) / BITS_PER_WORD;
        Ok(Self {
            map,
            bitmap: vec![0u64; words].into_boxed_slice(),
            slot_count,
            _marker: PhantomData,
        })
    }

    /// Total slots in this page.
    pub(crate) fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Live elements, derived from the bitmap population count.
    pub(crate) fn len(&self) -> usize {
        self.bitmap.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bitmap.iter().all(|&w| w == 0)
    }

    pub(crate) fn is_full(&self) -> bool {
        self.first_free().is_none()
    }

    /// True if `slot` is in range and holds a live element.
    pub(crate) fn is_live(&self, slot: u32) -> bool {
        let slot = slot as usize;
        slot < self.slot_count
            && self.bitmap[slot / BITS_PER_WORD] & (1u64 << (slot % BITS_PER_WORD)) != 0
    }

    /// Constructs `elem` in the lowest free slot and returns its index, or
    /// `None` when the page is full.
    pub(crate) fn insert(&mut self, elem: T, links: SlotLinks) -> Option<u32> {
        let slot = self.first_free()?;
        // SAFETY: `slot` is in range and its bit is clear, so the cell is
        // dead memory we may overwrite wholesale.
        unsafe {
            ptr::write(
                self.cell_mut_ptr(slot),
                SlotCell {
                    links,
                    elem: mem::MaybeUninit::new(elem),
                },
            );
        }
        self.set_bit(slot);
        Some(slot)
    }

    /// Destroys the element in `slot`, zeroes the cell and clears the bit.
    ///
    /// Out-of-range or already-clear slots report `false` without touching
    /// anything.
    pub(crate) fn remove(&mut self, slot: u32) -> bool {
        if !self.is_live(slot) {
            return false;
        }
        // SAFETY: the bit is set, so the element is initialized; after the
        // drop the cell is zeroed and the bit cleared, restoring the
        // invariant before anyone can observe the slot again.
        unsafe {
            let cell = self.cell_mut_ptr(slot);
            ptr::drop_in_place((*cell).elem.as_mut_ptr());
            ptr::write_bytes(cell.cast::<u8>(), 0, mem::size_of::<SlotCell<T>>());
        }
        self.clear_bit(slot);
        true
    }

    /// Resolves a live slot to its element.
    pub(crate) fn get(&self, slot: u32) -> Option<&T> {
        if !self.is_live(slot) {
            return None;
        }
        // SAFETY: the bitmap bit guards initialization of the element.
        unsafe { Some((*self.cell_ptr(slot)).elem.assume_init_ref()) }
    }

    /// Order links of a live slot.
    pub(crate) fn links(&self, slot: u32) -> SlotLinks {
        debug_assert!(self.is_live(slot));
        // SAFETY: live slots have fully written cells.
        unsafe { (*self.cell_ptr(slot)).links }
    }

    pub(crate) fn set_next(&mut self, slot: u32, next: Option<SlotRef>) {
        debug_assert!(self.is_live(slot));
        // SAFETY: live slots have fully written cells.
        unsafe { (*self.cell_mut_ptr(slot)).links.next = next }
    }

    pub(crate) fn set_prev(&mut self, slot: u32, prev: Option<SlotRef>) {
        debug_assert!(self.is_live(slot));
        // SAFETY: live slots have fully written cells.
        unsafe { (*self.cell_mut_ptr(slot)).links.prev = prev }
    }

    /// Lowest-index clear bit, if any.
    fn first_free(&self) -> Option<u32> {
        for (word_idx, &word) in self.bitmap.iter().enumerate() {
            if word != u64::MAX {
                let slot = word_idx * BITS_PER_WORD + (!word).trailing_zeros() as usize;
                return (slot < self.slot_count).then_some(slot as u32);
            }
        }
        None
    }

    fn set_bit(&mut self, slot: u32) {
        let slot = slot as usize;
        self.bitmap[slot / BITS_PER_WORD] |= 1u64 << (slot % BITS_PER_WORD);
    }

    fn clear_bit(&mut self, slot: u32) {
        let slot = slot as usize;
        self.bitmap[slot / BITS_PER_WORD] &= !(1u64 << (slot % BITS_PER_WORD));
    }

    fn cell_ptr(&self, slot: u32) -> *const SlotCell<T> {
        debug_assert!((slot as usize) < self.slot_count);
        // SAFETY: the offset stays inside the mapping by construction.
        unsafe { self.map.as_ptr().cast::<SlotCell<T>>().add(slot as usize) }
    }

    fn cell_mut_ptr(&mut self, slot: u32) -> *mut SlotCell<T> {
        debug_assert!((slot as usize) < self.slot_count);
        // SAFETY: the offset stays inside the mapping by construction.
        unsafe { self.map.as_mut_ptr().cast::<SlotCell<T>>().add(slot as usize) }
    }
}

impl<T> Drop for Page<T> {
    fn drop(&mut self) {
        if !mem::needs_drop::<T>() {
            return;
        }
        for slot in 0..self.slot_count as u32 {
            if self.is_live(slot) {
                // SAFETY: the bit is set, so the element is initialized.
                unsafe { ptr::drop_in_place((*self.cell_mut_ptr(slot)).elem.as_mut_ptr()) }
            }
        }
    }
}
