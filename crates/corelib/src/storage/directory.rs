//! Page directory: flat insert/remove/lookup over a chain of slab pages.

use crate::error::Result;
use crate::storage::page::{Page, DEFAULT_ALLOC_UNIT};
use crate::storage::slot::{SlotLinks, SlotRef};

/// Occupancy class of a page, relative to zero and its slot count.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum PageState {
    Empty,
    Partial,
    Full,
}

struct PageEntry<T> {
    page: Page<T>,
    state: PageState,
    /// Position inside the membership list named by `state`.
    list_pos: usize,
}

/// Address-stable storage directory.
///
/// Owns the whole page chain and classifies pages into empty, partial and
/// full membership lists so insertion picks a non-full page in constant
/// time instead of scanning. A page appears in exactly one list, decided
/// solely by its occupancy.
///
/// Elements are threaded onto a directory-wide intrusive list in insertion
/// order; [`Directory::iter`] walks that list, not physical slot order.
///
/// A [`SlotRef`] returned by [`Directory::insert`] resolves to the same
/// element, at the same address, until that element is removed — the
/// contract the hash ring builds on.
///
/// Pages are mapped lazily and unmapped only when the directory itself is
/// dropped; a page that drains to zero occupancy is demoted to the empty
/// list and reused.
pub struct Directory<T> {
    pages: Vec<PageEntry<T>>,
    empty: Vec<u32>,
    partial: Vec<u32>,
    full: Vec<u32>,
    head: Option<SlotRef>,
    tail: Option<SlotRef>,
    len: usize,
    capacity: usize,
    alloc_unit: usize,
}

impl<T> Directory<T> {
    /// Creates a directory with the default 4096-byte allocation unit.
    pub fn new() -> Self {
        Self::with_alloc_unit(DEFAULT_ALLOC_UNIT)
    }

    /// Creates a directory whose pages are `alloc_unit` bytes each.
    pub fn with_alloc_unit(alloc_unit: usize) -> Self {
        Self {
            pages: Vec::new(),
            empty: Vec::new(),
            partial: Vec::new(),
            full: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            capacity: 0,
            alloc_unit,
        }
    }

    /// Stored element count.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total slot capacity across all mapped pages.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of mapped pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Stores `elem` and returns its stable handle.
    ///
    /// Picks a partial page when one exists, falls back to an empty page,
    /// and maps a fresh page only when neither is available. Propagates
    /// mapping failures unmodified.
    pub fn insert(&mut self, elem: T) -> Result<SlotRef> {
        let page_idx = match self.partial.last().or_else(|| self.empty.last()) {
            Some(&idx) => idx,
            None => self.map_page()?,
        };
        let links = SlotLinks {
            next: None,
            prev: self.tail,
        };
        let slot = match self.pages[page_idx as usize].page.insert(elem, links) {
            Some(slot) => slot,
            // empty/partial membership guarantees a free slot
            None => unreachable!("page {page_idx} classified non-full but rejected insert"),
        };
        let handle = SlotRef::new(page_idx, slot);
        match self.tail {
            Some(tail) => self.page_mut(tail.page).set_next(tail.slot, Some(handle)),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);
        self.len += 1;
        self.reclassify(page_idx);
        self.debug_check_counters();
        Ok(handle)
    }

    /// Removes the element named by `handle`.
    ///
    /// Returns `false` when the handle does not resolve to a live element;
    /// nothing is modified in that case.
    pub fn remove(&mut self, handle: SlotRef) -> bool {
        let links = match self.pages.get(handle.page as usize) {
            Some(entry) if entry.page.is_live(handle.slot) => entry.page.links(handle.slot),
            _ => return false,
        };
        match links.prev {
            Some(prev) => self.page_mut(prev.page).set_next(prev.slot, links.next),
            None => self.head = links.next,
        }
        match links.next {
            Some(next) => self.page_mut(next.page).set_prev(next.slot, links.prev),
            None => self.tail = links.prev,
        }
        self.page_mut(handle.page).remove(handle.slot);
        self.len -= 1;
        self.reclassify(handle.page);
        self.debug_check_counters();
        true
    }

    /// Resolves a handle to its element.
    pub fn get(&self, handle: SlotRef) -> Option<&T> {
        self.pages.get(handle.page as usize)?.page.get(handle.slot)
    }

    /// Iterates stored elements in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            dir: self,
            next: self.head,
        }
    }

    fn page_mut(&mut self, idx: u32) -> &mut Page<T> {
        &mut self.pages[idx as usize].page
    }

    /// Maps a new page and files it under the empty list.
    fn map_page(&mut self) -> Result<u32> {
        let page = Page::new(self.alloc_unit)?;
        self.capacity += page.slot_count();
        let idx = self.pages.len() as u32;
        let list_pos = self.empty.len();
        self.empty.push(idx);
        self.pages.push(PageEntry {
            page,
            state: PageState::Empty,
            list_pos,
        });
        Ok(idx)
    }

    /// Moves a page between membership lists after its occupancy changed.
    fn reclassify(&mut self, idx: u32) {
        let entry = &self.pages[idx as usize];
        let desired = if entry.page.is_empty() {
            PageState::Empty
        } else if entry.page.is_full() {
            PageState::Full
        } else {
            PageState::Partial
        };
        let current = entry.state;
        if desired == current {
            return;
        }
        let pos = entry.list_pos;
        let moved = {
            let list = self.list_mut(current);
            list.swap_remove(pos);
            list.get(pos).copied()
        };
        if let Some(moved) = moved {
            self.pages[moved as usize].list_pos = pos;
        }
        let new_pos = {
            let list = self.list_mut(desired);
            list.push(idx);
            list.len() - 1
        };
        let entry = &mut self.pages[idx as usize];
        entry.state = desired;
        entry.list_pos = new_pos;
    }

    fn list_mut(&mut self, state: PageState) -> &mut Vec<u32> {
        match state {
            PageState::Empty => &mut self.empty,
            PageState::Partial => &mut self.partial,
            PageState::Full => &mut self.full,
        }
    }

    /// Counters must agree with the per-page sums after every mutation.
    fn debug_check_counters(&self) {
        debug_assert_eq!(
            self.len,
            self.pages.iter().map(|e| e.page.len()).sum::<usize>()
        );
        debug_assert_eq!(
            self.capacity,
            self.pages.iter().map(|e| e.page.slot_count()).sum::<usize>()
        );
        debug_assert_eq!(
            self.pages.len(),
            self.empty.len() + self.partial.len() + self.full.len()
        );
    }
}

impl<T> Default for Directory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for Directory<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory")
            .field("len", &self.len)
            .field("capacity", &self.capacity)
            .field("pages", &self.pages.len())
            .finish()
    }
}

/// Insertion-order iterator over stored elements.
pub struct Iter<'a, T> {
    dir: &'a Directory<T>,
    next: Option<SlotRef>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (SlotRef, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.next?;
        let page = &self.dir.pages[handle.page as usize].page;
        self.next = page.links(handle.slot).next;
        page.get(handle.slot).map(|item| (handle, item))
    }
}
