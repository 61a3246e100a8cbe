//! Stable slot handles and intrusive slot links.

use std::fmt;
use std::mem::MaybeUninit;

/// Stable handle to a stored element: owning page index plus slot index
/// within that page.
///
/// Handles are issued by the [`Directory`](crate::storage::Directory) and
/// resolve to the same element, at the same memory location, until that
/// element is removed. The ring treats them as opaque comparable tokens
/// and uses them as side-table keys in place of raw addresses.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SlotRef {
    pub(crate) page: u32,
    pub(crate) slot: u32,
}

impl SlotRef {
    pub(crate) fn new(page: u32, slot: u32) -> Self {
        Self { page, slot }
    }

    /// Index of the owning page.
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Slot index within the owning page.
    pub fn slot(&self) -> u32 {
        self.slot
    }
}

impl fmt::Display for SlotRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.page, self.slot)
    }
}

/// Intrusive links threading a slot into the directory-wide
/// insertion-order list.
///
/// Links are handles, not pointers: neighbors are named by page and slot
/// index, so traversal never dereferences anything the directory does not
/// own. A slot has no ownership of its neighbors.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SlotLinks {
    pub next: Option<SlotRef>,
    pub prev: Option<SlotRef>,
}

/// One cell of a page: the element plus its order links.
///
/// Cells live inside the page's mapped memory. `elem` is initialized iff
/// the page bitmap bit for this slot is set; `links` are only meaningful
/// while the bit is set.
pub(crate) struct SlotCell<T> {
    pub links: SlotLinks,
    pub elem: MaybeUninit<T>,
}
