//! Address-stable slab storage.
//!
//! Elements live in fixed-size slots carved out of memory-mapped pages.
//! Once placed, an element never moves; the [`Directory`] issues opaque
//! [`SlotRef`] handles that stay valid until the element is removed.

pub mod directory;
pub(crate) mod page;
pub mod slot;

pub use directory::Directory;
pub use page::DEFAULT_ALLOC_UNIT;
pub use slot::SlotRef;
