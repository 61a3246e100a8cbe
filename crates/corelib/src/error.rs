//! Error types for the core library.

use std::io;

/// Result type alias for the core library.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the core library.
///
/// Allocation and range errors abort the triggering operation and are
/// surfaced unmodified; nothing here is retried internally. A failed
/// value-equality removal is reported as `Ok(false)` by the ring, not as
/// an error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Ring access with an index at or beyond the current capacity.
    #[error("index {index} out of range (0..{capacity})")]
    OutOfRange { index: usize, capacity: usize },

    /// Ring access before any item was loaded.
    #[error("cannot access an empty ring, load an item first")]
    EmptyRing,

    /// The operating system could not satisfy a page mapping.
    #[error("page mapping failed: {0}")]
    Map(#[from] io::Error),

    /// Doubling the ring capacity would overflow the index width.
    #[error("ring capacity overflow, cannot expand past {capacity}")]
    CapacityOverflow { capacity: usize },

    /// Collision probing gave up before finding a free ring entry.
    ///
    /// With the load factor held below 1/3 this signals a pathological
    /// hash distribution rather than a full ring.
    #[error("probe sequence exhausted after {attempts} attempts")]
    ProbeExhausted { attempts: usize },
}
