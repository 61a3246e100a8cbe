//! Consistent-hashing ring over address-stable slab storage.
//!
//! The ring is a power-of-two array of slot handles. Items are placed by
//! hash with randomized open-addressing probes, looked up by
//! nearest-successor scan, and removed by caller-supplied value equality.

pub mod builder;
pub mod probe;
pub mod ring;

pub use builder::RingBuilder;
pub use probe::ProbeSequence;
pub use ring::HashRing;
