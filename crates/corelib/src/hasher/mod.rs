//! Hashing abstraction for ring placement.
//!
//! A [`RingHash`] converts an item into a 32-bit ring hash. The ring only
//! needs determinism for equal items; nothing here is cryptographic.

pub mod sip;
pub mod traits;
pub mod xxh3;

pub use sip::SipRingHash;
pub use traits::RingHash;
pub use xxh3::Xxh3RingHash;
