//! Core library for the ring-slab storage engine.
//!
//! This crate provides the two halves of the engine and the seam between
//! them:
//! - Page-based slab storage with stable, never-relocated element addresses
//! - A consistent-hashing ring indexing stored elements by hash value
//! - Hashing and probe abstractions shared by both
//!
//! The ring stores no elements itself; it holds opaque [`SlotRef`] handles
//! issued by the storage [`Directory`] and reasons about them by handle
//! identity. Callers load items, resolve the owner of an arbitrary ring
//! position, and remove items by value equality while stored items never
//! move.
//!
//! Single-writer discipline: nothing here is internally synchronized.

pub mod error;
pub mod hasher;
pub mod ring;
pub mod storage;

pub use error::{Error, Result};
pub use hasher::{RingHash, SipRingHash, Xxh3RingHash};
pub use ring::{HashRing, ProbeSequence, RingBuilder};
pub use storage::{Directory, SlotRef};
